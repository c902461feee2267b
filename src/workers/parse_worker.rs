// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::fetch_result::FetchResult;
use crate::domain::models::post::PostRecord;
use crate::domain::models::task::CrawlTask;
use crate::infrastructure::observability::metrics::{
    PAGES_PARSED, PARSE_FAILURES, POSTS_EXTRACTED, SINK_FAILURES,
};
use crate::workers::context::CrawlContext;
use crate::workers::stats::RunStats;

/// 解析工作器
///
/// 从共享结果队列取抓取结果，解析帖子、记录进度并写入存储。
/// 结果队列关闭且取空后退出。
pub struct ParseWorker {
    id: usize,
    context: Arc<CrawlContext>,
    stats: Arc<RunStats>,
}

impl ParseWorker {
    pub fn new(id: usize, context: Arc<CrawlContext>, stats: Arc<RunStats>) -> Self {
        Self { id, context, stats }
    }

    /// 运行解析工作器
    pub async fn run(self, results: Arc<Mutex<mpsc::Receiver<FetchResult>>>) {
        debug!(worker = self.id, "Parse worker started");

        loop {
            let next = results.lock().await.recv().await;
            let Some(result) = next else {
                break;
            };
            self.process_result(result).await;
        }

        debug!(worker = self.id, "Parse worker finished");
    }

    #[instrument(skip(self, result), fields(worker = self.id, task = %result.task))]
    async fn process_result(&self, result: FetchResult) {
        if !result.has_content() {
            warn!(url = %result.source_url, "Empty page content, task left pending");
            self.stats.record_empty_result();
            return;
        }

        let parsed = match self
            .context
            .parser
            .parse(&result.task.stock_code, &result.raw_content)
        {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(url = %result.source_url, "Failed to parse listing page: {}", e);
                self.stats.record_parse_failed();
                counter!(PARSE_FAILURES).increment(1);
                return;
            }
        };

        info!(
            layout = ?parsed.layout,
            posts = parsed.records.len(),
            dropped = parsed.dropped_items,
            "Parsed listing page"
        );
        self.stats.record_parsed(parsed.records.len());
        counter!(PAGES_PARSED).increment(1);
        counter!(POSTS_EXTRACTED).increment(parsed.records.len() as u64);

        self.mark_complete(result.task).await;

        if !parsed.records.is_empty() {
            self.store(&parsed.records).await;
        }
    }

    async fn mark_complete(&self, task: CrawlTask) {
        let progress = self.context.progress.clone();
        match tokio::task::spawn_blocking(move || progress.mark_complete(&task)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Failed to persist crawl progress: {}", e),
            Err(e) => error!("Progress update task failed: {}", e),
        }
    }

    async fn store(&self, records: &[PostRecord]) {
        let Some(sink) = &self.context.sink else {
            return;
        };

        match sink.insert_batch(records).await {
            Ok(rows) => debug!(rows, "Stored post batch"),
            Err(e) => {
                error!(posts = records.len(), "Failed to store post batch: {}", e);
                self.stats.record_sink_failure();
                counter!(SINK_FAILURES).increment(1);
            }
        }
    }
}
