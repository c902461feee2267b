// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::queue::enumerator::TaskEnumerator;
use crate::workers::context::CrawlContext;
use crate::workers::fetch_worker::FetchWorker;
use crate::workers::parse_worker::ParseWorker;
use crate::workers::stats::{RunStats, RunSummary};

/// 工作管理器
///
/// 连接 枚举器 → 任务队列 → 抓取工作器 → 结果队列 → 解析工作器，
/// 等待全部任务排空后返回运行汇总
pub struct WorkerManager {
    context: Arc<CrawlContext>,
}

impl WorkerManager {
    pub fn new(context: Arc<CrawlContext>) -> Self {
        Self { context }
    }

    /// 执行一次完整的抓取
    pub async fn run(&self) -> RunSummary {
        let settings = self.context.settings.clone();
        let fetch_count = settings.base.thread_num.max(1);
        let parse_count = settings.parse_worker_count();
        let capacity = settings.base.queue_capacity.max(1);

        let (task_tx, task_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let result_rx = Arc::new(Mutex::new(result_rx));
        let stats = Arc::new(RunStats::default());

        info!(
            fetch_workers = fetch_count,
            parse_workers = parse_count,
            "Starting crawl"
        );

        let enumerator = TaskEnumerator::new(settings.stock_codes(), settings.base.max_page);
        let enumerate_handle = tokio::spawn(enumerator.run(task_tx));

        let fetch_handles: Vec<JoinHandle<()>> = (0..fetch_count)
            .map(|id| {
                let worker = FetchWorker::new(id, self.context.clone(), stats.clone());
                tokio::spawn(worker.run(task_rx.clone(), result_tx.clone()))
            })
            .collect();
        // The result queue closes once every fetch worker has dropped its sender.
        drop(result_tx);

        let parse_handles: Vec<JoinHandle<()>> = (0..parse_count)
            .map(|id| {
                let worker = ParseWorker::new(id, self.context.clone(), stats.clone());
                tokio::spawn(worker.run(result_rx.clone()))
            })
            .collect();
        // Only workers hold the receivers, so a dead pool closes its queue.
        drop(task_rx);
        drop(result_rx);

        let enumerated = match enumerate_handle.await {
            Ok(sent) => sent,
            Err(e) => {
                error!("Task enumerator failed: {}", e);
                0
            }
        };
        join_all("fetch", fetch_handles).await;
        join_all("parse", parse_handles).await;

        let summary = stats.summary(enumerated);
        info!(
            enumerated = summary.enumerated,
            fetched = summary.fetched,
            fetch_failed = summary.fetch_failed,
            skipped = summary.skipped,
            parsed = summary.parsed,
            parse_failed = summary.parse_failed,
            posts = summary.posts,
            sink_failures = summary.sink_failures,
            "Crawl finished"
        );
        summary
    }
}

async fn join_all(pool: &str, handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            error!(pool, "Worker terminated abnormally: {}", e);
        }
    }
}
