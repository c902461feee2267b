// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::fetch_result::FetchResult;
use crate::domain::models::proxy::ProxyEndpoint;
use crate::domain::models::task::CrawlTask;
use crate::engines::traits::FetchRequest;
use crate::infrastructure::observability::metrics::{FETCH_FAILURES, PAGES_FETCHED, TASKS_SKIPPED};
use crate::workers::context::CrawlContext;
use crate::workers::stats::RunStats;

/// 抓取工作器
///
/// 从共享任务队列取任务，抓取列表页并把结果送入解析队列。
/// 任务队列关闭且取空后退出。
pub struct FetchWorker {
    id: usize,
    context: Arc<CrawlContext>,
    stats: Arc<RunStats>,
}

impl FetchWorker {
    pub fn new(id: usize, context: Arc<CrawlContext>, stats: Arc<RunStats>) -> Self {
        Self { id, context, stats }
    }

    /// 运行抓取工作器
    pub async fn run(
        self,
        tasks: Arc<Mutex<mpsc::Receiver<CrawlTask>>>,
        results: mpsc::Sender<FetchResult>,
    ) {
        debug!(worker = self.id, "Fetch worker started");

        loop {
            let next = tasks.lock().await.recv().await;
            let Some(task) = next else {
                break;
            };

            if let Some(result) = self.process_task(task).await {
                if results.send(result).await.is_err() {
                    warn!(worker = self.id, "Result queue closed, stopping fetch worker");
                    break;
                }
                self.pause().await;
            }
        }

        debug!(worker = self.id, "Fetch worker finished");
    }

    /// 处理单个任务，已完成的任务返回 `None`
    #[instrument(skip(self, task), fields(worker = self.id, task = %task))]
    async fn process_task(&self, task: CrawlTask) -> Option<FetchResult> {
        if self.is_complete(&task).await {
            info!("Task already crawled, skipping");
            self.stats.record_skipped();
            counter!(TASKS_SKIPPED).increment(1);
            return None;
        }

        let url = self.context.listing_url(&task);
        let proxy = self.context.proxy.acquire().await;
        let request = self.build_request(&url, proxy);

        match self.context.fetcher.fetch(&request).await {
            Ok(response) => {
                info!(
                    status = response.status_code,
                    elapsed_ms = response.response_time_ms,
                    "Fetched listing page"
                );
                self.stats.record_fetched();
                counter!(PAGES_FETCHED).increment(1);
                Some(FetchResult::success(task, url, response.content))
            }
            Err(e) => {
                error!(url = %url, retryable = e.is_retryable(), "Fetch failed: {}", e);
                self.stats.record_fetch_failed();
                counter!(FETCH_FAILURES).increment(1);
                Some(FetchResult::failure(task, url))
            }
        }
    }

    /// 账本查询可能等待压缩时的 fsync，放到阻塞线程池执行
    async fn is_complete(&self, task: &CrawlTask) -> bool {
        let progress = self.context.progress.clone();
        let task = task.clone();
        match tokio::task::spawn_blocking(move || progress.is_complete(&task)).await {
            Ok(done) => done,
            Err(e) => {
                error!("Progress lookup failed: {}", e);
                false
            }
        }
    }

    fn build_request(&self, url: &str, proxy: Option<ProxyEndpoint>) -> FetchRequest {
        let settings = &self.context.settings;
        FetchRequest {
            url: url.to_string(),
            headers: browser_headers(),
            user_agent: settings.request.user_agent.clone(),
            timeout: settings.request_timeout(),
            proxy,
        }
    }

    async fn pause(&self) {
        let delay = self.context.settings.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

fn browser_headers() -> HashMap<String, String> {
    HashMap::from([
        (
            "Accept".to_string(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        ),
        ("Accept-Language".to_string(), "zh-CN,zh;q=0.9".to_string()),
        ("Connection".to_string(), "keep-alive".to_string()),
    ])
}
