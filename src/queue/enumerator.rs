// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::models::task::CrawlTask;

/// 解析逗号分隔的股票代码列表，去除空白并跳过空项
pub fn parse_stock_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// 按股票代码、页码顺序生成全部任务
pub fn enumerate_tasks(stock_codes: &[String], max_page: u32) -> Vec<CrawlTask> {
    stock_codes
        .iter()
        .flat_map(|code| (1..=max_page).map(move |page| CrawlTask::new(code.clone(), page)))
        .collect()
}

/// 任务枚举器
///
/// 把全部任务送入抓取队列，完成后关闭发送端以通知抓取工作器退出
pub struct TaskEnumerator {
    stock_codes: Vec<String>,
    max_page: u32,
}

impl TaskEnumerator {
    pub fn new(stock_codes: Vec<String>, max_page: u32) -> Self {
        Self {
            stock_codes,
            max_page,
        }
    }

    /// 发送全部任务，返回已入队的任务数
    pub async fn run(self, sender: mpsc::Sender<CrawlTask>) -> usize {
        let mut sent = 0;
        for task in enumerate_tasks(&self.stock_codes, self.max_page) {
            if sender.send(task).await.is_err() {
                warn!("Fetch queue closed before all tasks were enqueued");
                break;
            }
            sent += 1;
        }

        info!(
            stocks = self.stock_codes.len(),
            max_page = self.max_page,
            tasks = sent,
            "Task enumeration finished"
        );
        sent
    }
}
