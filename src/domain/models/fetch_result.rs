// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::CrawlTask;

/// 抓取结果
///
/// 每个进入抓取阶段且未被跳过的任务恰好产生一个结果。抓取失败时 `raw_content` 为空。
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub task: CrawlTask,
    /// 实际请求的列表页地址
    pub source_url: String,
    /// 页面原始文本
    pub raw_content: String,
    pub fetch_failed: bool,
}

impl FetchResult {
    pub fn success(task: CrawlTask, source_url: String, raw_content: String) -> Self {
        Self {
            task,
            source_url,
            raw_content,
            fetch_failed: false,
        }
    }

    pub fn failure(task: CrawlTask, source_url: String) -> Self {
        Self {
            task,
            source_url,
            raw_content: String::new(),
            fetch_failed: true,
        }
    }

    /// 是否有可供解析的内容
    pub fn has_content(&self) -> bool {
        !self.fetch_failed && !self.raw_content.is_empty()
    }
}
