// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::CrawlTask;
use thiserror::Error;

/// 进度持久化错误类型
#[derive(Error, Debug)]
pub enum ProgressError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 抓取进度仓库特质
///
/// 记录已完成的任务。抓取阶段读取，解析阶段写入。
/// 写操作在返回前必须完成持久化。
pub trait ProgressRepository: Send + Sync {
    /// 任务是否已完成，未知任务视为未完成
    fn is_complete(&self, task: &CrawlTask) -> bool;

    /// 标记任务已完成
    fn mark_complete(&self, task: &CrawlTask) -> Result<(), ProgressError>;

    /// 清除指定股票（或全部）的完成记录
    fn clear(&self, stock_code: Option<&str>) -> Result<(), ProgressError>;
}
