// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::post::PostRecord;
use async_trait::async_trait;
use thiserror::Error;

/// 落库错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// 其他错误
    #[error("Sink error: {0}")]
    Other(String),
}

/// 帖子存储特质
///
/// 每个页面提取出的帖子作为一个批次写入
#[async_trait]
pub trait PostSink: Send + Sync {
    /// 批量写入帖子，返回写入条数
    async fn insert_batch(&self, records: &[PostRecord]) -> Result<u64, SinkError>;
}
