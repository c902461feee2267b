// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 列表页无法获取点赞数，需要抓取详情页
pub const LIKE_COUNT_PLACEHOLDER: &str = "需爬详情页";

/// 帖子记录
///
/// 字段顺序与落库列顺序一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub stock_code: String,
    pub title: String,
    pub author_name: String,
    pub author_id: String,
    pub author_url: String,
    /// 发表时间，`MM-DD HH:MM` 会补全为 `YYYY-MM-DD HH:MM:00`
    pub publish_time: String,
    pub read_count: String,
    pub comment_count: String,
    pub like_count: String,
    pub post_url: String,
}

impl PostRecord {
    /// 按落库列顺序返回字段
    pub fn columns(&self) -> [&str; 10] {
        [
            &self.stock_code,
            &self.title,
            &self.author_name,
            &self.author_id,
            &self.author_url,
            &self.publish_time,
            &self.read_count,
            &self.comment_count,
            &self.like_count,
            &self.post_url,
        ]
    }
}
