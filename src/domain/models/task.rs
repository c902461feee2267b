// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 抓取任务
///
/// 一个（股票代码，页码）组合即一个工作单元。任务在枚举时创建，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrawlTask {
    /// 股票代码
    pub stock_code: String,
    /// 页码，从 1 开始
    pub page: u32,
}

impl CrawlTask {
    pub fn new(stock_code: impl Into<String>, page: u32) -> Self {
        Self {
            stock_code: stock_code.into(),
            page,
        }
    }

    /// 任务标识键，格式为 `{stock_code}_{page}`
    pub fn key(&self) -> String {
        format!("{}_{}", self.stock_code, self.page)
    }
}

impl fmt::Display for CrawlTask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}", self.stock_code, self.page)
    }
}
