// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 抓取与解析两个工作池，以及连接它们的工作管理器
pub mod context;
pub mod fetch_worker;
pub mod manager;
pub mod parse_worker;
pub mod stats;

pub use context::CrawlContext;
pub use manager::WorkerManager;
pub use stats::RunSummary;
