// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 运行期计数器，由各工作器并发累加
#[derive(Debug, Default)]
pub struct RunStats {
    fetched: AtomicU64,
    fetch_failed: AtomicU64,
    skipped: AtomicU64,
    parsed: AtomicU64,
    parse_failed: AtomicU64,
    empty_results: AtomicU64,
    posts: AtomicU64,
    sink_failures: AtomicU64,
}

impl RunStats {
    pub fn record_fetched(&self) {
        self.fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failed(&self) {
        self.fetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parsed(&self, posts: usize) {
        self.parsed.fetch_add(1, Ordering::Relaxed);
        self.posts.fetch_add(posts as u64, Ordering::Relaxed);
    }

    pub fn record_parse_failed(&self) {
        self.parse_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_result(&self) {
        self.empty_results.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self, enumerated: usize) -> RunSummary {
        RunSummary {
            enumerated: enumerated as u64,
            fetched: self.fetched.load(Ordering::Relaxed),
            fetch_failed: self.fetch_failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            parsed: self.parsed.load(Ordering::Relaxed),
            parse_failed: self.parse_failed.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            posts: self.posts.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 枚举出的任务数
    pub enumerated: u64,
    /// 抓取成功的页面数
    pub fetched: u64,
    pub fetch_failed: u64,
    /// 已完成而跳过的任务数
    pub skipped: u64,
    /// 解析成功并标记完成的页面数
    pub parsed: u64,
    pub parse_failed: u64,
    /// 内容为空而未解析的结果数
    pub empty_results: u64,
    pub posts: u64,
    pub sink_failures: u64,
}
