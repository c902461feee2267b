// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::{error, info};

pub const PAGES_FETCHED: &str = "guba_pages_fetched_total";
pub const FETCH_FAILURES: &str = "guba_fetch_failures_total";
pub const TASKS_SKIPPED: &str = "guba_tasks_skipped_total";
pub const PAGES_PARSED: &str = "guba_pages_parsed_total";
pub const PARSE_FAILURES: &str = "guba_parse_failures_total";
pub const POSTS_EXTRACTED: &str = "guba_posts_extracted_total";
pub const SINK_FAILURES: &str = "guba_sink_failures_total";

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册抓取流水线的计数器。
/// 未调用时计数器操作为空操作。
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install()?;

    describe_metrics();
    info!(addr = %listen_addr, "Prometheus exporter listening");
    Ok(())
}

/// 按配置地址启动导出器，返回是否启动成功
///
/// 地址无效或端口无法绑定时只记录错误，抓取照常进行
pub fn start_exporter(listen_addr: &str) -> bool {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid metrics.listen_addr {}: {}", listen_addr, e);
            return false;
        }
    };

    match init_metrics(addr) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to start metrics exporter: {}", e);
            false
        }
    }
}

fn describe_metrics() {
    describe_counter!(PAGES_FETCHED, "Total number of listing pages fetched");
    describe_counter!(FETCH_FAILURES, "Total number of listing page fetches that failed");
    describe_counter!(
        TASKS_SKIPPED,
        "Total number of tasks skipped because they were already crawled"
    );
    describe_counter!(PAGES_PARSED, "Total number of listing pages parsed");
    describe_counter!(PARSE_FAILURES, "Total number of listing pages that failed to parse");
    describe_counter!(POSTS_EXTRACTED, "Total number of posts extracted from listing pages");
    describe_counter!(SINK_FAILURES, "Total number of post batches that failed to persist");
}
