// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 日志文件名前缀，按天滚动
pub const LOG_FILE_NAME: &str = "crawl_main.log";

/// 初始化日志
///
/// 同时输出到标准输出和 `log_dir` 下按天滚动的日志文件。
/// 返回的 guard 必须存活到程序退出，否则缓冲中的日志会丢失。
pub fn init_telemetry(log_dir: impl AsRef<Path>) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir.as_ref(), LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,guba_harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    guard
}
