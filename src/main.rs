// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, Subcommand};
use guba_harvester::config::settings::Settings;
use guba_harvester::domain::repositories::post_sink::PostSink;
use guba_harvester::domain::repositories::progress_repository::ProgressRepository;
use guba_harvester::engines::reqwest_engine::ReqwestEngine;
use guba_harvester::infrastructure::observability::metrics;
use guba_harvester::infrastructure::progress_store::ProgressStore;
use guba_harvester::infrastructure::proxy::ProxySource;
use guba_harvester::infrastructure::sink::SqlPostSink;
use guba_harvester::utils::telemetry;
use guba_harvester::workers::{CrawlContext, WorkerManager};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "guba-harvester")]
#[command(author, version, about = "Resumable crawler for stock forum listing pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every configured stock code, resuming from the progress ledger
    Run {
        /// Configuration file, defaults to config/default plus APP_ENVIRONMENT
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Clear crawl progress so pages are fetched again
    Clear {
        /// Only clear this stock code
        #[arg(short, long)]
        stock: Option<String>,

        /// Configuration file, defaults to config/default plus APP_ENVIRONMENT
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from(path),
        None => Settings::new(),
    };
    settings.context("Failed to load configuration")
}

/// 主函数
///
/// 配置无效时在启动任何工作器之前退出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.command {
        Command::Run { config } | Command::Clear { config, .. } => config.as_ref(),
    };
    let settings = Arc::new(load_settings(config_path)?);

    let _guard = telemetry::init_telemetry(&settings.base.log_dir);
    info!("Starting guba-harvester...");

    if settings.metrics.enabled {
        metrics::start_exporter(&settings.metrics.listen_addr);
    }

    let progress = Arc::new(
        ProgressStore::open(
            &settings.base.cache_dir,
            settings.base.ledger_compact_threshold,
        )
        .context("Failed to open progress ledger")?,
    );

    match cli.command {
        Command::Clear { stock, .. } => {
            progress.clear(stock.as_deref())?;
            Ok(())
        }
        Command::Run { .. } => run(settings, progress).await,
    }
}

async fn run(settings: Arc<Settings>, progress: Arc<ProgressStore>) -> anyhow::Result<()> {
    let proxy = Arc::new(ProxySource::new(&settings.proxy)?);

    let sink = SqlPostSink::open_optional(&settings.database)
        .await
        .map(|sink| Arc::new(sink) as Arc<dyn PostSink>);

    let context = CrawlContext::new(
        settings.clone(),
        progress.clone(),
        proxy,
        Arc::new(ReqwestEngine::new()?),
        sink,
    )?;
    let manager = WorkerManager::new(Arc::new(context));

    tokio::select! {
        summary = manager.run() => {
            info!(?summary, "All tasks processed");
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => warn!("Shutdown signal received, unfinished pages stay pending"),
                Err(e) => warn!("Unable to listen for shutdown signal: {}", e),
            }
        }
    }

    progress.compact().context("Failed to write progress snapshot")?;
    info!(path = %progress.snapshot_path().display(), "Progress snapshot written");
    Ok(())
}
