// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{mount_page, run_crawl, run_with_store, test_settings, CLASSIC_LISTING};
use guba_harvester::domain::models::task::CrawlTask;
use guba_harvester::domain::repositories::progress_repository::ProgressRepository;
use guba_harvester::infrastructure::progress_store::ProgressStore;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_second_run_performs_no_fetches() {
    let server = MockServer::start().await;
    // One request in total across both runs.
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();

    let (first, _) = run_crawl(test_settings(&server.uri(), "600000", 1), dir.path(), None).await;
    assert_eq!(first.fetched, 1);

    let (second, progress) =
        run_crawl(test_settings(&server.uri(), "600000", 1), dir.path(), None).await;
    assert_eq!(second.fetched, 0);
    assert_eq!(second.skipped, 1);
    assert!(progress.is_complete(&CrawlTask::new("600000", 1)));
}

#[tokio::test]
async fn test_completed_tasks_are_never_fetched() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 0).await;
    mount_page(&server, "600000", 2, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();

    let settings = test_settings(&server.uri(), "600000", 2);
    let progress = Arc::new(ProgressStore::open(dir.path(), 4).unwrap());
    progress.mark_complete(&CrawlTask::new("600000", 1)).unwrap();

    let summary = run_with_store(settings, progress.clone(), None).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.fetched, 1);
    assert!(progress.is_complete(&CrawlTask::new("600000", 2)));
}

#[tokio::test]
async fn test_cleared_stock_is_crawled_again() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 2).await;
    mount_page(&server, "000001", 1, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();

    let (first, progress) =
        run_crawl(test_settings(&server.uri(), "600000,000001", 1), dir.path(), None).await;
    assert_eq!(first.fetched, 2);

    progress.clear(Some("600000")).unwrap();
    drop(progress);

    let (second, progress) =
        run_crawl(test_settings(&server.uri(), "600000,000001", 1), dir.path(), None).await;
    assert_eq!(second.fetched, 1);
    assert_eq!(second.skipped, 1);
    assert_eq!(progress.completed_keys(), vec!["000001_1", "600000_1"]);
}
