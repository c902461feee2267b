// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{mount_page, run_crawl, test_settings, RecordingSink, CLASSIC_LISTING, EMPTY_LISTING};
use guba_harvester::domain::models::post::LIKE_COUNT_PLACEHOLDER;
use guba_harvester::domain::models::task::CrawlTask;
use guba_harvester::domain::repositories::post_sink::PostSink;
use guba_harvester::domain::repositories::progress_repository::ProgressRepository;
use guba_harvester::infrastructure::database::connection::{create_pool, SqlDialect};
use guba_harvester::infrastructure::sink::SqlPostSink;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_single_page_end_to_end() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());

    let (summary, progress) = run_crawl(
        test_settings(&server.uri(), "600000", 1),
        dir.path(),
        Some(sink.clone()),
    )
    .await;

    assert_eq!(summary.enumerated, 1);
    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.posts, 2);

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 2);

    let first = &batches[0][0];
    assert_eq!(first.stock_code, "600000");
    assert_eq!(first.title, "浦发银行今日放量上涨");
    assert_eq!(first.post_url, "https://guba.eastmoney.com/news,600000,1001.html");
    assert_eq!(first.author_id, "8801");
    assert_eq!(first.author_url, "https://i.eastmoney.com/8801");
    assert_eq!(first.publish_time, "2024-01-05 10:30:00");
    assert_eq!(first.like_count, LIKE_COUNT_PLACEHOLDER);

    assert!(progress.is_complete(&CrawlTask::new("600000", 1)));
    assert_eq!(progress.completed_keys(), vec!["600000_1"]);
}

#[tokio::test]
async fn test_failed_fetch_leaves_task_pending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list,600000_1.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());

    let (summary, progress) = run_crawl(
        test_settings(&server.uri(), "600000", 1),
        dir.path(),
        Some(sink.clone()),
    )
    .await;

    assert_eq!(summary.fetch_failed, 1);
    assert_eq!(summary.parsed, 0);
    assert!(sink.batches().is_empty());
    assert!(!progress.is_complete(&CrawlTask::new("600000", 1)));
}

#[tokio::test]
async fn test_zero_record_page_is_marked_complete() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, EMPTY_LISTING, 1).await;
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());

    let (summary, progress) = run_crawl(
        test_settings(&server.uri(), "600000", 1),
        dir.path(),
        Some(sink.clone()),
    )
    .await;

    assert_eq!(summary.parsed, 1);
    assert_eq!(summary.posts, 0);
    assert!(sink.batches().is_empty());
    assert!(progress.is_complete(&CrawlTask::new("600000", 1)));
}

#[tokio::test]
async fn test_unparseable_page_is_not_marked_complete() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, "Access denied", 1).await;
    let dir = TempDir::new().unwrap();

    let (summary, progress) =
        run_crawl(test_settings(&server.uri(), "600000", 1), dir.path(), None).await;

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.parse_failed, 1);
    assert!(!progress.is_complete(&CrawlTask::new("600000", 1)));
}

#[tokio::test]
async fn test_many_stocks_and_pages_complete_once_each() {
    let server = MockServer::start().await;
    for code in ["600000", "000001"] {
        for page in 1..=3 {
            mount_page(&server, code, page, CLASSIC_LISTING, 1).await;
        }
    }
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(RecordingSink::default());

    let (summary, progress) = run_crawl(
        test_settings(&server.uri(), "600000, 000001", 3),
        dir.path(),
        Some(sink.clone()),
    )
    .await;

    assert_eq!(summary.enumerated, 6);
    assert_eq!(summary.fetched, 6);
    assert_eq!(summary.parsed, 6);
    assert_eq!(summary.posts, 12);
    assert_eq!(sink.batches().len(), 6);
    assert_eq!(progress.completed_keys().len(), 6);
}

#[tokio::test]
async fn test_sink_failure_keeps_completion_mark() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();

    let (summary, progress) = run_crawl(
        test_settings(&server.uri(), "600000", 1),
        dir.path(),
        Some(Arc::new(RecordingSink::failing())),
    )
    .await;

    assert_eq!(summary.sink_failures, 1);
    assert!(progress.is_complete(&CrawlTask::new("600000", 1)));
}

#[tokio::test]
async fn test_posts_are_written_to_sql_table() {
    let server = MockServer::start().await;
    mount_page(&server, "600000", 1, CLASSIC_LISTING, 1).await;
    let dir = TempDir::new().unwrap();

    let settings = test_settings(&server.uri(), "600000", 1);
    let mut database = settings.database.clone();
    database.url = "sqlite::memory:".to_string();
    let pool = create_pool(&database).await.unwrap();
    let sink = Arc::new(SqlPostSink::new(pool, SqlDialect::Sqlite));
    sink.ensure_schema().await.unwrap();

    let (summary, _) = run_crawl(settings, dir.path(), Some(sink.clone() as Arc<dyn PostSink>)).await;
    assert_eq!(summary.sink_failures, 0);

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT stock_code, author_name FROM guba_stock_post ORDER BY author_name")
            .fetch_all(sink.pool())
            .await
            .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|(code, _)| code == "600000"));
}
