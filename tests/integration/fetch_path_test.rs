// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    run_crawl, run_with_fetcher, test_settings, MemoryLedger, PanickingSink, RecordingFetcher,
    CLASSIC_LISTING,
};
use guba_harvester::domain::models::task::CrawlTask;
use guba_harvester::domain::repositories::progress_repository::ProgressRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::{Instant, MissedTickBehavior};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "http://guba.test";

#[tokio::test]
async fn test_pool_proxy_is_attached_to_every_request() {
    let pool = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.2.3.4:8080\n"))
        .expect(2)
        .mount(&pool)
        .await;

    let mut settings = test_settings(SITE, "600000", 2);
    settings.proxy.enabled = true;
    settings.proxy.pool_url = format!("{}/get", pool.uri());
    let fetcher = Arc::new(RecordingFetcher::new(CLASSIC_LISTING));

    let summary = run_with_fetcher(
        settings,
        Arc::new(MemoryLedger::default()),
        fetcher.clone(),
        None,
    )
    .await;

    assert_eq!(summary.fetched, 2);
    let requests = fetcher.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let proxy = request.proxy.as_ref().unwrap();
        assert_eq!(proxy.http, "http://1.2.3.4:8080");
        assert_eq!(proxy.https, "https://1.2.3.4:8080");
    }
}

#[tokio::test]
async fn test_unavailable_pool_falls_back_to_direct_fetch() {
    let pool = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&pool)
        .await;

    let mut settings = test_settings(SITE, "600000", 2);
    settings.proxy.enabled = true;
    settings.proxy.pool_url = format!("{}/get", pool.uri());
    let fetcher = Arc::new(RecordingFetcher::new(CLASSIC_LISTING));
    let ledger = Arc::new(MemoryLedger::default());

    let summary = run_with_fetcher(settings, ledger.clone(), fetcher.clone(), None).await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.parsed, 2);
    assert!(fetcher.requests().iter().all(|r| r.proxy.is_none()));
    assert!(ledger.is_complete(&CrawlTask::new("600000", 2)));
}

#[tokio::test]
async fn test_requests_carry_browser_headers() {
    let settings = test_settings(SITE, "600000", 1);
    let fetcher = Arc::new(RecordingFetcher::new(CLASSIC_LISTING));

    run_with_fetcher(
        settings,
        Arc::new(MemoryLedger::default()),
        fetcher.clone(),
        None,
    )
    .await;

    let requests = fetcher.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url, "http://guba.test/list,600000_1.html");
    assert_eq!(request.user_agent, "guba-harvester-test");
    assert_eq!(request.timeout, Duration::from_secs(5));
    assert_eq!(request.headers["Accept-Language"], "zh-CN,zh;q=0.9");
    assert_eq!(request.headers["Connection"], "keep-alive");
    assert!(request.headers["Accept"].starts_with("text/html"));
    assert!(request.proxy.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_delay_follows_performed_requests_only() {
    let mut settings = test_settings(SITE, "600000", 5);
    settings.base.thread_num = 1;
    settings.base.request_delay_ms = 1000;
    let ledger = MemoryLedger::with_completed(&[
        CrawlTask::new("600000", 2),
        CrawlTask::new("600000", 4),
    ]);
    let fetcher = Arc::new(RecordingFetcher::new(CLASSIC_LISTING));

    let started = Instant::now();
    let summary = run_with_fetcher(settings, Arc::new(ledger), fetcher.clone(), None).await;
    let elapsed = started.elapsed();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(fetcher.requests().len(), 3);
    assert!(elapsed >= Duration::from_secs(3), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(4), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_slow_ledger_lookup_does_not_block_runtime() {
    let mut settings = test_settings(SITE, "600000", 5);
    settings.base.thread_num = 1;
    let tasks: Vec<CrawlTask> = (1..=5).map(|page| CrawlTask::new("600000", page)).collect();
    let ledger = MemoryLedger::with_completed(&tasks).with_slow_lookup(Duration::from_millis(100));
    let fetcher = Arc::new(RecordingFetcher::new(CLASSIC_LISTING));

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(10));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let summary = run_with_fetcher(settings, Arc::new(ledger), fetcher.clone(), None).await;
    ticker.abort();

    assert_eq!(summary.skipped, 5);
    assert!(fetcher.requests().is_empty());
    let ticks = ticks.load(Ordering::SeqCst);
    assert!(ticks >= 20, "runtime stalled, only {} ticks", ticks);
}

#[tokio::test]
async fn test_crashed_parse_pool_does_not_hang_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CLASSIC_LISTING))
        .mount(&server)
        .await;
    let mut settings = test_settings(&server.uri(), "600000", 20);
    settings.base.thread_num = 1;
    settings.base.queue_capacity = 1;
    let dir = TempDir::new().unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        run_crawl(settings, dir.path(), Some(Arc::new(PanickingSink))),
    )
    .await;

    let (summary, progress) = outcome.expect("crawl hung after the parse pool died");
    assert!(summary.fetched < 20);
    assert!(!progress.is_complete(&CrawlTask::new("600000", 20)));
}
