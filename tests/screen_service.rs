mod common;

use common::{ymd, FakeScraper, Profile};
use dkby_screener::config::Config;
use dkby_screener::models::screen::{IndustryOutcome, ScreenWindow};
use dkby_screener::services::screen_service::{ScreenRequest, ScreenService};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn service_with(scraper: Arc<FakeScraper>, workers: usize) -> ScreenService {
    ScreenService::new(Config::new().with_workers(workers), scraper)
}

fn window(service: &ScreenService) -> ScreenWindow {
    let request = ScreenRequest { threshold: 5.0, start: None, end: None };
    service.resolve_window_at(&request, ymd(2025, 6, 6)).unwrap()
}

fn names<'a>(items: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    items.into_iter().map(str::to_string).collect()
}

#[tokio::test]
async fn parallel_and_sequential_filters_agree() {
    let scraper = Arc::new(FakeScraper::standard());
    let service = service_with(scraper.clone(), 4);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    for threshold in [0.0, 1e-9, 1.0, 5.0, 20.0, 200.0] {
        let parallel = service.screen_industries(industries.clone(), window, threshold).await;
        let sequential = service
            .screen_industries_sequential(industries.clone(), window, threshold)
            .await;

        assert_eq!(
            names(parallel.matched_names()),
            names(sequential.matched_names()),
            "threshold {}",
            threshold
        );
        assert_eq!(
            names(parallel.skipped.iter().map(String::as_str)),
            names(sequential.skipped.iter().map(String::as_str))
        );
        assert_eq!(parallel.failed.len(), sequential.failed.len());
    }
}

#[tokio::test]
async fn converging_industry_matches_any_positive_threshold() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    for threshold in [1e-9, 1e-3, 0.5, 5.0] {
        let report = service.screen_industries(industries.clone(), window, threshold).await;
        assert!(
            report.matched_names().contains(&"白酒"),
            "threshold {} should select the converging series",
            threshold
        );
        assert!(!report.matched_names().contains(&"半导体"));
    }
}

#[tokio::test]
async fn zero_threshold_matches_nothing() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let report = service.screen_industries(industries, window, 0.0).await;
    assert!(report.matched.is_empty());
}

#[tokio::test]
async fn selection_is_threshold_monotonic() {
    let service = service_with(Arc::new(FakeScraper::standard()), 4);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let mut previous: Option<BTreeSet<String>> = None;
    for threshold in [f64::MAX, 150.0, 100.0, 30.0, 10.0, 5.0, 1.0, 0.1, 0.0] {
        let report = service.screen_industries(industries.clone(), window, threshold).await;
        let selected = names(report.matched_names());
        match &previous {
            Some(prev) => assert!(selected.is_subset(prev), "threshold {} grew the match set", threshold),
            None => assert_eq!(selected.len(), 5),
        }
        previous = Some(selected);
    }
    assert!(previous.unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_history_is_skipped_not_failed() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let report = service.screen_industries(industries, window, 1_000.0).await;
    let skipped = names(report.skipped.iter().map(String::as_str));
    assert_eq!(skipped, names(["新股板块", "停牌板块"]));
    assert!(!report.matched_names().contains(&"新股板块"));
}

#[tokio::test]
async fn failing_task_does_not_abort_collection() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let report = service.screen_industries(industries, window, 5.0).await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "故障板块");
    assert!(report.failed[0].reason.contains("connection reset"));
    assert!(report.matched_names().contains(&"白酒"));
}

#[tokio::test]
async fn panicking_task_is_recorded_under_its_industry() {
    let scraper = Arc::new(FakeScraper::new(&[
        ("白酒", Profile::Converging),
        ("银行", Profile::Panicking),
        ("煤炭开采", Profile::Oscillating(11.0)),
        ("故障板块", Profile::Failing),
    ]));
    let service = service_with(scraper, 4);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let parallel = service.screen_industries(industries.clone(), window, 5.0).await;
    let sequential = service.screen_industries_sequential(industries, window, 5.0).await;

    for report in [&parallel, &sequential] {
        let failed = names(report.failed.iter().map(|f| f.name.as_str()));
        assert_eq!(failed, names(["银行", "故障板块"]));
        let panicked = report.failed.iter().find(|f| f.name == "银行").unwrap();
        assert!(panicked.reason.contains("panicked"), "reason {}", panicked.reason);
        assert!(report.matched_names().contains(&"白酒"));
    }
    assert_eq!(names(parallel.matched_names()), names(sequential.matched_names()));
}

#[tokio::test]
async fn evaluation_is_deterministic() {
    let service = service_with(Arc::new(FakeScraper::standard()), 4);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let mut first = service.screen_industries(industries.clone(), window, f64::MAX).await.matched;
    let mut second = service.screen_industries(industries, window, f64::MAX).await.matched;
    first.sort_by(|a, b| a.name.cmp(&b.name));
    second.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn pool_never_exceeds_worker_count() {
    let entries: Vec<(String, Profile)> = (0..24)
        .map(|i| (format!("行业{}", i), Profile::Oscillating(7.0)))
        .collect();
    let refs: Vec<(&str, Profile)> = entries.iter().map(|(n, p)| (n.as_str(), *p)).collect();
    let scraper = Arc::new(FakeScraper::new(&refs).with_delay(Duration::from_millis(20)));

    let service = service_with(scraper.clone(), 4);
    let window = window(&service);
    let industries = service.list_industries().await.unwrap();

    let report = service.screen_industries(industries, window, f64::MAX).await;
    assert_eq!(report.matched.len(), 24);

    let peak = scraper.max_in_flight.load(std::sync::atomic::Ordering::SeqCst);
    assert!(peak <= 4, "peak concurrency {} exceeded the pool size", peak);
}

#[tokio::test]
async fn single_industry_lookup() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let request = ScreenRequest { threshold: 5.0, start: Some(ymd(2024, 1, 1)), end: Some(ymd(2025, 1, 1)) };

    match service.evaluate_by_name("白酒", &request).await.unwrap() {
        IndustryOutcome::Evaluated(verdict) => assert!(verdict.passes(5.0)),
        other => panic!("unexpected outcome {:?}", other),
    }

    assert!(service.evaluate_by_name("不存在", &request).await.is_err());
}

#[tokio::test]
async fn debug_limit_truncates_industry_list() {
    let config = Config::new().with_debug_industry_limit(Some(3));
    let service = ScreenService::new(config, Arc::new(FakeScraper::standard()));
    assert_eq!(service.list_industries().await.unwrap().len(), 3);
}

#[test]
fn invalid_threshold_is_rejected_before_fetching() {
    let service = service_with(Arc::new(FakeScraper::standard()), 9);
    let request = ScreenRequest { threshold: -1.0, start: None, end: None };
    assert!(service.resolve_window_at(&request, ymd(2025, 6, 6)).is_err());
}
