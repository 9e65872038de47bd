//! Failure injection tests for the dispatcher and launcher.

use std::sync::Arc;
use std::time::Duration;

use profile_router::config::{LaunchStyle, UnknownUrlStrategy};
use profile_router::dispatch::{Dispatcher, ExitStatus, OneShotOutcome};
use profile_router::launcher::{CommandSpawner, Launcher};
use profile_router::lifecycle::Shutdown;
use profile_router::routing::{RuleSet, Router};

mod common;

use common::MockSpawner;

#[tokio::test]
async fn test_failed_launch_does_not_stop_later_urls() {
    let spawner = Arc::new(MockSpawner::new().failing_on("broken"));
    let (dispatcher, sink) = common::dispatcher(&[], UnknownUrlStrategy::UseDefaultProfile, spawner.clone());

    sink.submit("https://first.example", "test");
    sink.submit("https://broken.example", "test");
    sink.submit("https://last.example", "test");
    drop(sink);

    let report = dispatcher.run(Shutdown::new()).await;
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.exit_status(), ExitStatus::LaunchFailed);
    assert_eq!(spawner.launches().len(), 3);
}

#[tokio::test]
async fn test_missing_browser_binary_is_reported() {
    let rules = RuleSet::compile(&[], "Default", UnknownUrlStrategy::UseDefaultProfile).unwrap();
    let launcher = Launcher::new(
        "/nonexistent/profile-router-test-browser",
        LaunchStyle::Direct,
        Arc::new(CommandSpawner),
    );
    let (dispatcher, sink) = Dispatcher::new(Router::new(rules), launcher);

    sink.submit("https://example.com", "test");

    let outcome = dispatcher.run_once(Duration::from_secs(2)).await;
    assert_eq!(outcome, OneShotOutcome::LaunchFailed);
    assert_eq!(outcome.exit_status() as u8, 3);
}

#[tokio::test]
async fn test_odd_input_is_routed_not_rejected() {
    let spawner = Arc::new(MockSpawner::new());
    let (dispatcher, sink) = common::dispatcher(
        &[("\\.internal", "Intranet")],
        UnknownUrlStrategy::UseDefaultProfile,
        spawner.clone(),
    );

    for url in ["not a url at all", "wiki.internal/page", "%%%", "javascript:void(0)"] {
        sink.submit(url, "test");
    }
    drop(sink);

    let report = dispatcher.run(Shutdown::new()).await;
    assert_eq!(report.delivered, 4);

    let launches = spawner.launches();
    assert_eq!(launches[0].url(), "http://not a url at all");
    assert_eq!(launches[1].profile(), Some("Intranet"));
    assert_eq!(launches[1].url(), "http://wiki.internal/page");
    assert_eq!(launches[3].url(), "javascript:void(0)");
}

#[tokio::test]
async fn test_one_shot_times_out_without_launching() {
    let spawner = Arc::new(MockSpawner::new());
    let (dispatcher, _sink) = common::dispatcher(&[], UnknownUrlStrategy::UseDefaultProfile, spawner.clone());

    let started = std::time::Instant::now();
    let outcome = dispatcher.run_once(Duration::from_millis(100)).await;

    assert_eq!(outcome, OneShotOutcome::TimedOut);
    assert_eq!(outcome.exit_status(), ExitStatus::NoUrl);
    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(spawner.launches().is_empty());
}

#[tokio::test]
async fn test_one_shot_late_url_within_window() {
    let spawner = Arc::new(MockSpawner::new());
    let (dispatcher, sink) = common::dispatcher(&[], UnknownUrlStrategy::UseDefaultProfile, spawner.clone());

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        sink.submit("https://late.example", "test");
    });

    let outcome = dispatcher.run_once(Duration::from_secs(2)).await;
    assert_eq!(outcome, OneShotOutcome::Delivered);
    assert_eq!(outcome.exit_status(), ExitStatus::Success);
    assert_eq!(spawner.launches().len(), 1);
}
