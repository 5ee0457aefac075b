//! Tests for concurrent source loading and the board driver.
//!
//! Fetching is stubbed with a `FetchFn` so no network is involved.

mod test_utils;

use futures::future::BoxFuture;
use poari::app::BoardApp;
use poari::config::{Config, LoaderConfig};
use poari::data::{default_sources, Issue, Source};
use poari::error::SourceError;
use poari::integrations::loader::{load_sources, spawn_load, FetchFn, LoadEvent};
use poari::store::SourceStore;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_utils::{github_source, issue};
use tokio::sync::mpsc;

/// Sources named `fail*` error out, `slow*` take a while, `hang*` never
/// return in time; everything else yields two issues tagged with the name.
fn stub_fetcher() -> FetchFn {
    Arc::new(|source: Source| {
        Box::pin(async move {
            if source.name.starts_with("fail") {
                return Err(SourceError::Fetch {
                    source_name: source.name.clone(),
                    url: source.url.clone(),
                    message: "500 Internal Server Error".into(),
                });
            }
            if source.name.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if source.name.starts_with("hang") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(vec![
                issue(&format!("{}-1", source.name)).provider(&source.name).build(),
                issue(&format!("{}-2", source.name)).provider(&source.name).build(),
            ])
        }) as BoxFuture<'static, Result<Vec<Issue>, SourceError>>
    })
}

fn options() -> LoaderConfig {
    LoaderConfig {
        max_concurrent_sources: 4,
        source_timeout_secs: 1,
    }
}

async fn collect(mut rx: mpsc::Receiver<LoadEvent>) -> Vec<LoadEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn loaded_names(events: &[LoadEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            LoadEvent::Loaded { source, .. } => Some(source.as_str()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Loader
// ============================================================================

#[tokio::test]
async fn test_partial_failure_reports_both() {
    let sources = vec![github_source("ok/a"), github_source("fail/b"), github_source("ok/c")];
    let rx = spawn_load(sources, 3, options(), stub_fetcher());
    let events = collect(rx).await;

    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.epoch() == 3));
    assert_eq!(loaded_names(&events), vec!["ok/a", "ok/c"]);

    let Some(LoadEvent::Complete { summary, .. }) = events.last() else {
        panic!("last event should be Complete, got {:?}", events.last());
    };
    assert!(summary.is_partial());
    assert_eq!(summary.total_issues(), 4);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].source_name(), "fail/b");
}

#[tokio::test]
async fn test_results_follow_source_order() {
    let sources = vec![github_source("slow/a"), github_source("fast/b")];
    let events = collect(spawn_load(sources, 1, options(), stub_fetcher())).await;
    assert_eq!(loaded_names(&events), vec!["slow/a", "fast/b"]);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let sources = vec![github_source("hang/a"), github_source("ok/b")];
    let (tx, rx) = mpsc::channel(8);
    let fetch = stub_fetcher();

    let summary = load_sources(sources, 1, &options(), |s| (*fetch)(s), tx).await;
    assert_eq!(
        summary.failed,
        vec![SourceError::Timeout {
            source_name: "hang/a".into(),
            secs: 1
        }]
    );
    assert_eq!(summary.loaded, vec![("ok/b".to_string(), 2)]);

    let events = collect(rx).await;
    assert!(matches!(events[0], LoadEvent::Failed { .. }));
    assert_eq!(
        events[0].clone().into_action().command(),
        "issues-data-source-failed"
    );
}

#[tokio::test]
async fn test_empty_source_list_completes() {
    let events = collect(spawn_load(Vec::new(), 1, options(), stub_fetcher())).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], LoadEvent::Complete { .. }));
}

// ============================================================================
// Driver
// ============================================================================

fn app_in(dir: &TempDir) -> BoardApp {
    let mut config = Config::default();
    config.loader = options();
    config.storage.sources_path = Some(dir.path().join("sources.json"));
    let store = SourceStore::new(dir.path().join("sources.json"));
    BoardApp::new(config, store, stub_fetcher())
}

#[tokio::test]
async fn test_bootstrap_persists_defaults_and_loads() {
    let dir = TempDir::new().unwrap();
    let mut app = app_in(&dir);

    app.bootstrap().unwrap();
    let summary = app.wait_for_load().await.cloned().unwrap();

    assert_eq!(summary.loaded.len(), 2);
    assert_eq!(app.state.sources, default_sources());
    assert_eq!(app.state.issues().len(), 4);
    assert!(!app.state.is_loading());

    let saved = SourceStore::new(dir.path().join("sources.json")).load().unwrap();
    assert_eq!(saved, Some(default_sources()));
}

#[tokio::test]
async fn test_bootstrap_uses_saved_sources() {
    let dir = TempDir::new().unwrap();
    SourceStore::new(dir.path().join("sources.json"))
        .save(&[github_source("mine/repo")])
        .unwrap();

    let mut app = app_in(&dir);
    app.bootstrap().unwrap();
    app.wait_for_load().await;

    let providers: Vec<&str> = app.state.issues().iter().map(|i| i.provider.as_str()).collect();
    assert_eq!(providers, vec!["mine/repo", "mine/repo"]);
}

#[tokio::test]
async fn test_failed_source_keeps_board_usable() {
    let dir = TempDir::new().unwrap();
    let mut app = app_in(&dir);

    app.dispatch(poari::board::Action::SaveSources {
        sources: vec![github_source("fail/x"), github_source("ok/y")],
    })
    .unwrap();
    app.wait_for_load().await;

    assert_eq!(app.state.issues().len(), 2);
    assert!(!app.state.grid.is_empty());
    let failures: Vec<&str> = app.state.repository.failures().map(|(s, _)| s).collect();
    assert_eq!(failures, vec!["fail/x"]);
}

#[tokio::test]
async fn test_new_load_supersedes_running_one() {
    let dir = TempDir::new().unwrap();
    let mut app = app_in(&dir);

    app.dispatch(poari::board::Action::SaveSources {
        sources: vec![github_source("slow/a")],
    })
    .unwrap();
    let first = app.state.epoch();

    app.dispatch(poari::board::Action::SourcesPush {
        sources: vec![github_source("ok/b")],
    })
    .unwrap();
    assert!(app.state.epoch() > first);

    app.wait_for_load().await;
    // one batch per source of the second load, nothing left over from the first
    assert_eq!(app.state.issues().len(), 4);
    assert!(!app.is_loading());
}

#[tokio::test]
async fn test_dispatch_json_rejects_unknown_command() {
    let dir = TempDir::new().unwrap();
    let mut app = app_in(&dir);
    let err = app
        .dispatch_json(serde_json::json!({"command": "nope"}))
        .unwrap_err();
    assert!(err.to_string().contains("unrecognized action"));
}

#[tokio::test]
async fn test_poll_load_applies_events_without_blocking() {
    let dir = TempDir::new().unwrap();
    let mut app = app_in(&dir);

    app.dispatch(poari::board::Action::SaveSources {
        sources: vec![github_source("slow/a"), github_source("ok/b")],
    })
    .unwrap();

    // nothing has arrived yet; the load stays pending
    assert!(!app.poll_load());
    assert!(app.is_loading());
    assert!(app.state.is_loading());
    assert!(app.last_summary.is_none());

    let mut finished = false;
    for _ in 0..200 {
        if app.poll_load() {
            finished = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(finished, "load never completed");

    assert!(!app.is_loading());
    assert!(!app.state.is_loading());
    assert_eq!(app.state.issues().len(), 4);
    let summary = app.last_summary.as_ref().unwrap();
    assert_eq!(summary.total_issues(), 4);
    assert!(summary.failed.is_empty());

    // a finished load has nothing left to poll
    assert!(!app.poll_load());
}
