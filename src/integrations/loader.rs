//! Fetches every configured source and reports back over a channel.
//!
//! Sources are fetched concurrently (bounded by the loader config) as
//! independent futures: a failing source is reported on its own and never
//! prevents the others from loading. Results are forwarded in source-list
//! order so the first-seen column order of the board is stable between
//! loads. Every event carries the epoch of the load it belongs to.

use crate::board::Action;
use crate::config::LoaderConfig;
use crate::data::{Issue, Source};
use crate::error::SourceError;
use crate::util::send_or_log;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Type-erased fetcher so the driver can swap the HTTP adapters out
pub type FetchFn =
    Arc<dyn Fn(Source) -> BoxFuture<'static, Result<Vec<Issue>, SourceError>> + Send + Sync>;

/// Fetcher backed by the provider adapters
pub fn http_fetcher() -> FetchFn {
    Arc::new(|source: Source| {
        Box::pin(async move { super::fetch_issues(&source).await })
            as BoxFuture<'static, Result<Vec<Issue>, SourceError>>
    })
}

/// Per-source outcome of a load, aggregated once every source reported
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: Vec<(String, usize)>,
    pub failed: Vec<SourceError>,
}

impl LoadSummary {
    pub fn total_issues(&self) -> usize {
        self.loaded.iter().map(|(_, n)| n).sum()
    }

    /// Some sources loaded and some failed
    pub fn is_partial(&self) -> bool {
        !self.loaded.is_empty() && !self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Loaded {
        epoch: u64,
        source: String,
        issues: Vec<Issue>,
    },
    Failed {
        epoch: u64,
        error: SourceError,
    },
    Complete {
        epoch: u64,
        summary: LoadSummary,
    },
}

impl LoadEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            Self::Loaded { epoch, .. } | Self::Failed { epoch, .. } | Self::Complete { epoch, .. } => {
                *epoch
            }
        }
    }

    /// Board action recording this event
    pub fn into_action(self) -> Action {
        match self {
            Self::Loaded {
                epoch,
                source,
                issues,
            } => Action::IssuesPush {
                epoch,
                source: Some(source),
                issues,
            },
            Self::Failed { epoch, error } => Action::SourceFailed {
                epoch,
                source: error.source_name().to_string(),
                error: error.to_string(),
            },
            Self::Complete { epoch, .. } => Action::LoadComplete { epoch },
        }
    }
}

/// Fetch `sources` and send one event per source, then `Complete`.
pub async fn load_sources<F, Fut>(
    sources: Vec<Source>,
    epoch: u64,
    options: &LoaderConfig,
    fetch: F,
    tx: mpsc::Sender<LoadEvent>,
) -> LoadSummary
where
    F: Fn(Source) -> Fut,
    Fut: Future<Output = Result<Vec<Issue>, SourceError>>,
{
    tracing::info!("Loading issues from {} sources (epoch {})", sources.len(), epoch);
    let timeout = Duration::from_secs(options.source_timeout_secs);

    let mut outcomes = stream::iter(sources)
        .map(|source| {
            let name = source.name.clone();
            let fut = fetch(source);
            async move {
                let result = match tokio::time::timeout(timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::Timeout {
                        source_name: name.clone(),
                        secs: timeout.as_secs(),
                    }),
                };
                (name, result)
            }
        })
        .buffered(options.max_concurrent_sources.max(1));

    let mut summary = LoadSummary::default();
    while let Some((source, result)) = outcomes.next().await {
        match result {
            Ok(issues) => {
                tracing::debug!("Source '{}' returned {} issues", source, issues.len());
                summary.loaded.push((source.clone(), issues.len()));
                send_or_log(
                    &tx,
                    LoadEvent::Loaded {
                        epoch,
                        source,
                        issues,
                    },
                    "source issues",
                )
                .await;
            }
            Err(error) => {
                tracing::warn!("{}", error);
                summary.failed.push(error.clone());
                send_or_log(&tx, LoadEvent::Failed { epoch, error }, "source failure").await;
            }
        }
    }

    tracing::info!(
        "Load {} finished: {} issues from {} sources, {} failed",
        epoch,
        summary.total_issues(),
        summary.loaded.len(),
        summary.failed.len()
    );
    send_or_log(
        &tx,
        LoadEvent::Complete {
            epoch,
            summary: summary.clone(),
        },
        "load complete signal",
    )
    .await;
    summary
}

/// Run [`load_sources`] in the background and hand back its event stream
pub fn spawn_load(
    sources: Vec<Source>,
    epoch: u64,
    options: LoaderConfig,
    fetch: FetchFn,
) -> mpsc::Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel(sources.len().max(1) + 1);
    tokio::spawn(async move {
        load_sources(sources, epoch, &options, |s| (*fetch)(s), tx).await;
    });
    rx
}
