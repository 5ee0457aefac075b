//! Typed errors for the board core and the source adapters.
//!
//! - `SourceError` covers everything that can go wrong fetching one source
//! - `BoardError` covers malformed input to the state machine

use crate::data::Provider;
use thiserror::Error;

/// Failure fetching or normalizing the issues of a single source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("invalid configuration for source '{source_name}': {reason}")]
    InvalidSourceConfiguration { source_name: String, reason: String },

    #[error("error fetching issues at {url} for source '{source_name}': {message}")]
    Fetch {
        source_name: String,
        url: String,
        message: String,
    },

    #[error("issue mapping for provider {provider} is not supported (source '{source_name}')")]
    UnsupportedProviderMapping {
        source_name: String,
        provider: Provider,
    },

    #[error("timed out after {secs}s fetching source '{source_name}'")]
    Timeout { source_name: String, secs: u64 },
}

impl SourceError {
    pub fn source_name(&self) -> &str {
        match self {
            Self::InvalidSourceConfiguration { source_name, .. }
            | Self::Fetch { source_name, .. }
            | Self::UnsupportedProviderMapping { source_name, .. }
            | Self::Timeout { source_name, .. } => source_name,
        }
    }
}

/// Errors raised while feeding actions to the board state machine.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("unrecognized action '{0}'")]
    UnrecognizedAction(String),

    #[error("malformed payload for action '{command}': {source}")]
    MalformedAction {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}
