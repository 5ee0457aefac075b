//! Gitea sources.
//!
//! Only the endpoint is known; issue normalization is not implemented, so
//! fetching a Gitea source fails with `UnsupportedProviderMapping`.

use crate::data::Source;

pub fn issues_url(source: &Source) -> String {
    format!(
        "{}/api/v1/repos/{}/issues/",
        source.base_domain().unwrap_or_default(),
        source.url.trim()
    )
}
