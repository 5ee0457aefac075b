pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod loader;

use crate::data::{Issue, Provider, Source};
use crate::error::SourceError;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use std::time::Duration;

/// Shared HTTP client for all API requests to enable connection pooling
pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(5)
        .user_agent(concat!("poari/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Shortest accepted `url` for a source
const MIN_SOURCE_URL_LEN: usize = 3;

/// Reject sources that cannot possibly be fetched, before any request is made
pub fn validate(source: &Source) -> Result<(), SourceError> {
    let invalid = |reason: &str| SourceError::InvalidSourceConfiguration {
        source_name: source.name.clone(),
        reason: reason.to_string(),
    };

    if source.url.trim().chars().count() < MIN_SOURCE_URL_LEN {
        return Err(invalid("url is empty or too short"));
    }
    if source.provider == Provider::Gitea && source.base_domain().is_none() {
        return Err(invalid("gitea sources need a domain"));
    }
    Ok(())
}

/// API endpoint listing the issues of a source
pub fn issues_url(source: &Source) -> Result<String, SourceError> {
    validate(source)?;
    Ok(match source.provider {
        Provider::Github => github::issues_url(source),
        Provider::Gitlab => gitlab::issues_url(source),
        Provider::Gitea => gitea::issues_url(source),
    })
}

type IssueMapper = fn(&serde_json::Value, &str) -> Result<Vec<Issue>, String>;

fn mapper_for(source: &Source) -> Result<IssueMapper, SourceError> {
    match source.provider {
        Provider::Github => Ok(github::map_issues),
        Provider::Gitlab => Ok(gitlab::map_issues),
        Provider::Gitea => Err(SourceError::UnsupportedProviderMapping {
            source_name: source.name.clone(),
            provider: source.provider,
        }),
    }
}

/// Fetch and normalize every issue of one source.
///
/// Configuration and mapping problems are reported before any request.
pub async fn fetch_issues(source: &Source) -> Result<Vec<Issue>, SourceError> {
    let url = issues_url(source)?;
    let map = mapper_for(source)?;

    let fetch_error = |message: String| SourceError::Fetch {
        source_name: source.name.clone(),
        url: url.clone(),
        message,
    };

    let mut request = HTTP_CLIENT.get(&url);
    if !source.api_key.is_empty() {
        request = request.header("Authorization", format!("Bearer {}", source.api_key));
    }
    if source.provider == Provider::Github {
        request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
    }

    let response = request
        .send()
        .await
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!(
            "{} API error: {}",
            source.provider,
            response.status()
        )));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| fetch_error(format!("invalid JSON: {}", e)))?;

    let issues = map(&body, &source.name).map_err(fetch_error)?;
    tracing::debug!("Fetched {} issues from '{}'", issues.len(), source.name);
    Ok(issues)
}

/// Provider ids arrive as numbers or strings
pub(crate) fn json_id(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as midnight UTC
pub(crate) fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    s.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(provider: Provider, url: &str, domain: Option<&str>) -> Source {
        Source {
            name: "test".into(),
            url: url.into(),
            domain: domain.map(String::from),
            api_key: String::new(),
            provider,
        }
    }

    #[test]
    fn test_short_url_rejected() {
        for url in ["", "ab", "  a  "] {
            let err = validate(&source(Provider::Github, url, None)).unwrap_err();
            assert!(matches!(err, SourceError::InvalidSourceConfiguration { .. }));
        }
        assert!(validate(&source(Provider::Github, "a/b", None)).is_ok());
    }

    #[test]
    fn test_gitea_needs_domain() {
        assert!(validate(&source(Provider::Gitea, "owner/repo", None)).is_err());
        assert!(validate(&source(Provider::Gitea, "owner/repo", Some("https://git.example"))).is_ok());
    }

    #[test]
    fn test_gitea_mapping_unsupported() {
        let err = mapper_for(&source(Provider::Gitea, "owner/repo", Some("https://g"))).unwrap_err();
        assert!(matches!(
            err,
            SourceError::UnsupportedProviderMapping {
                provider: Provider::Gitea,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_rejects_before_network() {
        // No server listens here; the error must come from validation
        let err = fetch_issues(&source(Provider::Github, "x", None)).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidSourceConfiguration { .. }));

        let err = fetch_issues(&source(Provider::Gitea, "owner/repo", Some("http://127.0.0.1:9")))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedProviderMapping { .. }));
    }

    #[test]
    fn test_json_id() {
        assert_eq!(json_id(&json!(42)), "42");
        assert_eq!(json_id(&json!("abc")), "abc");
        assert_eq!(json_id(&json!(null)), "");
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp(&json!("2024-03-01T10:00:00Z")).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        let day = parse_timestamp(&json!("2024-03-01")).unwrap();
        assert_eq!(day.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(parse_timestamp(&json!(null)).is_none());
        assert!(parse_timestamp(&json!("soon")).is_none());
    }
}
