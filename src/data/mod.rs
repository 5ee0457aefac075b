use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An issue normalized from any provider.
///
/// `id` comes straight from the provider and is not unique across sources.
/// `provider` holds the display name of the source the issue was fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    #[serde(default)]
    pub assignees: Vec<IssueAssignee>,
    #[serde(default)]
    pub milestone: Option<IssueMilestone>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    pub provider: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Milestone title, treating a missing milestone and an empty title alike
    pub fn milestone_title(&self) -> Option<&str> {
        self.milestone
            .as_ref()
            .map(|m| m.title.as_str())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLabel {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAssignee {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueMilestone {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Hosting provider of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Github,
    Gitlab,
    Gitea,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Gitea => "gitea",
        }
    }

    /// What the `url` field of a source means for this provider
    pub fn url_hint(&self) -> &'static str {
        match self {
            Self::Github => "organization/repository",
            Self::Gitlab => "project id or full project path",
            Self::Gitea => "owner/repository",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Github, Self::Gitlab, Self::Gitea].into_iter()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown provider '{}' (expected github, gitlab or gitea)", s))
    }
}

/// A configured project issues are fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    /// Base URL of a self-hosted instance; ignored for GitHub
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, alias = "apikey")]
    pub api_key: String,
    pub provider: Provider,
}

impl Source {
    pub fn github(repo: &str) -> Self {
        Self {
            name: repo.to_string(),
            url: repo.to_string(),
            domain: None,
            api_key: String::new(),
            provider: Provider::Github,
        }
    }

    /// Domain with any trailing slash removed, `None` when unset or blank
    pub fn base_domain(&self) -> Option<&str> {
        self.domain
            .as_deref()
            .map(|d| d.trim().trim_end_matches('/'))
            .filter(|d| !d.is_empty())
    }
}

/// Sources used when nothing has been saved yet
pub fn default_sources() -> Vec<Source> {
    vec![Source::github("denoland/deno"), Source::github("denoland/fresh")]
}

/// Issue attribute used to bucket one axis of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKey {
    State,
    Label,
    Assignee,
    Milestone,
}

impl PartitionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Label => "label",
            Self::Assignee => "assignee",
            Self::Milestone => "milestone",
        }
    }

    /// Whether one issue can fall into several buckets along this axis
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Label | Self::Assignee)
    }

    /// Title shown for the empty bucket of this axis
    pub fn empty_title(&self) -> &'static str {
        match self {
            Self::State => "no state",
            Self::Label => "no label",
            Self::Assignee => "no assignee",
            Self::Milestone => "no milestone",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::State, Self::Milestone, Self::Assignee, Self::Label].into_iter()
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all().find(|k| k.as_str() == s).ok_or_else(|| {
            format!(
                "unknown partition key '{}' (expected state, milestone, assignee or label)",
                s
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}
