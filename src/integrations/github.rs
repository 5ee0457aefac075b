use crate::data::{Issue, IssueAssignee, IssueLabel, IssueMilestone, Source};
use crate::integrations::{json_id, parse_timestamp};
use serde::Deserialize;
use serde_json::Value;

const GITHUB_API_URL: &str = "https://api.github.com";

// REST payload of `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Deserialize)]
struct IssueNode {
    id: Value,
    number: u64,
    title: String,
    state: String,
    #[serde(default)]
    labels: Vec<LabelNode>,
    #[serde(default)]
    assignee: Option<UserNode>,
    #[serde(default)]
    assignees: Vec<UserNode>,
    #[serde(default)]
    milestone: Option<MilestoneNode>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    updated_at: Value,
    #[serde(default)]
    closed_at: Value,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    #[serde(default)]
    id: Value,
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    id: Value,
    login: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MilestoneNode {
    #[serde(default)]
    id: Value,
    title: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    due_on: Value,
    #[serde(default)]
    html_url: Option<String>,
}

pub fn issues_url(source: &Source) -> String {
    format!(
        "{}/repos/{}/issues?state=all&per_page=100",
        GITHUB_API_URL,
        source.url.trim()
    )
}

impl From<UserNode> for IssueAssignee {
    fn from(u: UserNode) -> Self {
        Self {
            id: json_id(&u.id),
            login: u.login,
            avatar_url: u.avatar_url,
            url: u.url,
        }
    }
}

fn parse_issue_node(node: IssueNode, source_name: &str) -> Issue {
    let mut assignees: Vec<IssueAssignee> =
        node.assignees.into_iter().map(IssueAssignee::from).collect();
    // Older payloads only carry the single `assignee` field
    if let Some(single) = node.assignee.map(IssueAssignee::from) {
        if !assignees.iter().any(|a| a.id == single.id) {
            assignees.push(single);
        }
    }

    Issue {
        id: json_id(&node.id),
        number: node.number,
        title: node.title,
        state: node.state,
        labels: node
            .labels
            .into_iter()
            .map(|l| IssueLabel {
                id: json_id(&l.id),
                name: l.name,
                color: l.color,
                description: l.description.unwrap_or_default(),
            })
            .collect(),
        assignees,
        milestone: node.milestone.map(|m| IssueMilestone {
            id: Some(json_id(&m.id)).filter(|id| !id.is_empty()),
            title: m.title,
            state: m.state,
            due_on: parse_timestamp(&m.due_on),
            html_url: m.html_url,
        }),
        url: node.url,
        html_url: node.html_url,
        provider: source_name.to_string(),
        created_at: parse_timestamp(&node.created_at),
        updated_at: parse_timestamp(&node.updated_at),
        closed_at: parse_timestamp(&node.closed_at),
    }
}

/// Normalize a GitHub issue list payload
pub fn map_issues(body: &Value, source_name: &str) -> Result<Vec<Issue>, String> {
    let nodes: Vec<IssueNode> = serde_json::from_value(body.clone())
        .map_err(|e| format!("unexpected GitHub issue payload: {}", e))?;
    Ok(nodes
        .into_iter()
        .map(|node| parse_issue_node(node, source_name))
        .collect())
}
