use crate::data::{Issue, IssueAssignee, IssueLabel, IssueMilestone, Source};
use crate::integrations::{json_id, parse_timestamp};
use serde_json::Value;

const GITLAB_DEFAULT_URL: &str = "https://gitlab.com";

/// GitLab only returns plain label names, so every label gets this color
const LABEL_COLOR: &str = "666666";

/// `url` is a numeric project id or a full `group/project` path; paths must
/// be percent-encoded as a single segment.
pub fn issues_url(source: &Source) -> String {
    format!(
        "{}/api/v4/projects/{}/issues?per_page=100",
        source.base_domain().unwrap_or(GITLAB_DEFAULT_URL),
        urlencoding::encode(source.url.trim())
    )
}

/// GitLab says "opened" where everyone else says "open"
fn normalize_state(state: &str) -> String {
    match state {
        "opened" => "open".to_string(),
        other => other.to_string(),
    }
}

fn parse_user(u: &Value) -> Option<IssueAssignee> {
    Some(IssueAssignee {
        id: json_id(&u["id"]),
        login: u["username"].as_str()?.to_string(),
        avatar_url: u["avatar_url"].as_str().map(String::from),
        url: u["web_url"].as_str().map(String::from),
    })
}

fn parse_issue(node: &Value, source_name: &str) -> Option<Issue> {
    let labels = node["labels"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|l| l.as_str())
                .enumerate()
                .map(|(idx, name)| IssueLabel {
                    id: idx.to_string(),
                    name: name.to_string(),
                    color: LABEL_COLOR.to_string(),
                    description: name.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut assignees: Vec<IssueAssignee> = node["assignees"]
        .as_array()
        .map(|arr| arr.iter().filter_map(parse_user).collect())
        .unwrap_or_default();
    if let Some(single) = parse_user(&node["assignee"]) {
        if !assignees.iter().any(|a| a.id == single.id) {
            assignees.push(single);
        }
    }

    let milestone = if node["milestone"].is_object() {
        let m = &node["milestone"];
        m["title"].as_str().map(|title| IssueMilestone {
            id: Some(json_id(&m["id"])).filter(|id| !id.is_empty()),
            title: title.to_string(),
            state: m["state"].as_str().map(String::from),
            due_on: parse_timestamp(&m["due_date"]),
            html_url: m["web_url"].as_str().map(String::from),
        })
    } else {
        None
    };

    let web_url = node["web_url"].as_str().unwrap_or("").to_string();
    let api_url = node["_links"]["self"]
        .as_str()
        .map(String::from)
        .unwrap_or_else(|| web_url.clone());

    Some(Issue {
        id: json_id(&node["id"]),
        // `iid` is the number shown in the GitLab UI
        number: node["iid"].as_u64().or_else(|| node["id"].as_u64())?,
        title: node["title"].as_str()?.to_string(),
        state: normalize_state(node["state"].as_str().unwrap_or("")),
        labels,
        assignees,
        milestone,
        url: api_url,
        html_url: web_url,
        provider: source_name.to_string(),
        created_at: parse_timestamp(&node["created_at"]),
        updated_at: parse_timestamp(&node["updated_at"]),
        closed_at: parse_timestamp(&node["closed_at"]),
    })
}

/// Normalize a GitLab issue list payload, skipping entries that lack a
/// number or title
pub fn map_issues(body: &Value, source_name: &str) -> Result<Vec<Issue>, String> {
    let nodes = body
        .as_array()
        .ok_or_else(|| format!("unexpected GitLab issue payload: {}", body))?;

    let issues: Vec<Issue> = nodes
        .iter()
        .filter_map(|node| parse_issue(node, source_name))
        .collect();

    if issues.len() < nodes.len() {
        tracing::debug!(
            "Skipped {} malformed GitLab issues from '{}'",
            nodes.len() - issues.len(),
            source_name
        );
    }
    Ok(issues)
}
