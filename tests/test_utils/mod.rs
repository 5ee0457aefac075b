//! Test fixtures shared by the poari integration tests

#![allow(dead_code)]

use poari::data::{Issue, IssueAssignee, IssueLabel, IssueMilestone, Source};

/// Issue builder with everything optional empty
pub struct IssueBuilder {
    issue: Issue,
}

pub fn issue(id: &str) -> IssueBuilder {
    IssueBuilder {
        issue: Issue {
            id: id.to_string(),
            number: id.parse().unwrap_or(0),
            title: format!("Issue {}", id),
            state: "open".to_string(),
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone: None,
            url: format!("https://api.github.com/repos/o/r/issues/{}", id),
            html_url: format!("https://github.com/o/r/issues/{}", id),
            provider: "o/r".to_string(),
            created_at: None,
            updated_at: None,
            closed_at: None,
        },
    }
}

impl IssueBuilder {
    pub fn state(mut self, state: &str) -> Self {
        self.issue.state = state.to_string();
        self
    }

    pub fn labels(mut self, names: &[&str]) -> Self {
        self.issue.labels = names
            .iter()
            .enumerate()
            .map(|(idx, name)| IssueLabel {
                id: idx.to_string(),
                name: name.to_string(),
                color: "ededed".to_string(),
                description: String::new(),
            })
            .collect();
        self
    }

    pub fn assignees(mut self, logins: &[&str]) -> Self {
        self.issue.assignees = logins
            .iter()
            .map(|login| IssueAssignee {
                id: format!("u-{}", login),
                login: login.to_string(),
                avatar_url: None,
                url: None,
            })
            .collect();
        self
    }

    pub fn milestone(mut self, title: &str) -> Self {
        self.issue.milestone = Some(IssueMilestone {
            id: None,
            title: title.to_string(),
            state: Some("open".to_string()),
            due_on: None,
            html_url: None,
        });
        self
    }

    pub fn provider(mut self, provider: &str) -> Self {
        self.issue.provider = provider.to_string();
        self
    }

    pub fn build(self) -> Issue {
        self.issue
    }
}

/// Mixed bag covering multi-valued, single-valued and missing attributes
pub fn sample_issues() -> Vec<Issue> {
    vec![
        issue("1")
            .labels(&["bug", "ui"])
            .assignees(&["alice"])
            .milestone("v1")
            .build(),
        issue("2").state("closed").labels(&["bug"]).build(),
        issue("3").assignees(&["bob", "alice"]).milestone("v2").build(),
        issue("4").state("closed").labels(&["docs"]).milestone("v1").build(),
        issue("5").build(),
        issue("6").labels(&[""]).assignees(&["carol"]).build(),
    ]
}

pub fn github_source(name: &str) -> Source {
    Source::github(name)
}
