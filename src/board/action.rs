//! Actions accepted by the board state machine and the effects it emits.
//!
//! Actions serialize as `{"command": "<tag>", ...payload}` so a view layer can
//! drive the board with plain JSON.

use crate::data::{Issue, PartitionKey, Source};
use crate::error::BoardError;
use serde::{Deserialize, Serialize};

/// Address of a grid cell by positional column and row ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub column: String,
    pub row: String,
}

impl CellRef {
    pub fn new(column: &str, row: &str) -> Self {
        Self {
            column: column.to_string(),
            row: row.to_string(),
        }
    }
}

/// Every transition the board understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────
    /// Start a new load: bump the epoch and clear issues and grid
    #[serde(rename = "issues-data-load-start")]
    LoadStart,
    /// Append one source's batch of issues
    #[serde(rename = "issues-data-push")]
    IssuesPush {
        epoch: u64,
        #[serde(default)]
        source: Option<String>,
        issues: Vec<Issue>,
    },
    /// Record that one source failed to load
    #[serde(rename = "issues-data-source-failed")]
    SourceFailed {
        epoch: u64,
        source: String,
        error: String,
    },
    /// Every source of the load has reported
    #[serde(rename = "issues-data-load-complete")]
    LoadComplete { epoch: u64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Sources
    // ─────────────────────────────────────────────────────────────────────────
    /// Append sources to the list
    #[serde(rename = "sources-data-push")]
    SourcesPush { sources: Vec<Source> },
    /// Replace the source list and persist it
    #[serde(rename = "modal-settings-save-sources")]
    SaveSources { sources: Vec<Source> },

    // ─────────────────────────────────────────────────────────────────────────
    // View settings
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(rename = "view-mode-columns")]
    SetColumnsMode { mode: PartitionKey },
    #[serde(rename = "view-mode-rows")]
    SetRowsMode { mode: PartitionKey },
    #[serde(rename = "modal-about-show-toggle")]
    ToggleAbout,
    /// Closing the settings panel recomputes the grid
    #[serde(rename = "modal-settings-show-toggle")]
    ToggleSettings,
    ToggleTheme,
    /// Recompute the grid from the issue list, discarding manual placements
    RefreshView,

    // ─────────────────────────────────────────────────────────────────────────
    // Drag and drop
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(rename = "drag-issue")]
    DragStart { issue: Issue, origin: CellRef },
    DragOver { target: CellRef },
    #[serde(rename = "drag-drop")]
    Drop { target: CellRef },
    DragOverIssue { target: CellRef, issue_id: String },
    #[serde(rename = "drag-drop-issue")]
    DropOnIssue { target: CellRef, issue_id: String },
}

impl Action {
    /// Every command tag [`Action::from_json`] accepts
    pub const COMMANDS: &'static [&'static str] = &[
        "issues-data-load-start",
        "issues-data-push",
        "issues-data-source-failed",
        "issues-data-load-complete",
        "sources-data-push",
        "modal-settings-save-sources",
        "view-mode-columns",
        "view-mode-rows",
        "modal-about-show-toggle",
        "modal-settings-show-toggle",
        "toggle-theme",
        "refresh-view",
        "drag-issue",
        "drag-over",
        "drag-drop",
        "drag-over-issue",
        "drag-drop-issue",
    ];

    /// Parse an untyped `{"command": ...}` action.
    ///
    /// An unknown or missing command tag is an `UnrecognizedAction`; a known
    /// tag with a bad payload is a `MalformedAction`.
    pub fn from_json(value: serde_json::Value) -> Result<Self, BoardError> {
        let command = value
            .get("command")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string();

        if !Self::COMMANDS.contains(&command.as_str()) {
            return Err(BoardError::UnrecognizedAction(command));
        }

        serde_json::from_value(value)
            .map_err(|source| BoardError::MalformedAction { command, source })
    }

    /// Command tag this action serializes with
    pub fn command(&self) -> &'static str {
        match self {
            Self::LoadStart => "issues-data-load-start",
            Self::IssuesPush { .. } => "issues-data-push",
            Self::SourceFailed { .. } => "issues-data-source-failed",
            Self::LoadComplete { .. } => "issues-data-load-complete",
            Self::SourcesPush { .. } => "sources-data-push",
            Self::SaveSources { .. } => "modal-settings-save-sources",
            Self::SetColumnsMode { .. } => "view-mode-columns",
            Self::SetRowsMode { .. } => "view-mode-rows",
            Self::ToggleAbout => "modal-about-show-toggle",
            Self::ToggleSettings => "modal-settings-show-toggle",
            Self::ToggleTheme => "toggle-theme",
            Self::RefreshView => "refresh-view",
            Self::DragStart { .. } => "drag-issue",
            Self::DragOver { .. } => "drag-over",
            Self::Drop { .. } => "drag-drop",
            Self::DragOverIssue { .. } => "drag-over-issue",
            Self::DropOnIssue { .. } => "drag-drop-issue",
        }
    }
}

/// Side effects requested by a transition, executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write the full source list to durable storage
    PersistSources(Vec<Source>),
    /// The source list changed; issues should be fetched again
    ReloadIssues,
}
