use super::action::{Action, Effect};
use super::drag::{self, DragSource, DragState};
use super::pivot::compute_grid;
use super::Grid;
use crate::data::{Issue, PartitionKey, Source, Theme};
use serde::Serialize;

/// Outcome of loading one source during the current epoch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    Loaded { issues: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLoad {
    pub source: String,
    pub status: LoadStatus,
}

/// Fetched issues plus bookkeeping for the load that produced them.
///
/// `epoch` increases with every load start. Batches tagged with an older
/// epoch belong to a superseded load and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Repository {
    pub issues: Vec<Issue>,
    pub epoch: u64,
    pub loading: bool,
    pub loads: Vec<SourceLoad>,
}

impl Repository {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.loads.iter().filter_map(|l| match &l.status {
            LoadStatus::Failed { error } => Some((l.source.as_str(), error.as_str())),
            LoadStatus::Loaded { .. } => None,
        })
    }
}

/// The whole board as one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardState {
    pub theme: Theme,
    pub columns_mode: PartitionKey,
    pub rows_mode: PartitionKey,
    pub show_about: bool,
    pub show_settings: bool,
    pub sources: Vec<Source>,
    pub repository: Repository,
    pub grid: Grid,
    /// Set after a drop moved an issue by hand; cleared by any recompute
    pub grid_diverged: bool,
    #[serde(skip)]
    pub drag: DragState,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            columns_mode: PartitionKey::Label,
            rows_mode: PartitionKey::Milestone,
            show_about: true,
            show_settings: false,
            sources: Vec::new(),
            repository: Repository::default(),
            grid: Grid::default(),
            grid_diverged: false,
            drag: DragState::default(),
        }
    }
}

/// Next state plus the effects the driver has to run
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BoardState,
    pub effects: Vec<Effect>,
}

/// Pure transition: consume a state and an action, return the next state.
pub fn transition(state: BoardState, action: Action) -> Transition {
    let mut state = state;
    let effects = state.apply(action);
    Transition { state, effects }
}

impl BoardState {
    pub fn issues(&self) -> &[Issue] {
        &self.repository.issues
    }

    pub fn epoch(&self) -> u64 {
        self.repository.epoch
    }

    pub fn is_loading(&self) -> bool {
        self.repository.loading
    }

    /// Rebuild the grid from the issue list and the current view modes.
    ///
    /// Manual drop placements are discarded, and so is any drag in flight
    /// since its cell ids belong to the previous grid.
    pub fn reconcile(&mut self) {
        self.grid = compute_grid(&self.repository.issues, self.columns_mode, self.rows_mode);
        self.grid_diverged = false;
        self.drag.clear();
    }

    fn is_current(&self, epoch: u64, command: &str) -> bool {
        if epoch == self.repository.epoch {
            return true;
        }
        tracing::debug!(
            "Ignoring {} from stale load epoch {} (current {})",
            command,
            epoch,
            self.repository.epoch
        );
        false
    }

    /// Apply one action in place and return the requested effects.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        let command = action.command();
        match action {
            // ─────────────────────────────────────────────────────────────────
            // Loading
            // ─────────────────────────────────────────────────────────────────
            Action::LoadStart => {
                let repo = &mut self.repository;
                repo.epoch += 1;
                repo.issues.clear();
                repo.loads.clear();
                repo.loading = true;
                self.grid = Grid::default();
                self.grid_diverged = false;
                self.drag.clear();
            }
            Action::IssuesPush {
                epoch,
                source,
                issues,
            } => {
                if self.is_current(epoch, command) {
                    if let Some(source) = source {
                        self.repository.loads.push(SourceLoad {
                            source,
                            status: LoadStatus::Loaded {
                                issues: issues.len(),
                            },
                        });
                    }
                    self.repository.issues.extend(issues);
                    self.reconcile();
                }
            }
            Action::SourceFailed {
                epoch,
                source,
                error,
            } => {
                if self.is_current(epoch, command) {
                    tracing::warn!("Source '{}' failed to load: {}", source, error);
                    self.repository.loads.push(SourceLoad {
                        source,
                        status: LoadStatus::Failed { error },
                    });
                }
            }
            Action::LoadComplete { epoch } => {
                if self.is_current(epoch, command) {
                    self.repository.loading = false;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Sources
            // ─────────────────────────────────────────────────────────────────
            Action::SourcesPush { sources } => {
                self.sources.extend(sources);
                return vec![Effect::ReloadIssues];
            }
            Action::SaveSources { sources } => {
                self.sources = sources;
                return vec![
                    Effect::PersistSources(self.sources.clone()),
                    Effect::ReloadIssues,
                ];
            }

            // ─────────────────────────────────────────────────────────────────
            // View settings
            // ─────────────────────────────────────────────────────────────────
            Action::SetColumnsMode { mode } => self.columns_mode = mode,
            Action::SetRowsMode { mode } => self.rows_mode = mode,
            Action::ToggleAbout => self.show_about = !self.show_about,
            Action::ToggleSettings => {
                if self.show_settings {
                    self.reconcile();
                }
                self.show_settings = !self.show_settings;
            }
            Action::ToggleTheme => self.theme = self.theme.toggled(),
            Action::RefreshView => self.reconcile(),

            // ─────────────────────────────────────────────────────────────────
            // Drag and drop
            // ─────────────────────────────────────────────────────────────────
            Action::DragStart { issue, origin } => {
                self.drag.dragging = Some(DragSource { issue, origin });
            }
            Action::DragOver { target } => self.drag.dropping = Some(target),
            Action::Drop { target } => {
                if drag::drop_on_cell(&mut self.grid, &mut self.drag, &target) {
                    self.grid_diverged = true;
                }
            }
            Action::DragOverIssue { .. } => {}
            Action::DropOnIssue { target, issue_id } => {
                if drag::drop_on_issue(&mut self.grid, &mut self.drag, &target, &issue_id) {
                    self.grid_diverged = true;
                }
            }
        }
        Vec::new()
    }
}
