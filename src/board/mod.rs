//! Board core: the pivot engine, the state machine and its actions.
//!
//! The flow is unidirectional: every change goes through [`transition`] as an
//! [`Action`], and the derived [`Grid`] is recomputed from the issue list by
//! [`compute_grid`] whenever an action can change it.

mod action;
mod drag;
mod pivot;
mod state;

pub use action::{Action, CellRef, Effect};
pub use drag::{DragSource, DragState};
pub use pivot::{bucket_values, compute_grid, matches_bucket};
pub use state::{transition, BoardState, LoadStatus, Repository, SourceLoad, Transition};

use crate::data::Issue;
use serde::Serialize;

/// One distinct value along a partition axis.
///
/// The empty bucket is its own variant so a value that happens to be the
/// empty string can never be mistaken for a named bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    Named(String),
    Empty,
}

impl Bucket {
    /// Raw bucket value, `""` for the empty bucket
    pub fn value(&self) -> &str {
        match self {
            Self::Named(v) => v,
            Self::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Derived board: columns of rows of issues
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grid {
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Positional id, only meaningful within one computation
    pub id: String,
    pub title: String,
    pub bucket: Bucket,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Positional id, only meaningful within one computation
    pub id: String,
    pub title: String,
    pub bucket: Bucket,
    pub issues: Vec<Issue>,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn cell(&self, cell: &CellRef) -> Option<&Row> {
        self.column(&cell.column)?
            .rows
            .iter()
            .find(|r| r.id == cell.row)
    }

    pub fn cell_mut(&mut self, cell: &CellRef) -> Option<&mut Row> {
        self.columns
            .iter_mut()
            .find(|c| c.id == cell.column)?
            .rows
            .iter_mut()
            .find(|r| r.id == cell.row)
    }

    /// Look a cell up by bucket values instead of positional ids
    pub fn find_cell(&self, column: &Bucket, row: &Bucket) -> Option<CellRef> {
        let col = self.columns.iter().find(|c| &c.bucket == column)?;
        let r = col.rows.iter().find(|r| &r.bucket == row)?;
        Some(CellRef::new(&col.id, &r.id))
    }

    /// Total cell memberships; issues in several cells count once per cell
    pub fn issue_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|c| c.rows.iter())
            .map(|r| r.issues.len())
            .sum()
    }

    /// Cells holding the issue with the given id
    pub fn cells_containing(&self, issue_id: &str) -> Vec<CellRef> {
        self.columns
            .iter()
            .flat_map(|c| {
                c.rows
                    .iter()
                    .filter(|r| r.issues.iter().any(|i| i.id == issue_id))
                    .map(move |r| CellRef::new(&c.id, &r.id))
            })
            .collect()
    }
}
