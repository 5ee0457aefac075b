//! Drag and drop over grid cells.
//!
//! A drop edits the grid rows in place without going back to the issue list,
//! so after a successful move the grid no longer matches what
//! [`super::compute_grid`] would produce. The caller tracks that divergence.

use super::{CellRef, Grid};
use crate::data::Issue;
use serde::Serialize;

/// Issue being dragged and the cell it was picked up from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragSource {
    pub issue: Issue,
    pub origin: CellRef,
}

/// Transient drag state; never persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DragState {
    pub dragging: Option<DragSource>,
    pub dropping: Option<CellRef>,
}

impl DragState {
    pub fn is_active(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn clear(&mut self) {
        self.dragging = None;
        self.dropping = None;
    }
}

/// Move the dragged issue from its origin cell to `target`.
///
/// Returns `true` when the grid changed. The drag state is cleared either way.
pub(super) fn drop_on_cell(grid: &mut Grid, drag: &mut DragState, target: &CellRef) -> bool {
    let dragging = drag.dragging.take();
    drag.dropping = None;

    let Some(DragSource { issue, origin }) = dragging else {
        tracing::debug!("Drop on {:?} ignored: nothing is being dragged", target);
        return false;
    };

    if origin == *target {
        return false;
    }

    if grid.cell(target).is_none() {
        tracing::debug!("Drop ignored: no cell {:?} in grid", target);
        return false;
    }

    let Some(origin_row) = grid.cell_mut(&origin) else {
        tracing::debug!("Drop ignored: origin cell {:?} no longer in grid", origin);
        return false;
    };
    // ids collide across sources, so cards are matched as a whole
    origin_row.issues.retain(|i| i != &issue);

    if let Some(target_row) = grid.cell_mut(target) {
        if !target_row.issues.contains(&issue) {
            target_row.issues.push(issue);
        }
    }
    true
}

/// Swap the dragged issue with the one under the pointer.
///
/// Only works inside the origin row; there is no index-based reordering.
pub(super) fn drop_on_issue(
    grid: &mut Grid,
    drag: &mut DragState,
    target: &CellRef,
    target_issue_id: &str,
) -> bool {
    let dragging = drag.dragging.take();
    drag.dropping = None;

    let Some(source) = dragging else {
        return false;
    };
    if source.origin != *target {
        return false;
    }

    let Some(row) = grid.cell_mut(target) else {
        return false;
    };
    let from = row.issues.iter().position(|i| i == &source.issue);
    let to = row.issues.iter().position(|i| i.id == target_issue_id);
    match (from, to) {
        (Some(from), Some(to)) if from != to => {
            row.issues.swap(from, to);
            true
        }
        _ => false,
    }
}
