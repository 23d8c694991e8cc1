//! Turn a drag gesture over top-level rows into block moves on the task list.
//!
//! Rows are ordinals among top-level tasks; subtasks have no handle and ride
//! along with their parent. Every step relocates the whole block (parent plus
//! its subtask run) in a single replace of the list.

use tracing::debug;

use crate::model::task::TaskNode;
use crate::ops::projection::{block_range, top_level_indices};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DragError {
    #[error("no drag in progress")]
    NotDragging,
    #[error("row {row} out of range ({rows} top-level rows)")]
    OutOfRange { row: usize, rows: usize },
}

/// Tracks one drag gesture. `source` is the row the dragged block currently
/// occupies, updated after every hover.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DragController {
    source: Option<usize>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row currently being dragged, if any
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    /// Begin dragging the block at `row`.
    pub fn start(&mut self, tasks: &[TaskNode], row: usize) -> Result<(), DragError> {
        let rows = top_level_indices(tasks).len();
        if row >= rows {
            return Err(DragError::OutOfRange { row, rows });
        }
        self.source = Some(row);
        debug!(row, "drag started");
        Ok(())
    }

    /// The pointer is over `hover_row`: move the dragged block so it becomes
    /// that row. Returns `false` when it is already there.
    pub fn over(&mut self, tasks: &mut Vec<TaskNode>, hover_row: usize) -> Result<bool, DragError> {
        let source = self.source.ok_or(DragError::NotDragging)?;
        if hover_row == source {
            return Ok(false);
        }
        let moved = move_block(tasks, source, hover_row)?;
        self.source = Some(hover_row);
        debug!(from = source, to = hover_row, "drag moved block");
        Ok(moved)
    }

    /// Finish the gesture and return the row the block ended on.
    pub fn end(&mut self) -> Option<usize> {
        let row = self.source.take();
        debug!(?row, "drag ended");
        row
    }
}

/// Relocate the block at top-level row `from` so it becomes row `to`.
///
/// Subtasks at the head of the list with no parent are never moved, and no
/// block is placed ahead of them.
pub fn move_block(tasks: &mut Vec<TaskNode>, from: usize, to: usize) -> Result<bool, DragError> {
    let rows = top_level_indices(tasks);
    for row in [from, to] {
        if row >= rows.len() {
            return Err(DragError::OutOfRange {
                row,
                rows: rows.len(),
            });
        }
    }
    if from == to {
        return Ok(false);
    }

    let mut rest = tasks.clone();
    let block: Vec<TaskNode> = rest.drain(block_range(tasks, rows[from])).collect();

    // `rest` has one fewer row; the block goes where row `to` now starts,
    // or after everything when it becomes the last row.
    let remaining = top_level_indices(&rest);
    let insert_at = match remaining.get(to) {
        Some(&idx) => idx,
        None => rest.len(),
    };
    rest.splice(insert_at..insert_at, block);
    *tasks = rest;
    Ok(true)
}
