use chrono::NaiveDate;
use tracing::debug;

use crate::model::board::Board;
use crate::model::task::{Priority, TaskNode};
use crate::model::view::{ViewState, toggle as toggle_membership};
use crate::ops::projection::{block_range, orphans};
use crate::ops::{next_id, today};
use crate::util::text::{normalize_tag, parse_title_and_tags};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),
    #[error("task {0} is a subtask; only top-level tasks can do that")]
    NotTopLevel(String),
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("no task ids left for prefix {0}")]
    IdsExhausted(String),
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Append a new top-level task. Trailing `#tags` in the title become tags.
/// Returns the assigned ID.
pub fn add_task(board: &mut Board, title: &str, prefix: &str) -> Result<String, TaskError> {
    let task = new_node(board, title, 0, prefix)?;
    let id = task.id.clone();
    board.tasks.push(task);
    debug!(task = %id, "added task");
    Ok(id)
}

/// Add a subtask under top-level task `parent_id`, after any subtasks it
/// already has. Returns the assigned ID.
pub fn add_subtask(
    board: &mut Board,
    parent_id: &str,
    title: &str,
    prefix: &str,
) -> Result<String, TaskError> {
    let parent_idx = board
        .task_index(parent_id)
        .ok_or_else(|| TaskError::NotFound(parent_id.to_string()))?;
    if !board.tasks[parent_idx].is_top_level() {
        return Err(TaskError::NotTopLevel(parent_id.to_string()));
    }

    let task = new_node(board, title, 1, prefix)?;
    let id = task.id.clone();
    let insert_at = block_range(&board.tasks, parent_idx).end;
    board.tasks.insert(insert_at, task);
    debug!(task = %id, parent = parent_id, index = insert_at, "added subtask");
    Ok(id)
}

fn new_node(board: &Board, title: &str, depth: usize, prefix: &str) -> Result<TaskNode, TaskError> {
    let (title, tags) = parse_title_and_tags(title);
    if title.is_empty() {
        return Err(TaskError::EmptyInput("task title"));
    }
    let id = next_id(prefix, board.tasks.iter().map(|t| t.id.as_str()))
        .ok_or_else(|| TaskError::IdsExhausted(prefix.to_string()))?;
    let mut task = TaskNode::new(id, title, depth, today());
    task.tags = tags;
    Ok(task)
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

/// Flip `completed` on one task. Parents and subtasks are left alone.
/// Returns the new value.
pub fn toggle_complete(board: &mut Board, task_id: &str) -> Result<bool, TaskError> {
    let task = find_mut(board, task_id)?;
    task.completed = !task.completed;
    debug!(task = task_id, completed = task.completed, "toggled completion");
    Ok(task.completed)
}

pub fn set_priority(
    board: &mut Board,
    task_id: &str,
    priority: Option<Priority>,
) -> Result<(), TaskError> {
    find_mut(board, task_id)?.priority = priority;
    debug!(task = task_id, ?priority, "set priority");
    Ok(())
}

/// Set or clear the assignee. A blank name clears it.
pub fn set_assignee(
    board: &mut Board,
    task_id: &str,
    assignee: Option<&str>,
) -> Result<(), TaskError> {
    let assignee = assignee
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);
    let task = find_mut(board, task_id)?;
    debug!(task = task_id, ?assignee, "set assignee");
    task.assignee = assignee;
    Ok(())
}

pub fn set_due_date(
    board: &mut Board,
    task_id: &str,
    due: Option<NaiveDate>,
) -> Result<(), TaskError> {
    find_mut(board, task_id)?.due_date = due;
    debug!(task = task_id, ?due, "set due date");
    Ok(())
}

/// Replace a task's title. Trailing `#tags` are added to the existing tags.
pub fn edit_title(board: &mut Board, task_id: &str, new_title: &str) -> Result<(), TaskError> {
    let (title, new_tags) = parse_title_and_tags(new_title);
    if title.is_empty() {
        return Err(TaskError::EmptyInput("task title"));
    }
    let task = find_mut(board, task_id)?;
    task.title = title;
    for tag in new_tags {
        if !task.tags.contains(&tag) {
            task.tags.push(tag);
        }
    }
    Ok(())
}

pub fn add_tag(board: &mut Board, task_id: &str, tag: &str) -> Result<(), TaskError> {
    let tag = normalize_tag(tag).ok_or(TaskError::EmptyInput("tag"))?;
    let task = find_mut(board, task_id)?;
    if !task.tags.contains(&tag) {
        task.tags.push(tag);
    }
    Ok(())
}

pub fn remove_tag(board: &mut Board, task_id: &str, tag: &str) -> Result<(), TaskError> {
    let tag = tag.trim().trim_start_matches('#');
    find_mut(board, task_id)?.tags.retain(|t| t != tag);
    Ok(())
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

/// Remove a single task and its attachments.
///
/// Only the named node is removed. Deleting a top-level task leaves its
/// subtasks where they are, so they fall to whichever top-level task now
/// precedes them, or become orphans at the head of the list.
pub fn delete_task(board: &mut Board, task_id: &str) -> Result<TaskNode, TaskError> {
    let idx = board
        .task_index(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    let removed = board.tasks.remove(idx);
    board.attachments.shift_remove(task_id);
    debug!(task = task_id, "deleted task");
    Ok(removed)
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Flip whether a top-level task's subtasks are shown. Subtasks cannot be
/// expanded; for them this does nothing. Returns whether the task is now
/// expanded.
pub fn toggle_expanded(
    board: &Board,
    view: &mut ViewState,
    task_id: &str,
) -> Result<bool, TaskError> {
    let task = board
        .task(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if !task.is_top_level() {
        return Ok(false);
    }
    Ok(toggle_membership(&mut view.expanded, task_id))
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Where to put a moved task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertPosition {
    /// First top-level row
    Top,
    /// Last top-level row
    Bottom,
    /// Directly after the top-level task with this ID (and its subtasks)
    After(String),
}

/// Move a top-level task, together with its subtasks, to a new position.
pub fn move_task(
    board: &mut Board,
    task_id: &str,
    position: InsertPosition,
) -> Result<(), TaskError> {
    let idx = board
        .task_index(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    if !board.tasks[idx].is_top_level() {
        return Err(TaskError::NotTopLevel(task_id.to_string()));
    }
    if let InsertPosition::After(after_id) = &position {
        if after_id == task_id {
            return Err(TaskError::InvalidPosition(format!(
                "cannot move {} after itself",
                task_id
            )));
        }
        let target = board
            .task(after_id)
            .ok_or_else(|| TaskError::NotFound(format!("after target {}", after_id)))?;
        if !target.is_top_level() {
            return Err(TaskError::InvalidPosition(format!(
                "{} is a subtask",
                after_id
            )));
        }
    }

    let range = block_range(&board.tasks, idx);
    let mut rest = board.tasks.clone();
    let block: Vec<TaskNode> = rest.drain(range).collect();

    let insert_at = match &position {
        InsertPosition::Top => orphans(&rest).len(),
        InsertPosition::Bottom => rest.len(),
        InsertPosition::After(after_id) => {
            // Validated above; the target is outside the drained block.
            let target = rest
                .iter()
                .position(|t| t.id == *after_id)
                .ok_or_else(|| TaskError::NotFound(after_id.clone()))?;
            block_range(&rest, target).end
        }
    };
    rest.splice(insert_at..insert_at, block);
    board.tasks = rest;
    debug!(task = task_id, ?position, "moved task block");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn find_mut<'a>(board: &'a mut Board, task_id: &str) -> Result<&'a mut TaskNode, TaskError> {
    board
        .task_mut(task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
