//! Read-only views of the parent/child structure encoded in a flat task list.
//!
//! A subtask has no parent pointer. It belongs to the nearest top-level task
//! above it, so every query here is a linear scan of list order. That is fine
//! for one modal's worth of tasks and is not meant as a general index.

use std::ops::Range;

use crate::model::task::TaskNode;

/// The subtasks of `parent_id`: the contiguous run of depth>0 nodes directly
/// after it. `None` if the id is unknown; empty for a subtask id.
pub fn children_of<'a>(tasks: &'a [TaskNode], parent_id: &str) -> Option<&'a [TaskNode]> {
    let idx = tasks.iter().position(|t| t.id == parent_id)?;
    if !tasks[idx].is_top_level() {
        return Some(&tasks[idx..idx]);
    }
    let range = block_range(tasks, idx);
    Some(&tasks[range.start + 1..range.end])
}

/// The top-level task owning subtask `task_id`. `None` for top-level tasks,
/// unknown ids, and orphans with nothing above them.
pub fn owner_of<'a>(tasks: &'a [TaskNode], task_id: &str) -> Option<&'a TaskNode> {
    let idx = tasks.iter().position(|t| t.id == task_id)?;
    if tasks[idx].is_top_level() {
        return None;
    }
    tasks[..idx].iter().rev().find(|t| t.is_top_level())
}

/// The node at `index` plus the run of subtasks after it.
///
/// For a subtask (or an out-of-range index) this is just `index..index+1`
/// clamped to the list length.
pub fn block_range(tasks: &[TaskNode], index: usize) -> Range<usize> {
    if index >= tasks.len() {
        return tasks.len()..tasks.len();
    }
    let mut end = index + 1;
    if tasks[index].is_top_level() {
        while end < tasks.len() && !tasks[end].is_top_level() {
            end += 1;
        }
    }
    index..end
}

/// Flat-list indices of top-level tasks, in order. The position of an entry
/// in the returned vector is that task's row.
pub fn top_level_indices(tasks: &[TaskNode]) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_top_level())
        .map(|(i, _)| i)
        .collect()
}

/// Subtasks at the head of the list with no top-level task above them.
pub fn orphans(tasks: &[TaskNode]) -> &[TaskNode] {
    let end = tasks
        .iter()
        .position(|t| t.is_top_level())
        .unwrap_or(tasks.len());
    &tasks[..end]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn node(id: &str, depth: usize) -> TaskNode {
        TaskNode::new(
            id.to_string(),
            format!("Task {}", id),
            depth,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        )
    }

    pub(crate) fn ids(tasks: &[TaskNode]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn sample() -> Vec<TaskNode> {
        vec![
            node("P0", 0),
            node("C0", 1),
            node("C1", 1),
            node("P1", 0),
            node("P2", 0),
            node("C2", 1),
        ]
    }

    #[test]
    fn children_are_the_following_run() {
        let tasks = sample();
        assert_eq!(ids(children_of(&tasks, "P0").unwrap()), vec!["C0", "C1"]);
        assert!(children_of(&tasks, "P1").unwrap().is_empty());
        assert_eq!(ids(children_of(&tasks, "P2").unwrap()), vec!["C2"]);
    }

    #[test]
    fn children_of_subtask_is_empty() {
        let tasks = sample();
        assert!(children_of(&tasks, "C0").unwrap().is_empty());
    }

    #[test]
    fn children_of_unknown_is_none() {
        assert!(children_of(&sample(), "nope").is_none());
    }

    #[test]
    fn owner_is_nearest_top_level_above() {
        let tasks = sample();
        assert_eq!(owner_of(&tasks, "C1").map(|t| t.id.as_str()), Some("P0"));
        assert_eq!(owner_of(&tasks, "C2").map(|t| t.id.as_str()), Some("P2"));
        assert!(owner_of(&tasks, "P1").is_none());
    }

    #[test]
    fn every_subtask_is_in_exactly_its_owners_children() {
        let tasks = sample();
        for t in tasks.iter().filter(|t| !t.is_top_level()) {
            let owner = owner_of(&tasks, &t.id).unwrap();
            let children = children_of(&tasks, &owner.id).unwrap();
            assert!(children.iter().any(|c| c.id == t.id));
            for other in tasks.iter().filter(|o| o.is_top_level() && o.id != owner.id) {
                assert!(!children_of(&tasks, &other.id).unwrap().iter().any(|c| c.id == t.id));
            }
        }
    }

    #[test]
    fn block_range_covers_children() {
        let tasks = sample();
        assert_eq!(block_range(&tasks, 0), 0..3);
        assert_eq!(block_range(&tasks, 3), 3..4);
        assert_eq!(block_range(&tasks, 4), 4..6);
        assert_eq!(block_range(&tasks, 1), 1..2);
        assert_eq!(block_range(&tasks, 99), 6..6);
    }

    #[test]
    fn top_level_rows() {
        assert_eq!(top_level_indices(&sample()), vec![0, 3, 4]);
    }

    #[test]
    fn leading_subtasks_are_orphans() {
        let tasks = vec![node("C0", 1), node("C1", 1), node("P1", 0)];
        assert_eq!(ids(orphans(&tasks)), vec!["C0", "C1"]);
        assert!(owner_of(&tasks, "C0").is_none());
        assert!(orphans(&sample()).is_empty());
    }
}
