use std::collections::HashMap;

use serde::Serialize;

use crate::model::board::Board;
use crate::ops::comment_ops::all_comment_ids;
use crate::ops::projection::{children_of, orphans};

/// Structured result from `dk check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckError {
    /// The same id is used by more than one task, comment or attachment
    DuplicateId { id: String, count: usize },
    /// A task is nested deeper than one level
    InvalidDepth { task_id: String, depth: usize },
    /// A subtask with no top-level task above it
    OrphanedSubtask { task_id: String },
    /// An attachment list keyed by a task that no longer exists
    DanglingAttachments { task_id: String, count: usize },
    /// A thread nested deeper than the configured maximum
    ThreadTooDeep {
        comment_id: String,
        depth: usize,
        max_depth: usize,
    },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckWarning {
    /// Completion does not cascade, so a finished parent can still have open
    /// subtasks
    OpenSubtasksUnderCompleted { task_id: String, open: usize },
    /// An attachment list with nothing in it
    EmptyAttachmentList { task_id: String },
}

/// Validate a board. Read-only.
///
/// Checks performed:
/// 1. Ids are unique across tasks, comments and attachments
/// 2. Task depth is 0 or 1 and no subtask precedes the first top-level task
/// 3. Every attachment list belongs to an existing task
/// 4. No thread is deeper than `max_depth`
/// 5. Warnings for open subtasks under completed parents and empty lists
pub fn check_board(board: &Board, max_depth: usize) -> CheckResult {
    let mut result = CheckResult::default();

    for (id, count) in duplicate_ids(board) {
        result.errors.push(CheckError::DuplicateId { id, count });
    }

    for task in &board.tasks {
        if task.depth > 1 {
            result.errors.push(CheckError::InvalidDepth {
                task_id: task.id.clone(),
                depth: task.depth,
            });
        }
    }
    for task in orphans(&board.tasks) {
        result.errors.push(CheckError::OrphanedSubtask {
            task_id: task.id.clone(),
        });
    }

    for task in board.tasks.iter().filter(|t| t.is_top_level() && t.completed) {
        let open = children_of(&board.tasks, &task.id)
            .unwrap_or_default()
            .iter()
            .filter(|c| !c.completed)
            .count();
        if open > 0 {
            result.warnings.push(CheckWarning::OpenSubtasksUnderCompleted {
                task_id: task.id.clone(),
                open,
            });
        }
    }

    for (task_id, list) in &board.attachments {
        if board.task(task_id).is_none() {
            result.errors.push(CheckError::DanglingAttachments {
                task_id: task_id.clone(),
                count: list.len(),
            });
        } else if list.is_empty() {
            result.warnings.push(CheckWarning::EmptyAttachmentList {
                task_id: task_id.clone(),
            });
        }
    }

    for comment in &board.comments {
        let depth = comment.height();
        if depth > max_depth {
            result.errors.push(CheckError::ThreadTooDeep {
                comment_id: comment.id.clone(),
                depth,
                max_depth,
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

/// Ids used more than once, in first-seen order
fn duplicate_ids(board: &Board) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut all: Vec<&str> = board.tasks.iter().map(|t| t.id.as_str()).collect();
    all.extend(all_comment_ids(board));
    all.extend(board.attachments.values().flatten().map(|a| a.id.as_str()));

    for id in all {
        let n = counts.entry(id).or_insert(0);
        if *n == 0 {
            order.push(id);
        }
        *n += 1;
    }
    order
        .into_iter()
        .filter(|id| counts[id] > 1)
        .map(|id| (id.to_string(), counts[id]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::asset::{Asset, AssetKind};
    use crate::ops::comment_ops::{add_comment, post_reply};
    use crate::ops::projection::tests::node;

    fn sample_board() -> Board {
        let mut board = Board::new("Test");
        board.tasks = vec![node("T-001", 0), node("T-002", 1), node("T-003", 0)];
        add_comment(&mut board, "Dana", "Status?", "C").unwrap();
        post_reply(&mut board, &["C-001"], "Lee", "On track", "C", 3).unwrap();
        board
    }

    fn link(id: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: "Docket entry".to_string(),
            kind: AssetKind::Link {
                url: "https://courts.example.com/1".to_string(),
            },
        }
    }

    #[test]
    fn clean_board_is_valid() {
        let result = check_board(&sample_board(), 3);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn reports_orphans_and_bad_depth() {
        let mut board = sample_board();
        board.tasks.remove(0);
        board.tasks.push(node("T-009", 2));
        let result = check_board(&board, 3);
        assert!(!result.valid);
        assert!(result.errors.contains(&CheckError::OrphanedSubtask {
            task_id: "T-002".into()
        }));
        assert!(result.errors.contains(&CheckError::InvalidDepth {
            task_id: "T-009".into(),
            depth: 2
        }));
    }

    #[test]
    fn reports_duplicates_across_kinds() {
        let mut board = sample_board();
        board.attachments.insert("T-001".into(), vec![link("C-001")]);
        let result = check_board(&board, 3);
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateId {
                id: "C-001".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn reports_dangling_and_empty_attachment_lists() {
        let mut board = sample_board();
        board.attachments.insert("T-404".into(), vec![link("A-001")]);
        board.attachments.insert("T-003".into(), vec![]);
        let result = check_board(&board, 3);
        assert_eq!(
            result.errors,
            vec![CheckError::DanglingAttachments {
                task_id: "T-404".into(),
                count: 1
            }]
        );
        assert_eq!(
            result.warnings,
            vec![CheckWarning::EmptyAttachmentList {
                task_id: "T-003".into()
            }]
        );
    }

    #[test]
    fn reports_thread_depth_against_limit() {
        let board = sample_board();
        let result = check_board(&board, 1);
        assert_eq!(
            result.errors,
            vec![CheckError::ThreadTooDeep {
                comment_id: "C-001".into(),
                depth: 2,
                max_depth: 1
            }]
        );
    }

    #[test]
    fn warns_on_open_subtasks_under_completed_parent() {
        let mut board = sample_board();
        board.tasks[0].completed = true;
        let result = check_board(&board, 3);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![CheckWarning::OpenSubtasksUnderCompleted {
                task_id: "T-001".into(),
                open: 1
            }]
        );
    }
}
