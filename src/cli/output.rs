use serde::Serialize;

use crate::model::asset::{Asset, AssetKind};
use crate::model::board::Board;
use crate::model::comment::Comment;
use crate::model::task::{Priority, TaskNode};
use crate::model::view::ViewState;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::projection::{block_range, orphans, top_level_indices};
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Titles longer than this are cut with an ellipsis in listings
const TITLE_WIDTH: usize = 60;
/// Width of the name column in attachment listings
const ASSET_NAME_WIDTH: usize = 28;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub name: String,
    /// Subtasks at the head of the list with no parent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphans: Vec<TaskJson>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct TaskDetailJson {
    #[serde(flatten)]
    pub task: TaskJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Asset>,
}

#[derive(Serialize)]
pub struct CommentJson {
    pub id: String,
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub resolved: bool,
    pub likes: u32,
    pub reply_open: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentJson>,
}

#[derive(Serialize)]
pub struct IdJson {
    pub id: String,
}

#[derive(Serialize)]
pub struct ToggleJson {
    pub id: String,
    pub value: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &TaskNode) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
        tags: task.tags.clone(),
        priority: task.priority,
        assignee: task.assignee.clone(),
        due_date: task.due_date.map(|d| d.to_string()),
        created: task.created.to_string(),
        expanded: None,
        subtasks: Vec::new(),
    }
}

/// Nest each block's subtasks under its parent. Subtasks are always
/// included; `expanded` reports the view flag.
pub fn board_to_json(board: &Board, view: &ViewState) -> BoardJson {
    let tasks = &board.tasks;
    let blocks = top_level_indices(tasks)
        .into_iter()
        .map(|idx| {
            let range = block_range(tasks, idx);
            let mut tj = task_to_json(&tasks[idx]);
            tj.expanded = Some(view.is_expanded(&tasks[idx].id));
            tj.subtasks = tasks[range.start + 1..range.end]
                .iter()
                .map(task_to_json)
                .collect();
            tj
        })
        .collect();
    BoardJson {
        name: board.name.clone(),
        orphans: orphans(tasks).iter().map(task_to_json).collect(),
        tasks: blocks,
    }
}

pub fn comment_to_json(comment: &Comment, view: &ViewState) -> CommentJson {
    CommentJson {
        id: comment.id.clone(),
        author: comment.author.clone(),
        text: comment.text.clone(),
        timestamp: comment.timestamp.to_rfc3339(),
        resolved: comment.resolved,
        likes: comment.likes,
        reply_open: view.is_reply_open(&comment.id),
        replies: comment
            .replies
            .iter()
            .map(|r| comment_to_json(r, view))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Which blocks and rows a listing shows
#[derive(Debug, Default, Clone, Copy)]
pub struct ListFilter<'a> {
    /// Show subtasks even when the parent is collapsed
    pub all: bool,
    pub tag: Option<&'a str>,
    /// Hide completed tasks
    pub open_only: bool,
}

impl ListFilter<'_> {
    fn matches(&self, task: &TaskNode) -> bool {
        if self.open_only && task.completed {
            return false;
        }
        if let Some(tag) = self.tag
            && !task.tags.iter().any(|t| t == tag)
        {
            return false;
        }
        true
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &TaskNode) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{}] {} ", check, task.id);
    if let Some(p) = task.priority {
        line.push(p.marker());
        line.push(' ');
    }
    line.push_str(&truncate_to_width(&task.title, TITLE_WIDTH));
    for tag in &task.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    if let Some(ref who) = task.assignee {
        line.push_str(" @");
        line.push_str(who);
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due));
    }
    line
}

/// Render the board as an indented tree.
///
/// Each top-level row is prefixed with its drag row number. A block whose
/// parent is filtered out is hidden with its subtasks; `▸` marks a collapsed
/// parent that has subtasks, `▾` an expanded one.
pub fn format_board_listing(board: &Board, view: &ViewState, filter: ListFilter) -> Vec<String> {
    let tasks = &board.tasks;
    let mut lines = vec![format!("== {} ==", board.name)];

    let orphaned = orphans(tasks);
    if !orphaned.is_empty() {
        lines.push("-- no parent --".to_string());
        for task in orphaned.iter().filter(|t| filter.matches(t)) {
            lines.push(format!("      {}", format_task_line(task)));
        }
    }

    for (row, idx) in top_level_indices(tasks).into_iter().enumerate() {
        let parent = &tasks[idx];
        if !filter.matches(parent) {
            continue;
        }
        let range = block_range(tasks, idx);
        let children = &tasks[range.start + 1..range.end];
        let expanded = view.is_expanded(&parent.id);
        let fold = match (children.is_empty(), expanded) {
            (true, _) => ' ',
            (false, true) => '▾',
            (false, false) => '▸',
        };
        lines.push(format!("{:>3} {} {}", row, fold, format_task_line(parent)));
        if expanded || filter.all {
            for child in children.iter().filter(|t| filter.matches(t)) {
                lines.push(format!("        {}", format_task_line(child)));
            }
        }
    }

    if lines.len() == 1 {
        lines.push("(no tasks)".to_string());
    }
    lines
}

/// Detailed view of one task
pub fn format_task_detail(
    task: &TaskNode,
    parent: Option<&TaskNode>,
    children: &[TaskNode],
    assets: &[Asset],
) -> Vec<String> {
    let mut lines = vec![format_task_line(task)];
    if let Some(p) = parent {
        lines.push(format!("parent: {} {}", p.id, p.title));
    }
    if let Some(p) = task.priority {
        lines.push(format!("priority: {}", p));
    }
    if let Some(ref who) = task.assignee {
        lines.push(format!("assignee: {}", who));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due));
    }
    lines.push(format!("created: {}", task.created));

    if !children.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        for child in children {
            lines.push(format!("  {}", format_task_line(child)));
        }
    }
    if !assets.is_empty() {
        lines.push(String::new());
        lines.push("attachments:".to_string());
        for asset in assets {
            lines.push(format!("  {}", format_asset_line(asset)));
        }
    }
    lines
}

/// `A-001  email  Name……  location`
pub fn format_asset_line(asset: &Asset) -> String {
    let mut line = format!(
        "{}  {:<6} {}",
        asset.id,
        asset.kind.label(),
        fit_to_width(&asset.name, ASSET_NAME_WIDTH)
    );
    if let AssetKind::Email { from, subject, .. } = &asset.kind {
        line.push_str(&format!(" {} \"{}\"", from, subject));
    } else if let Some(url) = asset.kind.url() {
        line.push(' ');
        line.push_str(url);
    }
    line.trim_end().to_string()
}

/// Render the discussion with replies indented under their parent.
pub fn format_thread(comments: &[Comment], view: &ViewState) -> Vec<String> {
    let mut lines = Vec::new();
    for comment in comments {
        push_comment(&mut lines, comment, view, 0);
    }
    if lines.is_empty() {
        lines.push("(no comments)".to_string());
    }
    lines
}

fn push_comment(lines: &mut Vec<String>, comment: &Comment, view: &ViewState, level: usize) {
    let indent = "  ".repeat(level);
    let mut header = format!(
        "{}{} {} ({})",
        indent,
        comment.id,
        comment.author,
        comment.timestamp.format("%Y-%m-%d %H:%M")
    );
    if comment.likes > 0 {
        header.push_str(&format!(" ♥{}", comment.likes));
    }
    if comment.resolved {
        header.push_str(" ✓ resolved");
    }
    lines.push(header);
    for text_line in comment.text.lines() {
        lines.push(format!("{}  {}", indent, text_line));
    }
    if view.is_reply_open(&comment.id) {
        lines.push(format!("{}  > reply…", indent));
    }
    for reply in &comment.replies {
        push_comment(lines, reply, view, level + 1);
    }
}

pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            let msg = match err {
                CheckError::DuplicateId { id, count } => {
                    format!("{} is used {} times", id, count)
                }
                CheckError::InvalidDepth { task_id, depth } => {
                    format!("{} has depth {} (expected 0 or 1)", task_id, depth)
                }
                CheckError::OrphanedSubtask { task_id } => {
                    format!("{} is a subtask with no parent task", task_id)
                }
                CheckError::DanglingAttachments { task_id, count } => {
                    format!("{} attachment(s) belong to missing task {}", count, task_id)
                }
                CheckError::ThreadTooDeep {
                    comment_id,
                    depth,
                    max_depth,
                } => format!(
                    "thread under {} is {} levels deep (max {})",
                    comment_id, depth, max_depth
                ),
            };
            lines.push(format!("  {}", msg));
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warning in &result.warnings {
            let msg = match warning {
                CheckWarning::OpenSubtasksUnderCompleted { task_id, open } => {
                    format!("{} is done but has {} open subtask(s)", task_id, open)
                }
                CheckWarning::EmptyAttachmentList { task_id } => {
                    format!("{} has an empty attachment list", task_id)
                }
            };
            lines.push(format!("  {}", msg));
        }
    }
    if result.valid {
        lines.push("✓ board is valid".to_string());
    } else {
        lines.push("✗ board has errors".to_string());
    }
    lines
}
