use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// The lowercase label used in config, CLI args and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Single-character marker for compact listings
    pub fn marker(self) -> char {
        match self {
            Priority::High => '!',
            Priority::Medium => '+',
            Priority::Low => '-',
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row in the task list.
///
/// Whether a node is a subtask is encoded only by `depth` and its position:
/// a depth-1 node belongs to the nearest depth-0 node above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Assigned at creation, never changes
    pub id: String,
    pub title: String,
    /// Tags (without the `#` prefix)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// 0 = top-level task, 1 = subtask
    #[serde(default)]
    pub depth: usize,
    pub created: NaiveDate,
}

impl TaskNode {
    /// Create a new, incomplete task at the given depth
    pub fn new(id: String, title: String, depth: usize, created: NaiveDate) -> Self {
        TaskNode {
            id,
            title,
            tags: Vec::new(),
            completed: false,
            due_date: None,
            assignee: None,
            priority: None,
            depth,
            created,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}
