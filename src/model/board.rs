use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::comment::Comment;
use super::task::TaskNode;

/// Everything a task modal edits: the task list, the discussion and the
/// attachments. This is the unit that gets persisted; view state is kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    /// Flat, ordered task list; hierarchy is encoded by position and depth
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
    /// Top-level comments in posting order
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Attachment lists keyed by owning task id
    #[serde(default)]
    pub attachments: IndexMap<String, Vec<Asset>>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Board {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Index of a task in the flat list
    pub fn task_index(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskNode> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut TaskNode> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}
