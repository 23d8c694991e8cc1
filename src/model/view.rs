use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Per-session view state. Kept out of [`Board`](super::board::Board) so it is
/// never written into the board file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Top-level task ids whose subtasks are shown
    #[serde(default)]
    pub expanded: BTreeSet<String>,
    /// Comment ids with the reply box open
    #[serde(default)]
    pub reply_inputs: BTreeSet<String>,
}

impl ViewState {
    pub fn is_expanded(&self, task_id: &str) -> bool {
        self.expanded.contains(task_id)
    }

    pub fn is_reply_open(&self, comment_id: &str) -> bool {
        self.reply_inputs.contains(comment_id)
    }

    /// Drop entries that point at ids no longer present.
    pub fn retain_known(&mut self, task_ids: &BTreeSet<&str>, comment_ids: &BTreeSet<&str>) {
        self.expanded.retain(|id| task_ids.contains(id.as_str()));
        self.reply_inputs.retain(|id| comment_ids.contains(id.as_str()));
    }
}

/// Flip membership of `id` in `set`; returns the new state
pub(crate) fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}
