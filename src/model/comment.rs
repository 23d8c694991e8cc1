use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment in a discussion thread. Replies nest recursively; how deep they
/// may go is enforced when a reply is posted, not by the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub likes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(id: String, author: String, text: String, timestamp: DateTime<Utc>) -> Self {
        Comment {
            id,
            author,
            text,
            timestamp,
            resolved: false,
            likes: 0,
            replies: Vec::new(),
        }
    }

    /// Number of levels in this subtree, counting this comment as 1
    pub fn height(&self) -> usize {
        1 + self.replies.iter().map(Comment::height).max().unwrap_or(0)
    }
}
