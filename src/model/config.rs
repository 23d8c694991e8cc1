use serde::{Deserialize, Serialize};

/// Configuration from docket.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocketConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub ids: IdConfig,
    #[serde(default)]
    pub comments: CommentConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
}

/// Prefixes used when assigning new ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default = "default_task_prefix")]
    pub task: String,
    #[serde(default = "default_comment_prefix")]
    pub comment: String,
    #[serde(default = "default_asset_prefix")]
    pub asset: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig {
            task: default_task_prefix(),
            comment: default_comment_prefix(),
            asset: default_asset_prefix(),
        }
    }
}

fn default_task_prefix() -> String {
    "T".to_string()
}

fn default_comment_prefix() -> String {
    "C".to_string()
}

fn default_asset_prefix() -> String {
    "A".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Levels allowed in a thread, counting the top comment as 1
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CommentConfig {
    fn default() -> Self {
        CommentConfig {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Program invoked with the mail link as its only argument
    #[serde(default = "default_opener")]
    pub opener: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        MailConfig {
            opener: default_opener(),
        }
    }
}

fn default_opener() -> String {
    if cfg!(target_os = "macos") {
        "open".to_string()
    } else {
        "xdg-open".to_string()
    }
}
