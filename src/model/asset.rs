use serde::{Deserialize, Serialize};

/// What an attachment points at, with the fields that only make sense for
/// that kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AssetKind {
    Folder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// e.g. `pdf`, `docx`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_type: Option<String>,
    },
    Link {
        url: String,
    },
    Email {
        from: String,
        subject: String,
        /// Vendor deep link; when absent a `mailto:` link is built instead
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl AssetKind {
    /// The type label used in JSON and listings
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Folder { .. } => "folder",
            AssetKind::File { .. } => "file",
            AssetKind::Link { .. } => "link",
            AssetKind::Email { .. } => "email",
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            AssetKind::Folder { url } | AssetKind::File { url, .. } | AssetKind::Email { url, .. } => {
                url.as_deref()
            }
            AssetKind::Link { url } => Some(url),
        }
    }
}

/// An attachment on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: AssetKind,
}
