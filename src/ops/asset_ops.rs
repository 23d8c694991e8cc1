use std::io;
use std::process::Command;

use tracing::{debug, info};

use crate::model::asset::{Asset, AssetKind};
use crate::model::board::Board;
use crate::ops::next_id;
use crate::util::text::{encode_mailto_address, encode_uri_component};

/// Error type for attachment operations
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("attachment not found: {0}")]
    NotFound(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("attachment name cannot be empty")]
    EmptyInput,
    #[error("attachment {0} is not an email")]
    NotEmail(String),
    #[error("could not open mail client: {0}")]
    Open(#[source] io::Error),
    #[error("no attachment ids left for prefix {0}")]
    IdsExhausted(String),
}

/// Attach an asset to a task. Returns the assigned ID.
pub fn add_asset(
    board: &mut Board,
    task_id: &str,
    name: &str,
    kind: AssetKind,
    prefix: &str,
) -> Result<String, AssetError> {
    if board.task(task_id).is_none() {
        return Err(AssetError::TaskNotFound(task_id.to_string()));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(AssetError::EmptyInput);
    }
    let id = next_id(
        prefix,
        board.attachments.values().flatten().map(|a| a.id.as_str()),
    )
    .ok_or_else(|| AssetError::IdsExhausted(prefix.to_string()))?;
    debug!(asset = %id, task = task_id, kind = kind.label(), "attached asset");
    board
        .attachments
        .entry(task_id.to_string())
        .or_default()
        .push(Asset {
            id: id.clone(),
            name: name.to_string(),
            kind,
        });
    Ok(id)
}

/// Remove an attachment wherever it is.
pub fn remove_asset(board: &mut Board, asset_id: &str) -> Result<Asset, AssetError> {
    let (task_id, idx) = locate(board, asset_id)?;
    let list = board
        .attachments
        .get_mut(&task_id)
        .ok_or_else(|| AssetError::NotFound(asset_id.to_string()))?;
    let removed = list.remove(idx);
    if list.is_empty() {
        board.attachments.shift_remove(&task_id);
    }
    debug!(asset = asset_id, task = %task_id, "removed asset");
    Ok(removed)
}

/// Attachments of one task, in the order they were added.
pub fn assets_for<'a>(board: &'a Board, task_id: &str) -> &'a [Asset] {
    board
        .attachments
        .get(task_id)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn find_asset<'a>(board: &'a Board, asset_id: &str) -> Option<&'a Asset> {
    board.attachments.values().flatten().find(|a| a.id == asset_id)
}

// ---------------------------------------------------------------------------
// Opening emails
// ---------------------------------------------------------------------------

/// A link handed to the mail client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailLink(pub String);

impl MailLink {
    /// The vendor deep link when the asset has one, otherwise a `mailto:`
    /// addressed to the sender with the subject prefilled.
    pub fn for_asset(asset: &Asset) -> Option<MailLink> {
        match &asset.kind {
            AssetKind::Email { url: Some(url), .. } => Some(MailLink(url.clone())),
            AssetKind::Email { from, subject, .. } => Some(MailLink(format!(
                "mailto:{}?subject={}",
                encode_mailto_address(from.trim()),
                encode_uri_component(subject)
            ))),
            _ => None,
        }
    }
}

/// Something that can hand a link to the user's mail client
pub trait MailOpener {
    fn open(&self, link: &MailLink) -> io::Result<()>;
}

/// Opens links by running an external program with the link as argument
#[derive(Debug, Clone)]
pub struct CommandOpener {
    pub program: String,
}

impl CommandOpener {
    pub fn new(program: impl Into<String>) -> Self {
        CommandOpener {
            program: program.into(),
        }
    }
}

impl MailOpener for CommandOpener {
    fn open(&self, link: &MailLink) -> io::Result<()> {
        Command::new(&self.program).arg(&link.0).spawn()?;
        Ok(())
    }
}

/// Open an email attachment in the external mail client. Does not modify the
/// board.
pub fn open_in_external_client(
    board: &Board,
    asset_id: &str,
    opener: &dyn MailOpener,
) -> Result<MailLink, AssetError> {
    let asset =
        find_asset(board, asset_id).ok_or_else(|| AssetError::NotFound(asset_id.to_string()))?;
    let link =
        MailLink::for_asset(asset).ok_or_else(|| AssetError::NotEmail(asset_id.to_string()))?;
    opener.open(&link).map_err(AssetError::Open)?;
    info!(asset = asset_id, "opened email in mail client");
    Ok(link)
}

fn locate(board: &Board, asset_id: &str) -> Result<(String, usize), AssetError> {
    for (task_id, list) in &board.attachments {
        if let Some(idx) = list.iter().position(|a| a.id == asset_id) {
            return Ok((task_id.clone(), idx));
        }
    }
    Err(AssetError::NotFound(asset_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::projection::tests::node;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<String>>,
    }

    impl MailOpener for RecordingOpener {
        fn open(&self, link: &MailLink) -> io::Result<()> {
            self.opened.borrow_mut().push(link.0.clone());
            Ok(())
        }
    }

    struct FailingOpener;

    impl MailOpener for FailingOpener {
        fn open(&self, _link: &MailLink) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no mail client"))
        }
    }

    fn sample_board() -> Board {
        let mut board = Board::new("Test");
        board.tasks = vec![node("T-001", 0), node("T-002", 1)];
        add_asset(
            &mut board,
            "T-001",
            "Engagement letter",
            AssetKind::File {
                url: Some("https://files.example.com/el.pdf".into()),
                file_type: Some("pdf".into()),
            },
            "A",
        )
        .unwrap();
        add_asset(
            &mut board,
            "T-001",
            "Client email",
            AssetKind::Email {
                from: "client@example.com".into(),
                subject: "Re: Smith & Co".into(),
                url: None,
            },
            "A",
        )
        .unwrap();
        add_asset(
            &mut board,
            "T-002",
            "Pleadings",
            AssetKind::Folder { url: None },
            "A",
        )
        .unwrap();
        board
    }

    #[test]
    fn add_groups_by_task() {
        let board = sample_board();
        let names: Vec<&str> = assets_for(&board, "T-001")
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Engagement letter", "Client email"]);
        assert_eq!(assets_for(&board, "T-002")[0].id, "A-003");
        assert!(assets_for(&board, "T-404").is_empty());
    }

    #[test]
    fn add_rejects_unknown_task_and_blank_name() {
        let mut board = sample_board();
        let before = board.clone();
        assert!(matches!(
            add_asset(&mut board, "T-404", "x", AssetKind::Folder { url: None }, "A"),
            Err(AssetError::TaskNotFound(_))
        ));
        assert!(matches!(
            add_asset(&mut board, "T-001", "  ", AssetKind::Folder { url: None }, "A"),
            Err(AssetError::EmptyInput)
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn remove_asset_by_id() {
        let mut board = sample_board();
        let removed = remove_asset(&mut board, "A-001").unwrap();
        assert_eq!(removed.name, "Engagement letter");
        assert_eq!(assets_for(&board, "T-001").len(), 1);

        remove_asset(&mut board, "A-003").unwrap();
        assert!(!board.attachments.contains_key("T-002"));

        assert!(matches!(
            remove_asset(&mut board, "A-003"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn ids_do_not_repeat_after_removal_of_lower_id() {
        let mut board = sample_board();
        remove_asset(&mut board, "A-001").unwrap();
        let id = add_asset(
            &mut board,
            "T-001",
            "Memo",
            AssetKind::Link {
                url: "https://example.com/memo".into(),
            },
            "A",
        )
        .unwrap();
        assert_eq!(id, "A-004");
    }

    #[test]
    fn open_email_builds_mailto() {
        let board = sample_board();
        let opener = RecordingOpener::default();
        let before = board.clone();
        let link = open_in_external_client(&board, "A-002", &opener).unwrap();
        assert_eq!(
            link.0,
            "mailto:client@example.com?subject=Re%3A%20Smith%20%26%20Co"
        );
        assert_eq!(*opener.opened.borrow(), vec![link.0.clone()]);
        assert_eq!(board, before);
    }

    #[test]
    fn open_email_prefers_vendor_link() {
        let mut board = sample_board();
        let id = add_asset(
            &mut board,
            "T-001",
            "Outlook thread",
            AssetKind::Email {
                from: "a@example.com".into(),
                subject: "Hi".into(),
                url: Some("ms-outlook://message/123".into()),
            },
            "A",
        )
        .unwrap();
        let opener = RecordingOpener::default();
        let link = open_in_external_client(&board, &id, &opener).unwrap();
        assert_eq!(link.0, "ms-outlook://message/123");
    }

    #[test]
    fn open_non_email_is_rejected() {
        let board = sample_board();
        let opener = RecordingOpener::default();
        assert!(matches!(
            open_in_external_client(&board, "A-001", &opener),
            Err(AssetError::NotEmail(_))
        ));
        assert!(matches!(
            open_in_external_client(&board, "A-999", &opener),
            Err(AssetError::NotFound(_))
        ));
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn opener_failure_is_reported() {
        let board = sample_board();
        assert!(matches!(
            open_in_external_client(&board, "A-002", &FailingOpener),
            Err(AssetError::Open(_))
        ));
    }

    #[test]
    fn mailto_escapes_sender() {
        let mut board = sample_board();
        let id = add_asset(
            &mut board,
            "T-001",
            "Odd sender",
            AssetKind::Email {
                from: "billing?cc=x&y#z@example.com".into(),
                subject: "Invoice".into(),
                url: None,
            },
            "A",
        )
        .unwrap();
        let opener = RecordingOpener::default();
        let link = open_in_external_client(&board, &id, &opener).unwrap();
        assert_eq!(
            link.0,
            "mailto:billing%3Fcc%3Dx%26y%23z@example.com?subject=Invoice"
        );
    }

    #[test]
    fn add_fails_when_ids_run_out() {
        let mut board = sample_board();
        board.attachments[0].push(Asset {
            id: format!("A-{}", usize::MAX),
            name: "Last".into(),
            kind: AssetKind::Folder { url: None },
        });
        let before = board.clone();
        assert!(matches!(
            add_asset(&mut board, "T-001", "One more", AssetKind::Folder { url: None }, "A"),
            Err(AssetError::IdsExhausted(_))
        ));
        assert_eq!(board, before);
    }
}
