use std::fs;
use std::path::Path;

use crate::model::view::ViewState;

pub const STATE_FILE: &str = ".state.json";

/// Read .state.json from the docket directory
pub fn read_view_state(docket_dir: &Path) -> Option<ViewState> {
    let content = fs::read_to_string(docket_dir.join(STATE_FILE)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the docket directory
pub fn write_view_state(docket_dir: &Path, state: &ViewState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    crate::io::project_io::atomic_write(&docket_dir.join(STATE_FILE), content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut state = ViewState::default();
        state.expanded.insert("T-001".into());
        state.reply_inputs.insert("C-002".into());

        write_view_state(dir.path(), &state).unwrap();
        assert_eq!(read_view_state(dir.path()), Some(state));
    }

    #[test]
    fn read_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_view_state(dir.path()).is_none());
    }

    #[test]
    fn read_corrupt_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "not json").unwrap();
        assert!(read_view_state(dir.path()).is_none());
    }

    #[test]
    fn partial_state_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), r#"{"expanded":["T-003"]}"#).unwrap();
        let state = read_view_state(dir.path()).unwrap();
        assert!(state.is_expanded("T-003"));
        assert!(state.reply_inputs.is_empty());
    }
}
