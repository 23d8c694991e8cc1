use std::path::PathBuf;

use super::board::Board;
use super::config::DocketConfig;
use super::view::ViewState;

/// A fully loaded docket directory
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of `docket/`)
    pub root: PathBuf,
    /// Path to the `docket/` directory
    pub docket_dir: PathBuf,
    /// Parsed docket.toml
    pub config: DocketConfig,
    /// The board from board.json
    pub board: Board,
    /// View state from .state.json (defaults when absent or unreadable)
    pub view: ViewState,
}
