use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::io::state::{read_view_state, write_view_state};
use crate::model::board::Board;
use crate::model::config::DocketConfig;
use crate::model::project::Project;
use crate::ops::comment_ops::all_comment_ids;
use crate::ops::projection::orphans;

/// Name of the directory holding a docket's files
pub const DOCKET_DIR: &str = "docket";
pub const CONFIG_FILE: &str = "docket.toml";
pub const BOARD_FILE: &str = "board.json";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a docket project: no docket/ directory found")]
    NotAProject,
    #[error("docket/ already exists in {0} (use --force to reinitialize)")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not parse docket.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit docket.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not parse board.json: {0}")]
    BoardParseError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// Discover the project by walking up from the given directory, looking for
/// a `docket/` subdirectory with a config file.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let docket_dir = current.join(DOCKET_DIR);
        if docket_dir.is_dir() && docket_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load a complete project from the given root directory.
///
/// A missing board.json is an empty board. View state entries pointing at
/// ids that no longer exist are dropped.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let docket_dir = root.join(DOCKET_DIR);
    if !docket_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }

    let config_path = docket_dir.join(CONFIG_FILE);
    let config_text = read_file(&config_path)?;
    let config: DocketConfig = toml::from_str(&config_text)?;

    let board_path = docket_dir.join(BOARD_FILE);
    let board = if board_path.exists() {
        serde_json::from_str(&read_file(&board_path)?)?
    } else {
        Board::new(config.board.name.clone())
    };

    let orphaned = orphans(&board.tasks);
    if !orphaned.is_empty() {
        warn!(
            count = orphaned.len(),
            first = %orphaned[0].id,
            "board has subtasks with no parent task"
        );
    }

    let mut view = read_view_state(&docket_dir).unwrap_or_default();
    let task_ids: BTreeSet<&str> = board.tasks.iter().map(|t| t.id.as_str()).collect();
    let comment_ids: BTreeSet<&str> = all_comment_ids(&board).into_iter().collect();
    view.retain_known(&task_ids, &comment_ids);

    debug!(root = %root.display(), tasks = board.tasks.len(), "loaded project");
    Ok(Project {
        root: root.to_path_buf(),
        docket_dir,
        config,
        board,
        view,
    })
}

/// Create `docket/` with a config and an empty board.
pub fn init_project(root: &Path, name: &str, force: bool) -> Result<PathBuf, ProjectError> {
    let docket_dir = root.join(DOCKET_DIR);
    if docket_dir.join(CONFIG_FILE).exists() && !force {
        return Err(ProjectError::AlreadyExists(root.to_path_buf()));
    }
    fs::create_dir_all(&docket_dir).map_err(|e| ProjectError::WriteError {
        path: docket_dir.clone(),
        source: e,
    })?;

    let config = default_config_text(name);
    write_file(&docket_dir.join(CONFIG_FILE), config.as_bytes())?;
    save_board(&docket_dir, &Board::new(name))?;
    debug!(root = %root.display(), "initialized project");
    Ok(docket_dir)
}

/// Save the board to board.json
pub fn save_board(docket_dir: &Path, board: &Board) -> Result<(), ProjectError> {
    let content = serde_json::to_string_pretty(board)?;
    write_file(&docket_dir.join(BOARD_FILE), content.as_bytes())
}

/// Save board and view state. The board goes first so a failed view write
/// never loses domain data.
pub fn save_project(project: &Project) -> Result<(), ProjectError> {
    save_board(&project.docket_dir, &project.board)?;
    write_view_state(&project.docket_dir, &project.view).map_err(|e| ProjectError::WriteError {
        path: project.docket_dir.join(crate::io::state::STATE_FILE),
        source: e,
    })
}

/// Write via a temp file in the same directory and rename over the target.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn default_config_text(name: &str) -> String {
    let mut doc = toml_edit::DocumentMut::new();
    doc["board"] = toml_edit::Item::Table(toml_edit::Table::new());
    doc["board"]["name"] = toml_edit::value(name);
    format!(
        "{}\n\
# Id prefixes for new tasks, comments and attachments
# [ids]
# task = \"T\"
# comment = \"C\"
# asset = \"A\"

# Thread depth, counting the top comment as 1
# [comments]
# max_depth = 3

# Program used to open email attachments
# [mail]
# opener = \"xdg-open\"
",
        doc.to_string().trim_end()
    )
}

fn read_file(path: &Path) -> Result<String, ProjectError> {
    fs::read_to_string(path).map_err(|e| ProjectError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), ProjectError> {
    atomic_write(path, content).map_err(|e| ProjectError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
