use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "dk", about = concat!("docket v", env!("CARGO_PKG_VERSION"), " - tasks, threads and attachments for a matter"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new docket in the current directory
    Init(InitArgs),
    /// List tasks as a tree
    List(ListArgs),
    /// Show one task with its subtasks and attachments
    Show(ShowArgs),
    /// Add a top-level task
    Add(AddArgs),
    /// Add a subtask under a top-level task
    Sub(SubArgs),
    /// Toggle a task's completed flag
    Done(IdArg),
    /// Change task title
    Title(TitleArgs),
    /// Set or clear priority
    Priority(PriorityArgs),
    /// Set or clear the assignee (omit NAME to clear)
    Assign(AssignArgs),
    /// Set or clear the due date (omit DATE to clear)
    Due(DueArgs),
    /// Add or remove tags
    Tag(TagArgs),
    /// Delete a task (its subtasks stay in place)
    Rm(IdArg),
    /// Expand or collapse a top-level task in listings
    Expand(IdArg),
    /// Move a top-level task with its subtasks
    Mv(MvArgs),
    /// Drag a top-level row to another row
    Drag(DragArgs),
    /// Post a top-level comment
    Comment(CommentArgs),
    /// Reply to a comment
    Reply(ReplyArgs),
    /// Toggle a comment's resolved flag
    Resolve(PathArg),
    /// Like a comment
    Like(PathArg),
    /// Open or close the reply box under a comment
    ReplyBox(PathArg),
    /// Show the discussion
    Thread,
    /// Attach a file, folder, link or email to a task
    Attach(AttachArgs),
    /// Remove an attachment
    Detach(IdArg),
    /// List a task's attachments
    Assets(IdArg),
    /// Open an email attachment in the mail client
    Open(IdArg),
    /// Validate board integrity
    Check,
    /// Edit docket.toml
    Config(ConfigCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if docket/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task or attachment ID
    pub id: String,
}

#[derive(Args)]
pub struct PathArg {
    /// Comment path, e.g. C-001 or C-001/C-002
    pub path: String,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Show subtasks of every task, not just expanded ones
    #[arg(long)]
    pub all: bool,
    /// Only tasks with this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title (trailing #tags become tags)
    pub title: String,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task ID
    pub id: String,
    /// Subtask title
    pub title: String,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task ID
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
    None,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Task ID
    pub id: String,
    /// New priority
    #[arg(value_enum)]
    pub priority: PriorityArg,
}

#[derive(Args)]
pub struct AssignArgs {
    /// Task ID
    pub id: String,
    /// Assignee display name
    pub name: Option<String>,
}

#[derive(Args)]
pub struct DueArgs {
    /// Task ID
    pub id: String,
    /// Due date (YYYY-MM-DD)
    pub date: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TagAction {
    Add,
    Rm,
}

#[derive(Args)]
pub struct TagArgs {
    /// Task ID
    pub id: String,
    /// add or rm
    #[arg(value_enum)]
    pub action: TagAction,
    /// Tag (with or without #)
    pub tag: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Top-level task ID
    pub id: String,
    /// Move to the top
    #[arg(long, conflicts_with_all = ["bottom", "after"])]
    pub top: bool,
    /// Move to the bottom
    #[arg(long, conflicts_with = "after")]
    pub bottom: bool,
    /// Move after this top-level task
    #[arg(long)]
    pub after: Option<String>,
}

#[derive(Args)]
pub struct DragArgs {
    /// Row the drag starts on (0-based, top-level tasks only)
    pub from: usize,
    /// Rows the pointer passes over, ending on the drop row
    #[arg(required = true)]
    pub over: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Comment args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct CommentArgs {
    /// Author display name
    pub author: String,
    /// Comment text
    pub text: String,
}

#[derive(Args)]
pub struct ReplyArgs {
    /// Path of the comment being replied to
    pub path: String,
    /// Author display name
    pub author: String,
    /// Reply text
    pub text: String,
}

// ---------------------------------------------------------------------------
// Attachment args
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, ValueEnum)]
pub enum AssetKindArg {
    Folder,
    File,
    Link,
    Email,
}

#[derive(Args)]
pub struct AttachArgs {
    /// Task ID
    pub task: String,
    /// Kind of attachment
    #[arg(value_enum)]
    pub kind: AssetKindArg,
    /// Display name
    pub name: String,
    /// Location (required for links)
    #[arg(long)]
    pub url: Option<String>,
    /// File type, e.g. pdf
    #[arg(long)]
    pub file_type: Option<String>,
    /// Email sender (required for emails)
    #[arg(long)]
    pub from: Option<String>,
    /// Email subject (required for emails)
    #[arg(long)]
    pub subject: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a value, e.g. `dk config set ids.task SJ`
    Set {
        /// section.key
        key: String,
        value: String,
    },
}
