mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::NaiveDate;

/// Global override for project directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::project_io::{self, DOCKET_DIR, ProjectError};
use crate::model::asset::AssetKind;
use crate::model::project::Project;
use crate::model::task::Priority;
use crate::ops::asset_ops::{self, CommandOpener};
use crate::ops::drag::DragController;
use crate::ops::projection::{children_of, owner_of};
use crate::ops::{check, comment_ops, task_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;

    // Store -C override for load_project_cwd()
    if let Some(ref dir) = cli.project_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = PROJECT_DIR_OVERRIDE.set(abs);
    }

    match cli.command {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::List(args) => cmd_list(args, json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Thread => cmd_thread(json),
        Commands::Assets(args) => cmd_assets(args, json),
        Commands::Check => cmd_check(json),

        // Task commands
        Commands::Add(args) => cmd_add(args, json),
        Commands::Sub(args) => cmd_sub(args, json),
        Commands::Done(args) => cmd_done(args, json),
        Commands::Title(args) => cmd_title(args, json),
        Commands::Priority(args) => cmd_priority(args, json),
        Commands::Assign(args) => cmd_assign(args, json),
        Commands::Due(args) => cmd_due(args, json),
        Commands::Tag(args) => cmd_tag(args, json),
        Commands::Rm(args) => cmd_rm(args, json),
        Commands::Expand(args) => cmd_expand(args, json),
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Drag(args) => cmd_drag(args, json),

        // Comment commands
        Commands::Comment(args) => cmd_comment(args, json),
        Commands::Reply(args) => cmd_reply(args, json),
        Commands::Resolve(args) => cmd_resolve(args, json),
        Commands::Like(args) => cmd_like(args, json),
        Commands::ReplyBox(args) => cmd_reply_box(args, json),

        // Attachment commands
        Commands::Attach(args) => cmd_attach(args, json),
        Commands::Detach(args) => cmd_detach(args, json),
        Commands::Open(args) => cmd_open(args, json),

        Commands::Config(args) => cmd_config(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir() -> Result<PathBuf, ProjectError> {
    match PROJECT_DIR_OVERRIDE.get() {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(ProjectError::IoError),
    }
}

fn load_project_cwd() -> Result<Project, ProjectError> {
    let root = project_io::discover_project(&start_dir()?)?;
    project_io::load_project(&root)
}

fn print_id(id: String, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&IdJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn print_toggle(id: &str, value: bool, on: &str, off: &str, json: bool) -> CmdResult {
    if json {
        let out = ToggleJson {
            id: id.to_string(),
            value,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}", id, if value { on } else { off });
    }
    Ok(())
}

/// After a field edit, print the task as it now stands under `--json`.
fn print_task_if_json(project: &Project, task_id: &str, json: bool) -> CmdResult {
    if json
        && let Some(task) = project.board.task(task_id)
    {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    if json {
        let out = board_to_json(&project.board, &project.view);
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let filter = ListFilter {
        all: args.all,
        tag: args.tag.as_deref().map(|t| t.trim_start_matches('#')),
        open_only: args.open,
    };
    for line in format_board_listing(&project.board, &project.view, filter) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    let board = &project.board;
    let task = board
        .task(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    let parent = owner_of(&board.tasks, &args.id);
    let children = children_of(&board.tasks, &args.id).unwrap_or_default();
    let assets = asset_ops::assets_for(board, &args.id);

    if json {
        let mut tj = task_to_json(task);
        tj.subtasks = children.iter().map(task_to_json).collect();
        if task.is_top_level() {
            tj.expanded = Some(project.view.is_expanded(&task.id));
        }
        let out = TaskDetailJson {
            task: tj,
            parent: parent.map(|p| p.id.clone()),
            attachments: assets.to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_task_detail(task, parent, children, assets) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_thread(json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    if json {
        let out: Vec<CommentJson> = project
            .board
            .comments
            .iter()
            .map(|c| comment_to_json(c, &project.view))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_thread(&project.board.comments, &project.view) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_assets(args: IdArg, json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    if project.board.task(&args.id).is_none() {
        return Err(format!("task not found: {}", args.id).into());
    }
    let assets = asset_ops::assets_for(&project.board, &args.id);
    if json {
        println!("{}", serde_json::to_string_pretty(assets)?);
    } else if assets.is_empty() {
        println!("(no attachments)");
    } else {
        for asset in assets {
            println!("{}", format_asset_line(asset));
        }
    }
    Ok(())
}

fn cmd_check(json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    let result = check::check_board(&project.board, project.config.comments.max_depth);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check_result(&result) {
            println!("{}", line);
        }
    }
    if !result.valid {
        return Err("check failed".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let prefix = project.config.ids.task.clone();
    let id = task_ops::add_task(&mut project.board, &args.title, &prefix)?;
    project_io::save_project(&project)?;
    print_id(id, json)
}

fn cmd_sub(args: SubArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let prefix = project.config.ids.task.clone();
    let id = task_ops::add_subtask(&mut project.board, &args.id, &args.title, &prefix)?;
    project_io::save_project(&project)?;
    print_id(id, json)
}

fn cmd_done(args: IdArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let completed = task_ops::toggle_complete(&mut project.board, &args.id)?;
    project_io::save_project(&project)?;
    print_toggle(&args.id, completed, "done", "reopened", json)
}

fn cmd_title(args: TitleArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    task_ops::edit_title(&mut project.board, &args.id, &args.title)?;
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_priority(args: PriorityArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let priority = match args.priority {
        PriorityArg::High => Some(Priority::High),
        PriorityArg::Medium => Some(Priority::Medium),
        PriorityArg::Low => Some(Priority::Low),
        PriorityArg::None => None,
    };
    task_ops::set_priority(&mut project.board, &args.id, priority)?;
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_assign(args: AssignArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    task_ops::set_assignee(&mut project.board, &args.id, args.name.as_deref())?;
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_due(args: DueArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let due = args.date.as_deref().map(parse_date).transpose()?;
    task_ops::set_due_date(&mut project.board, &args.id, due)?;
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_tag(args: TagArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    match args.action {
        TagAction::Add => task_ops::add_tag(&mut project.board, &args.id, &args.tag)?,
        TagAction::Rm => task_ops::remove_tag(&mut project.board, &args.id, &args.tag)?,
    }
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_rm(args: IdArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let removed = task_ops::delete_task(&mut project.board, &args.id)?;
    project.view.expanded.remove(&removed.id);
    project_io::save_project(&project)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&removed))?);
    } else {
        println!("removed {} {}", removed.id, removed.title);
    }
    Ok(())
}

fn cmd_expand(args: IdArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let expanded = task_ops::toggle_expanded(&project.board, &mut project.view, &args.id)?;
    project_io::save_project(&project)?;
    print_toggle(&args.id, expanded, "expanded", "collapsed", json)
}

fn cmd_mv(args: MvArgs, json: bool) -> CmdResult {
    let position = if args.top {
        task_ops::InsertPosition::Top
    } else if args.bottom {
        task_ops::InsertPosition::Bottom
    } else if let Some(after) = args.after {
        task_ops::InsertPosition::After(after)
    } else {
        return Err("specify --top, --bottom or --after <id>".into());
    };

    let mut project = load_project_cwd()?;
    task_ops::move_task(&mut project.board, &args.id, position)?;
    project_io::save_project(&project)?;
    print_task_if_json(&project, &args.id, json)
}

fn cmd_drag(args: DragArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let tasks = &mut project.board.tasks;

    let mut drag = DragController::new();
    drag.start(tasks, args.from)?;
    for row in args.over {
        drag.over(tasks, row)?;
    }
    let dropped = drag.end().unwrap_or(args.from);

    project_io::save_project(&project)?;
    if json {
        println!("{}", serde_json::json!({ "from": args.from, "row": dropped }));
    } else {
        println!("row {} -> {}", args.from, dropped);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Comment command handlers
// ---------------------------------------------------------------------------

fn cmd_comment(args: CommentArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let prefix = project.config.ids.comment.clone();
    let id = comment_ops::add_comment(&mut project.board, &args.author, &args.text, &prefix)?;
    project_io::save_project(&project)?;
    print_id(id, json)
}

fn cmd_reply(args: ReplyArgs, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let prefix = project.config.ids.comment.clone();
    let max_depth = project.config.comments.max_depth;
    let path = comment_ops::parse_path(&args.path);
    let id = comment_ops::post_reply(
        &mut project.board,
        &path,
        &args.author,
        &args.text,
        &prefix,
        max_depth,
    )?;
    // The reply box closes once the reply is posted
    if let Some(target) = path.last() {
        project.view.reply_inputs.remove(*target);
    }
    project_io::save_project(&project)?;
    print_id(id, json)
}

fn cmd_resolve(args: PathArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let path = comment_ops::parse_path(&args.path);
    let resolved = comment_ops::toggle_resolved(&mut project.board, &path)?;
    project_io::save_project(&project)?;
    print_toggle(&args.path, resolved, "resolved", "reopened", json)
}

fn cmd_like(args: PathArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let path = comment_ops::parse_path(&args.path);
    let likes = comment_ops::increment_likes(&mut project.board, &path)?;
    project_io::save_project(&project)?;
    if json {
        println!("{}", serde_json::json!({ "path": args.path, "likes": likes }));
    } else {
        println!("{} ♥{}", args.path, likes);
    }
    Ok(())
}

fn cmd_reply_box(args: PathArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let path = comment_ops::parse_path(&args.path);
    let open = comment_ops::toggle_reply_input(&project.board, &mut project.view, &path)?;
    project_io::save_project(&project)?;
    print_toggle(&args.path, open, "reply box open", "reply box closed", json)
}

// ---------------------------------------------------------------------------
// Attachment command handlers
// ---------------------------------------------------------------------------

fn cmd_attach(args: AttachArgs, json: bool) -> CmdResult {
    let kind = match args.kind {
        AssetKindArg::Folder => AssetKind::Folder { url: args.url },
        AssetKindArg::File => AssetKind::File {
            url: args.url,
            file_type: args.file_type,
        },
        AssetKindArg::Link => AssetKind::Link {
            url: args.url.ok_or("--url is required for links")?,
        },
        AssetKindArg::Email => AssetKind::Email {
            from: args.from.ok_or("--from is required for emails")?,
            subject: args.subject.ok_or("--subject is required for emails")?,
            url: args.url,
        },
    };

    let mut project = load_project_cwd()?;
    let prefix = project.config.ids.asset.clone();
    let id = asset_ops::add_asset(&mut project.board, &args.task, &args.name, kind, &prefix)?;
    project_io::save_project(&project)?;
    print_id(id, json)
}

fn cmd_detach(args: IdArg, json: bool) -> CmdResult {
    let mut project = load_project_cwd()?;
    let removed = asset_ops::remove_asset(&mut project.board, &args.id)?;
    project_io::save_project(&project)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&removed)?);
    } else {
        println!("removed {} {}", removed.id, removed.name);
    }
    Ok(())
}

fn cmd_open(args: IdArg, json: bool) -> CmdResult {
    let project = load_project_cwd()?;
    let opener = CommandOpener::new(project.config.mail.opener.clone());
    let link = asset_ops::open_in_external_client(&project.board, &args.id, &opener)?;
    if json {
        println!("{}", serde_json::json!({ "id": args.id, "link": link.0 }));
    } else {
        println!("{}", link.0);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, json: bool) -> CmdResult {
    match args.action {
        ConfigAction::Set { key, value } => {
            let root = project_io::discover_project(&start_dir()?)?;
            let docket_dir = root.join(DOCKET_DIR);
            let (_, mut doc) = config_io::read_config(&docket_dir)?;
            config_io::set_value(&mut doc, &key, &value)?;
            config_io::write_config(&docket_dir, &doc)?;
            if json {
                println!("{}", serde_json::json!({ "key": key, "value": value.trim() }));
            }
            Ok(())
        }
    }
}
