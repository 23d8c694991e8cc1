use crate::cli::commands::InitArgs;
use crate::io::project_io;

/// Infer a board name from a directory name: hyphens and underscores become
/// spaces, each word title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let root = super::start_dir()?;

    if !args.force
        && let Some(parent) = root.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!(
            "Note: enclosing docket found at {}/",
            parent_root.join(project_io::DOCKET_DIR).display()
        );
    }

    let name = args
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .map(infer_name)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Untitled".to_string())
        });

    let docket_dir = project_io::init_project(&root, &name, args.force)?;
    println!("Initialized docket: {}", name);
    println!("  {}/", docket_dir.display());
    Ok(())
}
