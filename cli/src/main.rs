mod listing;
mod tui;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use tasknote_core::logging::init_logging;
use tasknote_core::model::note::derive_title;
use tasknote_core::{
    expand_home, parse_args, ConfigStore, NoteDraft, ParsedInput, TagSet, Task, TaskPatch,
    TaskStatus, Workspace,
};

const TASK_KEYS: &[&str] = &["description", "status"];
const NOTE_KEYS: &[&str] = &["content", "tag", "untag"];

#[derive(Parser)]
#[command(name = "tasknote")]
#[command(about = "A kanban board and tagged notes kept in a local directory", long_about = None)]
struct Cli {
    /// Config file (default: ~/.tasknote/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the data directory, or select one (created if missing)
    Dir { path: Option<String> },
    /// Add a task (usage: add Write report desc:"Q3 numbers" status:doing)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show the board
    List,
    /// Move a task to another column (todo, in-progress, done)
    Move { id: String, status: String },
    /// Edit a task (usage: edit <id> New title desc:"New description")
    Edit {
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete a task
    Rm { id: String },
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(clap::Subcommand)]
enum NoteCommands {
    /// Add a note (usage: note add Meeting content:"agenda" tag:work tag:q3)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List notes, newest first
    List {
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        favorites: bool,
    },
    /// Print a note
    Show { id: String },
    /// Edit a note (usage: note edit <id> New title content:"..." tag:new untag:old)
    Edit {
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete a note
    Rm { id: String },
    /// Toggle a note's favorite flag
    Fav { id: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_store = ConfigStore::new(cli.config)?;
    let config = config_store.load()?;

    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    if let Err(e) = init_logging(&level, &config_store.log_dir()) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    info!("starting with config {}", config_store.path().display());

    let workspace = Workspace::open(config, Some(config_store)).await;

    match cli.command {
        Some(Commands::Dir { path }) => select_directory(&workspace, path).await?,
        Some(Commands::Add { args }) => {
            let Some(task) = add_task(&workspace, &args).await? else {
                println!("Error: Task title is required.");
                return Ok(());
            };
            println!("Task added: {} (ID: {})", task.title, task.id);
            println!("  Status: {}", task.status);
            warn_without_directory(&workspace);
        }
        Some(Commands::List) => listing::show_board(&workspace.tasks().tasks()),
        Some(Commands::Move { id, status }) => {
            let id = workspace.tasks().resolve_id(&id)?;
            let status: TaskStatus = status.parse()?;
            let task = workspace.tasks().move_task(&id, status).await?;
            println!("Moved '{}' to {}", task.title, task.status);
            warn_without_directory(&workspace);
        }
        Some(Commands::Edit { id, args }) => {
            let id = workspace.tasks().resolve_id(&id)?;
            let parsed = parse(&args, TASK_KEYS);
            let mut patch = TaskPatch::default();
            if !parsed.name.trim().is_empty() {
                patch.title = Some(parsed.name.trim().to_string());
            }
            patch.description = parsed.get("description").map(str::to_string);
            if let Some(status) = parsed.get("status") {
                patch.status = Some(status.parse()?);
            }
            if patch.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            let task = workspace.tasks().update(&id, patch).await?;
            println!("Task updated: {} [{}]", task.title, task.status);
            warn_without_directory(&workspace);
        }
        Some(Commands::Rm { id }) => {
            let id = workspace.tasks().resolve_id(&id)?;
            let task = workspace.tasks().delete(&id).await?;
            println!("Deleted task: {}", task.title);
            warn_without_directory(&workspace);
        }
        Some(Commands::Note { command }) => run_note_command(&workspace, command).await?,
        Some(Commands::Tui) | None => tui::run(&workspace).await?,
    }
    Ok(())
}

/// Creates a task from `add` arguments. Every argument is validated before
/// the store is touched. `None` when no title was given.
async fn add_task(workspace: &Workspace, args: &[String]) -> Result<Option<Task>> {
    let parsed = parse(args, TASK_KEYS);
    if parsed.name.trim().is_empty() {
        return Ok(None);
    }
    let status = match parsed.get("status") {
        Some(status) => status.parse()?,
        None => TaskStatus::Todo,
    };
    let description = parsed.get("description").unwrap_or("");
    let task = workspace
        .tasks()
        .add_with_status(&parsed.name, description, status)
        .await?;
    Ok(Some(task))
}

async fn run_note_command(workspace: &Workspace, command: NoteCommands) -> Result<()> {
    let notes = workspace.notes();
    match command {
        NoteCommands::Add { args } => {
            let parsed = parse(&args, NOTE_KEYS);
            let content = parsed.get("content").unwrap_or("");
            let tags: TagSet = parsed.get_all("tag").collect();
            let title = derive_title(&parsed.name, content);
            let note = notes.add(&title, content, tags).await?;
            println!("Note added: {} (ID: {})", note.title, note.id);
            warn_without_directory(workspace);
        }
        NoteCommands::List { tag, favorites } => {
            let mut list = match &tag {
                Some(tag) => notes.with_tag(tag),
                None => notes.notes(),
            };
            if favorites {
                list.retain(|n| n.is_favorite);
            }
            listing::show_notes(&list);
        }
        NoteCommands::Show { id } => {
            let id = notes.resolve_id(&id)?;
            match notes.get(&id) {
                Some(note) => listing::show_note(&note),
                None => bail!("Note '{}' not found", id),
            }
        }
        NoteCommands::Edit { id, args } => {
            let id = notes.resolve_id(&id)?;
            let Some(note) = notes.get(&id) else {
                bail!("Note '{}' not found", id);
            };
            let parsed = parse(&args, NOTE_KEYS);
            let mut draft = NoteDraft::from_note(&note);
            if !parsed.name.trim().is_empty() {
                draft.title = parsed.name.clone();
            }
            if let Some(content) = parsed.get("content") {
                draft.content = content.to_string();
            }
            for tag in parsed.get_all("tag") {
                draft.tag_input = tag.to_string();
                draft.add_tag();
            }
            for tag in parsed.get_all("untag") {
                draft.remove_tag(tag.trim());
            }
            let note = notes.save_draft(&id, &draft).await?;
            println!("Note updated: {}", note.title);
            warn_without_directory(workspace);
        }
        NoteCommands::Rm { id } => {
            let id = notes.resolve_id(&id)?;
            let note = notes.delete(&id).await?;
            println!("Deleted note: {}", note.title);
            warn_without_directory(workspace);
        }
        NoteCommands::Fav { id } => {
            let id = notes.resolve_id(&id)?;
            let note = notes.toggle_favorite(&id).await?;
            let state = if note.is_favorite { "Starred" } else { "Unstarred" };
            println!("{}: {}", state, note.title);
            warn_without_directory(workspace);
        }
    }
    Ok(())
}

async fn select_directory(workspace: &Workspace, path: Option<String>) -> Result<()> {
    let Some(path) = path.as_deref().map(expand_home) else {
        match workspace.directory() {
            Some(dir) => println!("{}", dir.display()),
            None => println!("No data directory selected. Run `tasknote dir <PATH>`."),
        }
        return Ok(());
    };

    if !workspace.initialize_directory(&path).await? {
        bail!("{} is not a directory", path.display());
    }
    println!(
        "Using {} ({} tasks, {} notes)",
        workspace.directory().unwrap_or(path).display(),
        workspace.tasks().tasks().len(),
        workspace.notes().notes().len()
    );
    Ok(())
}

/// Parses `key:value` arguments, expanding abbreviated keys.
fn parse(args: &[String], keys: &[&str]) -> ParsedInput {
    let mut parsed = parse_args(args);
    for warning in parsed.normalize_keys(keys) {
        println!("Warning: {}", warning);
    }
    parsed
}

fn warn_without_directory(workspace: &Workspace) {
    if !workspace.has_directory() {
        println!("Note: no data directory selected, this change was not saved. Run `tasknote dir <PATH>`.");
    }
}
