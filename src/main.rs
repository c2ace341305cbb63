use chrono::{Local, TimeZone};
use clap::{ArgAction, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use std::path::PathBuf;
use std::process;
use tasklist::{
    Config, Filter, KeyValueStore, PersistenceAdapter, Priority, SaveStatus, Session, SqliteKv, Task, TaskUpdate,
    ValidationError,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist - a personal task list with priorities")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/tasklist/config.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage database, overriding the config file
    #[arg(short, long)]
    storage: Option<PathBuf>,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        text: String,

        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Change the text and/or priority of a task
    Edit {
        id: String,

        #[arg(short, long)]
        text: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Mark a task done, or not done
    Toggle { id: String },

    /// Delete a task
    Rm { id: String },

    /// Set the priority of a task
    Priority { id: String, priority: Priority },

    /// Choose which tasks `list` shows (all, active, completed)
    Filter { filter: Filter },

    /// Delete every completed task
    ClearCompleted,

    /// Show tasks under the current filter, highest priority first
    List,

    /// Show active and completed counts
    Stats,

    /// Show estimated storage usage
    Usage,

    /// Remove all stored task list data
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let storage_path = cli.storage.clone().unwrap_or_else(|| config.storage_path.clone());

    let kv = SqliteKv::open(&storage_path)
        .with_context(|| format!("Cannot open storage at {}", storage_path.display()))?
        .with_quota(config.quota_bytes);
    let mut session = Session::open(
        PersistenceAdapter::with_keys(kv, config.storage_keys()),
        &config.schema_version,
    );

    if let Err(e) = run(&mut session, &config, cli.command) {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }

    Ok(())
}

fn setup_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run<S: KeyValueStore>(session: &mut Session<S>, config: &Config, command: Commands) -> Result<(), ValidationError> {
    match command {
        Commands::Add { text, priority } => {
            let (id, status) = session.create(&text, priority)?;
            println!("Added {}", id.dimmed());
            report(status);
        }
        Commands::Edit { id, text, priority } => {
            let changes = TaskUpdate { text, priority };
            if changes.is_empty() {
                println!("Nothing to change (use --text and/or --priority)");
                return Ok(());
            }
            let known = session.store().get(&id).is_some();
            let status = session.update(&id, &changes)?;
            describe(session, &id, known, "Updated");
            report(status);
        }
        Commands::Toggle { id } => {
            let known = session.store().get(&id).is_some();
            let status = session.toggle_completion(&id)?;
            describe(session, &id, known, "Toggled");
            report(status);
        }
        Commands::Rm { id } => {
            let known = session.store().get(&id).is_some();
            let status = session.delete(&id)?;
            if known {
                println!("Deleted {}", id.dimmed());
            } else {
                println!("{}", missing_note(&id));
            }
            report(status);
        }
        Commands::Priority { id, priority } => {
            let known = session.store().get(&id).is_some();
            let status = session.update_priority(&id, priority)?;
            describe(session, &id, known, "Reprioritized");
            report(status);
        }
        Commands::Filter { filter } => {
            let status = session.set_filter(filter);
            println!("Showing {} tasks", filter);
            report(status);
        }
        Commands::ClearCompleted => {
            let removed = session.counts().completed;
            let status = session.clear_completed();
            println!("Cleared {} completed task(s)", removed);
            report(status);
        }
        Commands::List => {
            let visible = session.visible_tasks();
            if visible.is_empty() {
                println!("{}", "No tasks".dimmed());
            }
            for task in visible {
                print_task(task);
            }
            let counts = session.counts();
            println!(
                "\n{} active, {} completed (showing {})",
                counts.active,
                counts.completed,
                session.store().filter()
            );
        }
        Commands::Stats => {
            let counts = session.counts();
            println!("Active:    {}", counts.active);
            println!("Completed: {}", counts.completed);
            println!("Total:     {}", counts.total());
        }
        Commands::Usage => {
            let available = session.is_persistence_available();
            println!("Storage available: {}", if available { "yes".green() } else { "no".red() });
            println!("Estimated usage:   {} bytes", session.usage_estimate());
            match config.quota_bytes {
                Some(quota) => println!("Quota:             {} bytes", quota),
                None => println!("Quota:             unlimited"),
            }
            if let Some(version) = session.schema_version() {
                println!("Schema version:    {}", version);
            }
        }
        Commands::Reset => {
            let status = session.reset();
            println!("Task list reset");
            report(status);
        }
    }

    Ok(())
}

fn describe<S: KeyValueStore>(session: &Session<S>, id: &str, known: bool, verb: &str) {
    println!("{}", change_summary(session.store().get(id).filter(|_| known), id, verb));
}

/// Outcome line for an operation on `id`; `task` is `None` when nothing matched
fn change_summary(task: Option<&Task>, id: &str, verb: &str) -> String {
    match task {
        Some(task) => format!("{}:\n{}", verb, task_line(task)),
        None => missing_note(id),
    }
}

fn missing_note(id: &str) -> String {
    format!("{} no task {}", "note:".yellow(), id)
}

fn report(status: SaveStatus) {
    if let SaveStatus::Failed(e) = status {
        eprintln!("{} change not saved, it will be lost on exit: {:#}", "warning:".yellow().bold(), e);
    }
}

fn priority_label(priority: Priority) -> ColoredString {
    let label = format!("{:<6}", priority);
    match priority {
        Priority::High => label.red().bold(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.blue(),
    }
}

fn print_task(task: &Task) {
    println!("{}", task_line(task));
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let text = if task.completed {
        task.text.dimmed().strikethrough()
    } else {
        task.text.normal()
    };
    let created = Local
        .timestamp_millis_opt(task.created_at)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "{} {} {}  {} {}",
        mark,
        priority_label(task.priority),
        text,
        created.dimmed(),
        task.id.dimmed()
    )
}
