//! Demo: a task list session backed by SQLite
//!
//! This demo creates, updates, filters, and clears tasks, then reopens the
//! storage to show that the list survives a restart.
//!
//! Run with: cargo run --example basic_session

use eyre::Result;
use tasklist::{Filter, PersistenceAdapter, Priority, SCHEMA_VERSION, Session, SqliteKv, TaskUpdate};

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("storage.db");

    println!("Tasklist Session Demo");
    println!("=====================\n");
    println!("Storage: {}\n", db_path.display());

    let mut session = Session::open(PersistenceAdapter::new(SqliteKv::open(&db_path)?), SCHEMA_VERSION);

    // CREATE
    println!("1. CREATE - Adding tasks...");
    let (milk, _) = session.create("Buy milk", None)?;
    let (rent, _) = session.create("Pay rent", Some(Priority::High))?;
    let (bike, _) = session.create("Fix bike", Some(Priority::Low))?;
    println!("   Created {} tasks\n", session.counts().total());

    // Empty text is rejected and nothing changes
    match session.create("   ", None) {
        Ok(_) => println!("   Unexpectedly accepted empty text"),
        Err(e) => println!("   Rejected empty task: {}\n", e),
    }

    // UPDATE
    println!("2. UPDATE - Editing and prioritizing...");
    let _ = session.update(&milk, &TaskUpdate::text("Buy oat milk"))?;
    let _ = session.update_priority(&bike, Priority::High)?;
    for task in session.visible_tasks() {
        println!("   [{}] {} ({})", task.priority, task.text, task.id);
    }
    println!();

    // TOGGLE + FILTER
    println!("3. TOGGLE - Completing the rent...");
    let _ = session.toggle_completion(&rent)?;
    let _ = session.set_filter(Filter::Active);
    let counts = session.counts();
    println!("   {} active, {} completed", counts.active, counts.completed);
    println!("   Active view: {} task(s)\n", session.visible_tasks().len());

    // RELOAD
    println!("4. RELOAD - Reopening storage...");
    drop(session);
    let mut session = Session::open(PersistenceAdapter::new(SqliteKv::open(&db_path)?), SCHEMA_VERSION);
    println!(
        "   Restored {} tasks with filter '{}'\n",
        session.store().tasks().len(),
        session.store().filter()
    );

    // CLEAR
    println!("5. CLEAR - Removing completed tasks...");
    let _ = session.clear_completed();
    println!("   Remaining: {}", session.counts().total());
    println!("   Storage usage: {} bytes\n", session.usage_estimate());

    println!("Demo complete!");
    Ok(())
}
