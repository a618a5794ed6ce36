//! StashDB walkthrough - a small task list.
//!
//! Demonstrates the whole client surface:
//! - schema configuration and initialization
//! - inserts with engine-assigned keys
//! - primary and index selections, ordered and capped
//! - keyed update and index-scoped deletion
//!
//! Run with: cargo run -p tasks_demo

use serde::{Deserialize, Serialize};
use stashdb_core::{ClientError, Schema, Selection, Stash};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    #[serde(default)]
    id: u64,
    name: String,
    priority: i64,
    done: bool,
}

impl Task {
    fn new(name: &str, priority: i64) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            priority,
            done: false,
        }
    }
}

fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let stash = Stash::in_memory();
    stash
        .configure(
            Schema::new("todo")
                .version(1)
                .storage("tasks")
                .index("tasks", "tasksName", "name")
                .index("tasks", "tasksPriority", "priority"),
        )?
        .init()?;

    let tasks = stash.from("tasks");
    for task in [
        Task::new("laundry", 2),
        Task::new("dishes", 1),
        Task::new("groceries", 3),
        Task::new("laundry", 1),
    ] {
        let id = tasks.insert(&task)?;
        println!("inserted {} as {id}", task.name);
    }

    let everything: Vec<Task> = tasks.select(Selection::all())?;
    println!("\nall tasks, key order:");
    for task in &everything {
        println!("  #{} {} (priority {})", task.id, task.name, task.priority);
    }

    let urgent: Vec<Task> = tasks.select(Selection::index("tasksPriority").at_most(1i64))?;
    println!("\npriority <= 1:");
    for task in &urgent {
        println!("  #{} {}", task.id, task.name);
    }

    let newest: Vec<Task> = tasks.select(Selection::all().count(2).desc())?;
    println!("\ntwo newest:");
    for task in &newest {
        println!("  #{} {}", task.id, task.name);
    }

    // mark one done: full replace by key
    let mut first = everything[0].clone();
    first.done = true;
    tasks.update(&first)?;

    // every "laundry" record goes away in one call
    tasks.delete(Selection::index("tasksName").value("laundry"))?;

    let left: Vec<Task> = tasks.select(Selection::all())?;
    println!("\nafter deleting laundry:");
    for task in &left {
        println!("  #{} {} done={}", task.id, task.name, task.done);
    }

    Ok(())
}
