use clap::Subcommand;
use pomopink_core::{CoreError, TaskStore};

use super::{open_store, print_json};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add { text: String },
    /// List tasks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task done or not done
    Toggle { id: String },
    /// Delete a task
    Remove { id: String },
    /// Add a subtask
    AddSub { task_id: String, text: String },
    /// Mark a subtask done or not done
    ToggleSub { task_id: String, subtask_id: String },
    /// Delete a subtask
    RemoveSub { task_id: String, subtask_id: String },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tasks = TaskStore::load(open_store()?)?;

    match action {
        TaskAction::Add { text } => {
            println!("{}", tasks.add(&text)?);
        }
        TaskAction::List { json } => {
            if json {
                print_json(&tasks.tasks())?;
            } else {
                for task in tasks.tasks() {
                    println!("[{}] {}  ({})", check(task.completed), task.text, task.id);
                    for sub in &task.subtasks {
                        println!("    [{}] {}  ({})", check(sub.completed), sub.text, sub.id);
                    }
                }
                println!("{} pending", tasks.pending_count());
            }
        }
        TaskAction::Toggle { id } => {
            let completed = tasks
                .toggle(&id)?
                .ok_or_else(|| CoreError::not_found("task", &id))?;
            println!("{}", if completed { "done" } else { "pending" });
        }
        TaskAction::Remove { id } => {
            if !tasks.remove(&id)? {
                return Err(CoreError::not_found("task", &id).into());
            }
            println!("removed");
        }
        TaskAction::AddSub { task_id, text } => {
            let sub_id = tasks
                .add_subtask(&task_id, &text)?
                .ok_or_else(|| CoreError::not_found("task", &task_id))?;
            println!("{sub_id}");
        }
        TaskAction::ToggleSub { task_id, subtask_id } => {
            let completed = tasks
                .toggle_subtask(&task_id, &subtask_id)?
                .ok_or_else(|| CoreError::not_found("subtask", &subtask_id))?;
            println!("{}", if completed { "done" } else { "pending" });
        }
        TaskAction::RemoveSub { task_id, subtask_id } => {
            if !tasks.remove_subtask(&task_id, &subtask_id)? {
                return Err(CoreError::not_found("subtask", &subtask_id).into());
            }
            println!("removed");
        }
    }
    Ok(())
}

fn check(done: bool) -> char {
    if done {
        'x'
    } else {
        ' '
    }
}
