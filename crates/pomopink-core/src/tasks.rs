//! Checklist of tasks with one level of subtasks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::storage::{keys, load_json, save_json, PersistentStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
}

pub struct TaskStore {
    store: Arc<dyn PersistentStore>,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn load(store: Arc<dyn PersistentStore>) -> Result<Self> {
        let tasks = load_json(store.as_ref(), keys::TASKS)?.unwrap_or_default();
        Ok(Self { store, tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.completed)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    /// Append a task; returns its id.
    pub fn add(&mut self, text: &str) -> Result<String> {
        let text = non_empty(text)?;
        let id = Uuid::new_v4().to_string();
        self.tasks.push(Task {
            id: id.clone(),
            text,
            completed: false,
            subtasks: Vec::new(),
        });
        self.persist()?;
        Ok(id)
    }

    /// Flip completion; returns the new state, `None` for an unknown id.
    pub fn toggle(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Returns the subtask id, `None` for an unknown parent.
    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> Result<Option<String>> {
        let text = non_empty(text)?;
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };
        let id = Uuid::new_v4().to_string();
        task.subtasks.push(SubTask {
            id: id.clone(),
            text,
            completed: false,
        });
        self.persist()?;
        Ok(Some(id))
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<Option<bool>> {
        let Some(sub) = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .and_then(|t| t.subtasks.iter_mut().find(|s| s.id == subtask_id))
        else {
            return Ok(None);
        };
        sub.completed = !sub.completed;
        let completed = sub.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    pub fn remove_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(false);
        };
        let before = task.subtasks.len();
        task.subtasks.retain(|s| s.id != subtask_id);
        if task.subtasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        save_json(self.store.as_ref(), keys::TASKS, &self.tasks)
    }
}

fn non_empty(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyText { field: "text" }.into());
    }
    Ok(text.to_string())
}
