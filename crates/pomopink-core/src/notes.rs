use std::sync::Arc;

use crate::error::Result;
use crate::storage::{keys, load_json, save_json, PersistentStore};

/// Free-form notes text, saved on every change.
pub struct NotesStore {
    store: Arc<dyn PersistentStore>,
    text: String,
}

impl NotesStore {
    pub fn load(store: Arc<dyn PersistentStore>) -> Result<Self> {
        let text = load_json(store.as_ref(), keys::NOTES)?.unwrap_or_default();
        Ok(Self { store, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.text = text.into();
        save_json(self.store.as_ref(), keys::NOTES, &self.text)
    }

    pub fn append_line(&mut self, line: &str) -> Result<()> {
        let mut text = std::mem::take(&mut self.text);
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(line);
        self.set_text(text)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.set_text(String::new())
    }
}
