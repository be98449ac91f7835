//! Habit trackers and their timestamped wins.
//!
//! A tracker's `history` is append-only from [`HabitLedger::log_win`]; every
//! other operation edits or removes entries by id and never reorders the
//! remaining ones.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{local_date, Clock};
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{keys, load_json, save_json, PersistentStore};
use crate::timer::TimerMode;

pub const DEFAULT_EMOJI: &str = "✨";

/// The follow-up note prompt closes this long after a win...
pub const NOTE_PROMPT_OPEN_MS: u64 = 5_000;
/// ...or this long after the latest keystroke.
pub const NOTE_PROMPT_TYPING_MS: u64 = 8_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitLog {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: u64,
    /// Timer mode active when the win was logged.
    pub mode: TimerMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitTracker {
    pub id: String,
    pub name: String,
    pub emoji: String,
    #[serde(default)]
    pub created_at: u64,
    /// Oldest first.
    #[serde(default)]
    pub history: Vec<HabitLog>,
}

impl HabitTracker {
    pub fn total_wins(&self) -> usize {
        self.history.len()
    }

    pub fn wins_on(&self, day: NaiveDate) -> usize {
        self.history
            .iter()
            .filter(|log| local_date(log.timestamp) == day)
            .count()
    }

    pub fn history_newest_first(&self) -> impl Iterator<Item = &HabitLog> {
        self.history.iter().rev()
    }

    pub fn log(&self, log_id: &str) -> Option<&HabitLog> {
        self.history.iter().find(|log| log.id == log_id)
    }
}

pub struct HabitLedger {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    trackers: Vec<HabitTracker>,
}

impl HabitLedger {
    pub fn load(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let trackers = load_json(store.as_ref(), keys::HABITS)?.unwrap_or_default();
        Ok(Self {
            store,
            clock,
            trackers,
        })
    }

    pub fn trackers(&self) -> &[HabitTracker] {
        &self.trackers
    }

    pub fn tracker(&self, id: &str) -> Option<&HabitTracker> {
        self.trackers.iter().find(|t| t.id == id)
    }

    pub fn create_tracker(&mut self, name: &str, emoji: &str) -> Result<&HabitTracker> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyText { field: "name" }.into());
        }
        let emoji = match emoji.trim() {
            "" => DEFAULT_EMOJI,
            e => e,
        };
        self.trackers.push(HabitTracker {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            created_at: self.clock.now_ms(),
            history: Vec::new(),
        });
        self.persist()?;
        let index = self.trackers.len() - 1;
        Ok(&self.trackers[index])
    }

    /// Remove a tracker and its whole history.
    pub fn delete_tracker(&mut self, tracker_id: &str) -> Result<bool> {
        let before = self.trackers.len();
        self.trackers.retain(|t| t.id != tracker_id);
        if self.trackers.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Append a win stamped with the current time and `mode`; returns its id.
    pub fn log_win(&mut self, tracker_id: &str, mode: TimerMode) -> Result<String> {
        let timestamp = self.clock.now_ms();
        let tracker = self
            .trackers
            .iter_mut()
            .find(|t| t.id == tracker_id)
            .ok_or_else(|| CoreError::not_found("tracker", tracker_id))?;
        let id = Uuid::new_v4().to_string();
        tracker.history.push(HabitLog {
            id: id.clone(),
            timestamp,
            mode,
            note: None,
        });
        self.persist()?;
        Ok(id)
    }

    /// Set or replace a log's note. A blank note clears it.
    pub fn set_note(&mut self, tracker_id: &str, log_id: &str, note: &str) -> Result<bool> {
        let note = Some(note.trim()).filter(|n| !n.is_empty()).map(str::to_string);
        let Some(log) = self
            .tracker_mut(tracker_id)
            .and_then(|t| t.history.iter_mut().find(|log| log.id == log_id))
        else {
            return Ok(false);
        };
        if log.note != note {
            log.note = note;
            self.persist()?;
        }
        Ok(true)
    }

    pub fn delete_log(&mut self, tracker_id: &str, log_id: &str) -> Result<bool> {
        let Some(tracker) = self.tracker_mut(tracker_id) else {
            return Ok(false);
        };
        let before = tracker.history.len();
        tracker.history.retain(|log| log.id != log_id);
        if tracker.history.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn set_emoji(&mut self, tracker_id: &str, emoji: &str) -> Result<bool> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ValidationError::EmptyText { field: "emoji" }.into());
        }
        let Some(tracker) = self.tracker_mut(tracker_id) else {
            return Ok(false);
        };
        tracker.emoji = emoji.to_string();
        self.persist()?;
        Ok(true)
    }

    pub fn rename(&mut self, tracker_id: &str, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyText { field: "name" }.into());
        }
        let Some(tracker) = self.tracker_mut(tracker_id) else {
            return Ok(false);
        };
        tracker.name = name.to_string();
        self.persist()?;
        Ok(true)
    }

    fn tracker_mut(&mut self, id: &str) -> Option<&mut HabitTracker> {
        self.trackers.iter_mut().find(|t| t.id == id)
    }

    fn persist(&self) -> Result<()> {
        save_json(self.store.as_ref(), keys::HABITS, &self.trackers)
    }
}

/// The short-lived "what happened?" prompt offered right after a win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePrompt {
    pub tracker_id: String,
    pub log_id: String,
    deadline_ms: u64,
}

impl NotePrompt {
    pub fn open(tracker_id: impl Into<String>, log_id: impl Into<String>, now_ms: u64) -> Self {
        Self {
            tracker_id: tracker_id.into(),
            log_id: log_id.into(),
            deadline_ms: now_ms.saturating_add(NOTE_PROMPT_OPEN_MS),
        }
    }

    /// Typing keeps the prompt open a little longer.
    pub fn on_input(&mut self, now_ms: u64) {
        if !self.is_expired(now_ms) {
            self.deadline_ms = now_ms.saturating_add(NOTE_PROMPT_TYPING_MS);
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }

    /// Save the note if the prompt is still open and the note is not blank.
    pub fn submit(self, ledger: &mut HabitLedger, note: &str, now_ms: u64) -> Result<bool> {
        if self.is_expired(now_ms) || note.trim().is_empty() {
            return Ok(false);
        }
        ledger.set_note(&self.tracker_id, &self.log_id, note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn ledger() -> (HabitLedger, Arc<MemoryStore>, ManualClock) {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(1_700_000_000_000);
        let ledger = HabitLedger::load(store.clone(), Arc::new(clock.clone())).unwrap();
        (ledger, store, clock)
    }

    #[test]
    fn create_tracker_trims_and_defaults_emoji() {
        let (mut ledger, _, _) = ledger();
        let tracker = ledger.create_tracker("  snacking ", "").unwrap();
        assert_eq!(tracker.name, "snacking");
        assert_eq!(tracker.emoji, DEFAULT_EMOJI);
        assert!(tracker.history.is_empty());
    }

    #[test]
    fn create_tracker_rejects_blank_name() {
        let (mut ledger, _, _) = ledger();
        assert!(matches!(
            ledger.create_tracker("   ", "🍪"),
            Err(CoreError::Validation(ValidationError::EmptyText { field: "name" }))
        ));
    }

    #[test]
    fn log_win_then_note() {
        let (mut ledger, _, _) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let log_id = ledger.log_win(&id, TimerMode::Work).unwrap();
        assert!(ledger.set_note(&id, &log_id, "ate a cookie").unwrap());

        let tracker = ledger.tracker(&id).unwrap();
        assert_eq!(tracker.history.len(), 1);
        assert_eq!(tracker.history[0].mode, TimerMode::Work);
        assert_eq!(tracker.history[0].note.as_deref(), Some("ate a cookie"));
    }

    #[test]
    fn log_win_on_unknown_tracker_is_not_found() {
        let (mut ledger, _, _) = ledger();
        assert!(matches!(
            ledger.log_win("missing", TimerMode::Work),
            Err(CoreError::NotFound { kind: "tracker", .. })
        ));
    }

    #[test]
    fn set_note_is_idempotent_and_blank_clears() {
        let (mut ledger, _, _) = ledger();
        let id = ledger.create_tracker("doomscrolling", "📱").unwrap().id.clone();
        let log_id = ledger.log_win(&id, TimerMode::ShortBreak).unwrap();
        assert!(ledger.set_note(&id, &log_id, "put phone away").unwrap());
        assert!(ledger.set_note(&id, &log_id, "put phone away").unwrap());
        assert_eq!(ledger.tracker(&id).unwrap().history[0].note.as_deref(), Some("put phone away"));
        assert!(ledger.set_note(&id, &log_id, "  ").unwrap());
        assert!(ledger.tracker(&id).unwrap().history[0].note.is_none());
    }

    #[test]
    fn delete_log_removes_only_that_entry() {
        let (mut ledger, _, clock) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let mut ids = Vec::new();
        for note in ["a", "b", "c", "d"] {
            let log_id = ledger.log_win(&id, TimerMode::Work).unwrap();
            ledger.set_note(&id, &log_id, note).unwrap();
            ids.push(log_id);
            clock.advance(1_000);
        }
        let before = ledger.tracker(&id).unwrap().history.clone();

        assert!(ledger.delete_log(&id, &ids[1]).unwrap());
        assert!(!ledger.delete_log(&id, &ids[1]).unwrap());

        let after = &ledger.tracker(&id).unwrap().history;
        let expected: Vec<HabitLog> = before.into_iter().filter(|log| log.id != ids[1]).collect();
        assert_eq!(after, &expected);
    }

    #[test]
    fn unknown_ids_change_nothing() {
        let (mut ledger, store, _) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let snapshot = store.get(keys::HABITS).unwrap();
        assert!(!ledger.set_note(&id, "nope", "x").unwrap());
        assert!(!ledger.set_note("nope", "nope", "x").unwrap());
        assert!(!ledger.delete_log("nope", "nope").unwrap());
        assert!(!ledger.set_emoji("nope", "🔥").unwrap());
        assert!(!ledger.delete_tracker("nope").unwrap());
        assert_eq!(store.get(keys::HABITS).unwrap(), snapshot);
    }

    #[test]
    fn delete_tracker_drops_history() {
        let (mut ledger, store, clock) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        ledger.log_win(&id, TimerMode::Work).unwrap();
        assert!(ledger.delete_tracker(&id).unwrap());
        assert!(ledger.tracker(&id).is_none());

        let reloaded = HabitLedger::load(store, Arc::new(clock)).unwrap();
        assert!(reloaded.trackers().is_empty());
    }

    #[test]
    fn changes_survive_reload() {
        let (mut ledger, store, clock) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let log_id = ledger.log_win(&id, TimerMode::LongBreak).unwrap();
        ledger.set_emoji(&id, "🥕").unwrap();
        ledger.rename(&id, "sugar").unwrap();

        let reloaded = HabitLedger::load(store, Arc::new(clock)).unwrap();
        let tracker = reloaded.tracker(&id).unwrap();
        assert_eq!(tracker.emoji, "🥕");
        assert_eq!(tracker.name, "sugar");
        assert_eq!(tracker.log(&log_id).unwrap().mode, TimerMode::LongBreak);
    }

    #[test]
    fn history_views() {
        let (mut ledger, _, clock) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let first = ledger.log_win(&id, TimerMode::Work).unwrap();
        clock.advance(3 * 24 * 60 * 60 * 1000);
        let second = ledger.log_win(&id, TimerMode::Work).unwrap();

        let tracker = ledger.tracker(&id).unwrap();
        let newest: Vec<&str> = tracker.history_newest_first().map(|l| l.id.as_str()).collect();
        assert_eq!(newest, [second.as_str(), first.as_str()]);
        assert_eq!(tracker.total_wins(), 2);
        assert_eq!(tracker.wins_on(clock.today()), 1);
    }

    #[test]
    fn note_prompt_expires_and_typing_extends_it() {
        let (mut ledger, _, clock) = ledger();
        let id = ledger.create_tracker("snacking", "🍪").unwrap().id.clone();
        let log_id = ledger.log_win(&id, TimerMode::Work).unwrap();
        let now = clock.now_ms();

        let mut prompt = NotePrompt::open(&id, &log_id, now);
        assert_eq!(prompt.remaining_ms(now), NOTE_PROMPT_OPEN_MS);
        prompt.on_input(now + 4_000);
        assert!(!prompt.is_expired(now + 11_000));
        assert!(prompt.is_expired(now + 12_000));

        let late = NotePrompt::open(&id, &log_id, now);
        assert!(!late.submit(&mut ledger, "too late", now + 5_000).unwrap());
        assert!(ledger.tracker(&id).unwrap().history[0].note.is_none());

        let prompt = NotePrompt::open(&id, &log_id, now);
        assert!(prompt.submit(&mut ledger, "ate a carrot", now + 1_000).unwrap());
        assert_eq!(ledger.tracker(&id).unwrap().history[0].note.as_deref(), Some("ate a carrot"));
    }
}
