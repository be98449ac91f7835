//! Per-day pomodoro and focus counters.
//!
//! The record is loaded once when the ledger is created and written back
//! after every mutation. Counters belong to the local calendar day of
//! `lastUpdatedISODate`; once that day is over they read as zero, and the
//! next mutation starts the new day from zero.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{to_datetime, Clock};
use crate::error::Result;
use crate::storage::{keys, load_json, save_json, PersistentStore};

/// Persisted daily counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(default)]
    pub pomodoros_completed: u32,
    #[serde(default)]
    pub total_focused_time_ms: u64,
    #[serde(rename = "lastUpdatedISODate", default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DailyStats {
    fn belongs_to(&self, day: NaiveDate) -> bool {
        self.last_updated
            .is_some_and(|ts| ts.with_timezone(&Local).date_naive() == day)
    }
}

pub struct DailyStatsLedger {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    record: DailyStats,
}

impl DailyStatsLedger {
    pub fn load(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let record = load_json(store.as_ref(), keys::DAILY_STATS)?.unwrap_or_default();
        Ok(Self {
            store,
            clock,
            record,
        })
    }

    /// Today's counters; zero if the stored record is from another day.
    pub fn today(&self) -> DailyStats {
        if self.record.belongs_to(self.clock.today()) {
            self.record.clone()
        } else {
            DailyStats {
                last_updated: self.record.last_updated,
                ..DailyStats::default()
            }
        }
    }

    pub fn pomodoros_today(&self) -> u32 {
        self.today().pomodoros_completed
    }

    pub fn focused_time_today_ms(&self) -> u64 {
        self.today().total_focused_time_ms
    }

    /// Returns the new pomodoro count.
    pub fn record_pomodoro_completed(&mut self) -> Result<u32> {
        self.mutate(|stats| stats.pomodoros_completed = stats.pomodoros_completed.saturating_add(1))?;
        Ok(self.record.pomodoros_completed)
    }

    /// Returns the new focused total.
    pub fn add_focused_time(&mut self, delta_ms: u64) -> Result<u64> {
        self.mutate(|stats| {
            stats.total_focused_time_ms = stats.total_focused_time_ms.saturating_add(delta_ms)
        })?;
        Ok(self.record.total_focused_time_ms)
    }

    /// Zero the focused time, leaving the pomodoro count alone.
    pub fn reset_focus_time(&mut self) -> Result<()> {
        self.mutate(|stats| stats.total_focused_time_ms = 0)
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut DailyStats)) -> Result<()> {
        let now = self.clock.now_ms();
        if !self.record.belongs_to(self.clock.today()) {
            tracing::debug!("daily stats rolled over to a new day");
            self.record = DailyStats::default();
        }
        apply(&mut self.record);
        self.record.last_updated = Some(to_datetime(now));
        save_json(self.store.as_ref(), keys::DAILY_STATS, &self.record)
    }
}
