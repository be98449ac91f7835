//! Read-only daily summary: today's stats, tasks, notes and habit wins.

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::daily_stats::DailyStatsLedger;
use crate::habits::HabitLedger;
use crate::notes::NotesStore;
use crate::tasks::{Task, TaskStore};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitWins {
    pub name: String,
    pub emoji: String,
    pub wins_today: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub pomodoros_completed: u32,
    pub focused_time_ms: u64,
    pub focused_time: String,
    pub completed_tasks: Vec<Task>,
    pub pending_tasks: Vec<Task>,
    pub notes: String,
    pub habits: Vec<HabitWins>,
}

impl DailySummary {
    pub fn collect(
        stats: &DailyStatsLedger,
        tasks: &TaskStore,
        notes: &NotesStore,
        habits: &HabitLedger,
        clock: &dyn Clock,
    ) -> Self {
        let date = clock.today();
        let today = stats.today();
        Self {
            date,
            pomodoros_completed: today.pomodoros_completed,
            focused_time_ms: today.total_focused_time_ms,
            focused_time: format_focus_time(today.total_focused_time_ms),
            completed_tasks: tasks.completed().cloned().collect(),
            pending_tasks: tasks.pending().cloned().collect(),
            notes: notes.text().to_string(),
            habits: habits
                .trackers()
                .iter()
                .map(|t| HabitWins {
                    name: t.name.clone(),
                    emoji: t.emoji.clone(),
                    wins_today: t.wins_on(date),
                })
                .collect(),
        }
    }
}

/// `"1h 25m"`, `"25m"`, or `"0m"` for under a minute.
pub fn format_focus_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
