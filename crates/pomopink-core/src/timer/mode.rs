use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The active countdown category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Work, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Work)
    }

    /// Short button label.
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Work => "Work",
            TimerMode::ShortBreak => "Break",
            TimerMode::LongBreak => "Rest",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            TimerMode::Work => "stay focused",
            TimerMode::ShortBreak | TimerMode::LongBreak => "take it easy",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "work" | "focus" => Ok(TimerMode::Work),
            "shortbreak" | "short" | "break" => Ok(TimerMode::ShortBreak),
            "longbreak" | "long" | "rest" => Ok(TimerMode::LongBreak),
            _ => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown mode '{s}' (expected work, short-break or long-break)"),
            }),
        }
    }
}

/// Fixed per-mode countdown lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    pub work_ms: u64,
    pub short_break_ms: u64,
    pub long_break_ms: u64,
}

impl TimerDurations {
    pub fn from_minutes(work: u32, short_break: u32, long_break: u32) -> Self {
        let ms = |min: u32| u64::from(min).saturating_mul(60_000);
        Self {
            work_ms: ms(work),
            short_break_ms: ms(short_break),
            long_break_ms: ms(long_break),
        }
    }

    pub fn duration_ms(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_ms,
            TimerMode::ShortBreak => self.short_break_ms,
            TimerMode::LongBreak => self.long_break_ms,
        }
    }
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self::from_minutes(25, 5, 15)
    }
}
