use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerState};

/// Every timer state change produces an Event.
///
/// Engine commands return their events in emission order. On completion of a
/// Work countdown the order is always `FocusTick` (final delta, if any),
/// `CountdownCompleted`, `PomodoroCompleted`, `ModeChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_ms: u64,
        anchor_end_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Focused time elapsed since the previous pulse. Work mode only.
    FocusTick {
        delta_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownCompleted {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// A Work countdown ran to zero.
    PomodoroCompleted {
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        previous: TimerMode,
        /// True when caused by a completion rather than the user.
        automatic: bool,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        state: TimerState,
        remaining_ms: u64,
        total_ms: u64,
        display: String,
        progress: f64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Variant name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerReset { .. } => "TimerReset",
            Event::FocusTick { .. } => "FocusTick",
            Event::CountdownCompleted { .. } => "CountdownCompleted",
            Event::PomodoroCompleted { .. } => "PomodoroCompleted",
            Event::ModeChanged { .. } => "ModeChanged",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tag_matches_kind() {
        let event = Event::CountdownCompleted {
            mode: TimerMode::Work,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["mode"], "work");
    }
}
