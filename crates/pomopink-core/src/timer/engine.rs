//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically. Each tick is only a resynchronization: remaining time is
//! always recomputed from the anchor end time, so missed or delayed ticks
//! never make the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle (pause, reset, switch_mode, completion)
//! ```
//!
//! On completion a Work countdown moves to ShortBreak, any break moves to
//! Work. The engine never auto-starts the next countdown.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerDurations::default(), Arc::new(SystemClock));
//! engine.start();
//! // In a loop:
//! let events = engine.tick();
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::mode::{TimerDurations, TimerMode};
use crate::clock::{to_datetime, Clock};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// Identifies one arming of the countdown.
///
/// A pulse scheduled for an earlier arming is ignored by
/// [`TimerEngine::tick_armed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmToken(u64);

/// Core timer engine.
pub struct TimerEngine {
    durations: TimerDurations,
    clock: Arc<dyn Clock>,
    mode: TimerMode,
    state: TimerState,
    /// Remaining time as of the last resynchronization.
    remaining_ms: u64,
    /// Absolute time (ms since epoch) at which the running countdown ends.
    anchor_end_ms: Option<u64>,
    /// Clock reading of the previous pulse, used for focus deltas.
    last_pulse_ms: Option<u64>,
    arm_generation: u64,
}

impl TimerEngine {
    /// Create a new engine in Work mode with the full Work duration, idle.
    pub fn new(durations: TimerDurations, clock: Arc<dyn Clock>) -> Self {
        Self {
            remaining_ms: durations.duration_ms(TimerMode::Work),
            durations,
            clock,
            mode: TimerMode::Work,
            state: TimerState::Idle,
            anchor_end_ms: None,
            last_pulse_ms: None,
            arm_generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn durations(&self) -> TimerDurations {
        self.durations
    }

    pub fn anchor_end_ms(&self) -> Option<u64> {
        self.anchor_end_ms
    }

    /// Remaining time, derived from the anchor while running.
    pub fn remaining_ms(&self) -> u64 {
        match self.anchor_end_ms {
            Some(anchor) if self.is_running() => self
                .remaining_ms
                .min(anchor.saturating_sub(self.clock.now_ms())),
            _ => self.remaining_ms,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.durations.duration_ms(self.mode)
    }

    /// Remaining whole seconds, rounded up so `0` only shows once time is out.
    pub fn display_secs(&self) -> u64 {
        self.remaining_ms().div_ceil(1000)
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        format_mm_ss(self.display_secs())
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms() as f64 / total as f64)
    }

    /// Token of the current arming, `None` while idle.
    pub fn arm_token(&self) -> Option<ArmToken> {
        self.is_running().then_some(ArmToken(self.arm_generation))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            state: self.state,
            remaining_ms: self.remaining_ms(),
            total_ms: self.total_ms(),
            display: self.display(),
            progress: self.progress(),
            at: self.at(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<Event> {
        if self.is_running() || self.remaining_ms == 0 {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let anchor = now.saturating_add(self.remaining_ms);
        self.state = TimerState::Running;
        self.anchor_end_ms = Some(anchor);
        self.last_pulse_ms = Some(now);
        self.arm_generation += 1;
        tracing::debug!(mode = %self.mode, remaining_ms = self.remaining_ms, "countdown started");
        vec![Event::TimerStarted {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
            anchor_end_ms: anchor,
            at: self.at(),
        }]
    }

    /// Freeze the countdown. The next `start()` anchors from the frozen
    /// remaining time.
    pub fn pause(&mut self) -> Vec<Event> {
        if !self.is_running() {
            return Vec::new();
        }
        let mut events = self.pulse();
        if !self.is_running() {
            // Time ran out before the pause landed.
            return events;
        }
        self.stop();
        events.push(Event::TimerPaused {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
            at: self.at(),
        });
        events
    }

    /// Start when idle, pause when running.
    pub fn toggle(&mut self) -> Vec<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self.resync().into_iter().collect();
        self.stop();
        self.remaining_ms = self.total_ms();
        events.push(Event::TimerReset {
            mode: self.mode,
            remaining_ms: self.remaining_ms,
            at: self.at(),
        });
        events
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Vec<Event> {
        let mut events: Vec<Event> = self.resync().into_iter().collect();
        self.stop();
        events.push(self.enter_mode(mode, false));
        events
    }

    /// Scheduling pulse for whatever arming is current.
    pub fn tick(&mut self) -> Vec<Event> {
        match self.arm_token() {
            Some(token) => self.tick_armed(token),
            None => Vec::new(),
        }
    }

    /// Scheduling pulse armed for `token`. Stale tokens are ignored.
    pub fn tick_armed(&mut self, token: ArmToken) -> Vec<Event> {
        if self.arm_token() != Some(token) {
            return Vec::new();
        }
        self.pulse()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn pulse(&mut self) -> Vec<Event> {
        let mut events: Vec<Event> = self.resync().into_iter().collect();
        if self.is_running() && self.remaining_ms == 0 {
            events.extend(self.complete());
        }
        events
    }

    /// Recompute remaining time from the anchor and report the Work delta
    /// since the previous pulse.
    fn resync(&mut self) -> Option<Event> {
        let anchor = self.anchor_end_ms.filter(|_| self.is_running())?;
        let now = self.clock.now_ms();
        let effective = now.min(anchor);
        let last = self.last_pulse_ms.unwrap_or(effective);

        self.remaining_ms = self.remaining_ms.min(anchor.saturating_sub(now));
        self.last_pulse_ms = Some(last.max(effective));

        let delta_ms = effective.saturating_sub(last);
        (self.mode == TimerMode::Work && delta_ms > 0).then(|| Event::FocusTick {
            delta_ms,
            at: self.at(),
        })
    }

    fn complete(&mut self) -> Vec<Event> {
        let ended = self.mode;
        self.stop();
        let at = self.at();
        tracing::debug!(mode = %ended, "countdown completed");

        let mut events = vec![Event::CountdownCompleted { mode: ended, at }];
        let next = match ended {
            TimerMode::Work => {
                events.push(Event::PomodoroCompleted { at });
                TimerMode::ShortBreak
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
        };
        events.push(self.enter_mode(next, true));
        events
    }

    fn enter_mode(&mut self, mode: TimerMode, automatic: bool) -> Event {
        let previous = self.mode;
        self.mode = mode;
        self.remaining_ms = self.durations.duration_ms(mode);
        Event::ModeChanged {
            mode,
            previous,
            automatic,
            remaining_ms: self.remaining_ms,
            at: self.at(),
        }
    }

    fn stop(&mut self) {
        self.state = TimerState::Idle;
        self.anchor_end_ms = None;
        self.last_pulse_ms = None;
    }

    fn at(&self) -> chrono::DateTime<chrono::Utc> {
        to_datetime(self.clock.now_ms())
    }
}

/// Format whole seconds as `mm:ss`; minutes are not wrapped into hours.
pub fn format_mm_ss(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const WORK_MS: u64 = 1_500_000;

    fn engine() -> (TimerEngine, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let engine = TimerEngine::new(TimerDurations::default(), Arc::new(clock.clone()));
        (engine, clock)
    }

    fn focus_total(events: &[Event]) -> u64 {
        events
            .iter()
            .map(|e| match e {
                Event::FocusTick { delta_ms, .. } => *delta_ms,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn new_engine_is_idle_work_with_full_duration() {
        let (engine, _) = engine();
        assert_eq!(engine.mode(), TimerMode::Work);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), WORK_MS);
        assert!(engine.anchor_end_ms().is_none());
        assert_eq!(engine.display(), "25:00");
    }

    #[test]
    fn start_anchors_end_time() {
        let (mut engine, clock) = engine();
        let events = engine.start();
        assert!(matches!(events.as_slice(), [Event::TimerStarted { .. }]));
        assert_eq!(engine.anchor_end_ms(), Some(clock.now_ms() + WORK_MS));
        assert!(engine.start().is_empty(), "double start is a no-op");
    }

    #[test]
    fn pause_when_idle_is_noop() {
        let (mut engine, _) = engine();
        assert!(engine.pause().is_empty());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn pause_freezes_and_resume_reanchors_from_frozen_value() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(60_000);
        let events = engine.pause();
        assert!(matches!(events.last(), Some(Event::TimerPaused { remaining_ms, .. }) if *remaining_ms == WORK_MS - 60_000));
        assert!(engine.anchor_end_ms().is_none());

        clock.advance(10 * 60 * 60 * 1000);
        assert_eq!(engine.remaining_ms(), WORK_MS - 60_000);

        engine.start();
        assert_eq!(engine.remaining_ms(), WORK_MS - 60_000);
        assert_eq!(engine.anchor_end_ms(), Some(clock.now_ms() + WORK_MS - 60_000));
    }

    #[test]
    fn suspension_is_absorbed_by_single_pulse() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(700_000);
        let events = engine.tick();
        assert_eq!(focus_total(&events), 700_000);
        assert_eq!(engine.remaining_ms(), WORK_MS - 700_000);
    }

    #[test]
    fn work_completion_moves_to_short_break_idle() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(WORK_MS);
        let events = engine.tick();

        let kinds: Vec<&str> = events.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            ["FocusTick", "CountdownCompleted", "PomodoroCompleted", "ModeChanged"]
        );
        assert!(matches!(events[1], Event::CountdownCompleted { mode: TimerMode::Work, .. }));
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 300_000);
    }

    #[test]
    fn break_completion_moves_to_work_without_pomodoro() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::LongBreak);
        engine.start();
        clock.advance(900_000 + 250);
        let events = engine.tick();
        assert!(!events.iter().any(|e| matches!(e, Event::PomodoroCompleted { .. })));
        assert_eq!(focus_total(&events), 0, "breaks report no focus");
        assert_eq!(engine.mode(), TimerMode::Work);
        assert!(!engine.is_running());
    }

    #[test]
    fn overshoot_reports_delta_only_up_to_anchor() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(WORK_MS + 45_000);
        assert_eq!(focus_total(&engine.tick()), WORK_MS);
    }

    #[test]
    fn reset_restores_full_duration_and_stops() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(5_000);
        let events = engine.reset();
        assert_eq!(focus_total(&events), 5_000);
        assert_eq!(engine.remaining_ms(), WORK_MS);
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn switch_mode_cancels_pending_completion() {
        let (mut engine, clock) = engine();
        engine.start();
        let stale = engine.arm_token().unwrap();
        clock.advance(1_000);
        engine.switch_mode(TimerMode::ShortBreak);
        engine.start();
        clock.advance(WORK_MS);
        assert!(engine.tick_armed(stale).is_empty());
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn stale_token_after_pause_resume_is_ignored() {
        let (mut engine, clock) = engine();
        engine.start();
        let first = engine.arm_token().unwrap();
        engine.pause();
        engine.start();
        clock.advance(2_000);
        assert!(engine.tick_armed(first).is_empty());
        assert!(!engine.tick().is_empty());
    }

    #[test]
    fn display_rounds_up_to_whole_seconds() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(WORK_MS - 400);
        engine.tick();
        assert_eq!(engine.display_secs(), 1);
        assert_eq!(engine.display(), "00:01");
        clock.advance(300);
        assert_eq!(engine.display(), "00:01");
    }

    #[test]
    fn pause_after_time_ran_out_completes_instead() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(WORK_MS + 1);
        let events = engine.pause();
        assert!(events.iter().any(|e| matches!(e, Event::PomodoroCompleted { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::TimerPaused { .. })));
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn remaining_never_increases_when_clock_steps_back() {
        let (mut engine, clock) = engine();
        engine.start();
        clock.advance(10_000);
        engine.tick();
        let before = engine.remaining_ms();
        clock.set(clock.now_ms() - 5_000);
        engine.tick();
        assert!(engine.remaining_ms() <= before);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (engine, _) = engine();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                mode,
                remaining_ms,
                display,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(mode, TimerMode::Work);
                assert_eq!(remaining_ms, WORK_MS);
                assert_eq!(display, "25:00");
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn format_mm_ss_pads() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(65), "01:05");
        assert_eq!(format_mm_ss(90 * 60), "90:00");
    }
}
