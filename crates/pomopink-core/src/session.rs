//! The session: one timer engine wired to everything that listens to it.
//!
//! Each command runs on the engine, then its events are fanned out one at a
//! time, in emission order. For every event the session first applies its
//! own bookkeeping (focus time, pomodoro count, audio cue) and then notifies
//! subscribed observers, so an observer reading the ledger from a hook sees
//! the event already applied.

use std::sync::Arc;

use crate::audio::{cue_for, AudioCueSink, AudioCues, Cue, FINAL_TICK_SECS};
use crate::clock::Clock;
use crate::daily_stats::DailyStatsLedger;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::focus::FocusAccumulator;
use crate::habits::HabitLedger;
use crate::observer::{notify, TimerObserver};
use crate::storage::PersistentStore;
use crate::timer::{ArmToken, TimerDurations, TimerEngine, TimerMode};

pub struct Session {
    engine: TimerEngine,
    stats: DailyStatsLedger,
    focus: FocusAccumulator,
    habits: HabitLedger,
    audio: AudioCues,
    observers: Vec<Box<dyn TimerObserver>>,
    /// Whole seconds shown after the last command or pulse.
    shown_secs: u64,
}

impl Session {
    /// Load persisted state and create a fresh idle Work countdown.
    pub fn load(
        store: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
        durations: TimerDurations,
        sink: Box<dyn AudioCueSink>,
    ) -> Result<Self> {
        let engine = TimerEngine::new(durations, clock.clone());
        Ok(Self {
            shown_secs: engine.display_secs(),
            engine,
            stats: DailyStatsLedger::load(store.clone(), clock.clone())?,
            focus: FocusAccumulator::new(),
            habits: HabitLedger::load(store.clone(), clock)?,
            audio: AudioCues::load(store, sink)?,
            observers: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) {
        self.observers.push(observer);
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn stats(&self) -> &DailyStatsLedger {
        &self.stats
    }

    pub fn focus(&self) -> &FocusAccumulator {
        &self.focus
    }

    pub fn habits(&self) -> &HabitLedger {
        &self.habits
    }

    pub fn habits_mut(&mut self) -> &mut HabitLedger {
        &mut self.habits
    }

    pub fn audio(&self) -> &AudioCues {
        &self.audio
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.audio.set_muted(muted)
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) -> Result<Vec<Event>> {
        let events = self.engine.start();
        self.dispatch(events)
    }

    pub fn pause(&mut self) -> Result<Vec<Event>> {
        let events = self.engine.pause();
        self.dispatch(events)
    }

    pub fn toggle(&mut self) -> Result<Vec<Event>> {
        let events = self.engine.toggle();
        self.dispatch(events)
    }

    pub fn reset(&mut self) -> Result<Vec<Event>> {
        let events = self.engine.reset();
        self.dispatch(events)
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Result<Vec<Event>> {
        let events = self.engine.switch_mode(mode);
        self.dispatch(events)
    }

    /// Scheduling pulse for the current arming.
    pub fn pulse(&mut self) -> Result<Vec<Event>> {
        let events = self.engine.tick();
        self.dispatch(events)
    }

    /// Scheduling pulse armed for `token`; stale tokens do nothing.
    pub fn pulse_armed(&mut self, token: ArmToken) -> Result<Vec<Event>> {
        let events = self.engine.tick_armed(token);
        self.dispatch(events)
    }

    // ── Ledger commands ──────────────────────────────────────────────

    pub fn reset_focus_time(&mut self) -> Result<()> {
        self.focus.reset_focus_time(&mut self.stats)
    }

    /// Log a win tagged with the mode the timer is in right now.
    pub fn log_win(&mut self, tracker_id: &str) -> Result<String> {
        let log_id = self.habits.log_win(tracker_id, self.engine.mode())?;
        self.audio.play(Cue::Pop);
        Ok(log_id)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Tick once each time a running countdown shows a new second in the
    /// final stretch, however often the pulses arrive.
    fn final_seconds_tick(&mut self) {
        let shown = self.engine.display_secs();
        if self.engine.is_running()
            && shown < self.shown_secs
            && (1..=FINAL_TICK_SECS).contains(&shown)
        {
            self.audio.play(Cue::Tick);
        }
        self.shown_secs = shown;
    }

    /// Apply and forward events in order. Every event reaches every
    /// consumer; the first storage error is returned afterwards.
    fn dispatch(&mut self, events: Vec<Event>) -> Result<Vec<Event>> {
        self.final_seconds_tick();
        let mut first_error: Option<CoreError> = None;

        for event in &events {
            let applied = match event {
                Event::FocusTick { delta_ms, .. } => self.focus.on_tick(*delta_ms, &mut self.stats),
                Event::PomodoroCompleted { .. } => {
                    self.stats.record_pomodoro_completed().map(|count| {
                        tracing::info!(pomodoros_today = count, "pomodoro completed");
                    })
                }
                _ => Ok(()),
            };
            if let Err(e) = applied {
                tracing::warn!(event = event.kind(), error = %e, "failed to persist timer event");
                first_error.get_or_insert(e);
            }

            if let Some(cue) = cue_for(event) {
                self.audio.play(cue);
            }

            for observer in &mut self.observers {
                notify(observer.as_mut(), event);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(events),
        }
    }
}
