use std::sync::Arc;

use crate::error::Result;
use crate::events::Event;
use crate::storage::{keys, load_json, save_json, PersistentStore};
use crate::timer::TimerMode;

/// External subscriber to timer events.
///
/// Every hook defaults to a no-op, so observers implement only what they
/// care about. Hooks run after the session's own bookkeeping for the same
/// event has been applied.
pub trait TimerObserver: Send {
    /// Called whenever the mode changes, manually or after a completion.
    fn on_mode_change(&mut self, _mode: TimerMode) {}

    /// Focused time since the previous pulse. Work mode only.
    fn on_tick(&mut self, _delta_ms: u64) {}

    /// Called when a Work countdown completes, before the switch to a break.
    fn on_pomodoro_complete(&mut self) {}

    /// Called when any countdown reaches zero, tagged with the mode that ended.
    fn on_countdown_complete(&mut self, _mode: TimerMode) {}
}

/// Route one event to the matching observer hook.
pub fn notify(observer: &mut dyn TimerObserver, event: &Event) {
    match event {
        Event::ModeChanged { mode, .. } => observer.on_mode_change(*mode),
        Event::FocusTick { delta_ms, .. } => observer.on_tick(*delta_ms),
        Event::PomodoroCompleted { .. } => observer.on_pomodoro_complete(),
        Event::CountdownCompleted { mode, .. } => observer.on_countdown_complete(*mode),
        _ => {}
    }
}

/// Mirrors the session's mode into [`keys::ACTIVE_MODE`], so other
/// processes sharing the store can tag their actions with it.
pub struct ActiveModePublisher {
    store: Arc<dyn PersistentStore>,
}

impl ActiveModePublisher {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    pub fn publish(&self, mode: TimerMode) -> Result<()> {
        save_json(self.store.as_ref(), keys::ACTIVE_MODE, &mode)
    }

    /// Forget the published mode once the countdown is gone.
    pub fn clear(&self) -> Result<()> {
        Ok(self.store.remove(keys::ACTIVE_MODE)?)
    }

    /// Mode published by a running countdown, if any.
    pub fn current(store: &dyn PersistentStore) -> Result<Option<TimerMode>> {
        load_json(store, keys::ACTIVE_MODE)
    }
}

impl TimerObserver for ActiveModePublisher {
    fn on_mode_change(&mut self, mode: TimerMode) {
        if let Err(e) = self.publish(mode) {
            tracing::warn!(%mode, error = %e, "failed to publish active mode");
        }
    }
}
