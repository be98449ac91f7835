//! Audio cue contract.
//!
//! Sound synthesis lives outside the core. The core only decides *which*
//! cue an event deserves and hands it to an [`AudioCueSink`], gated by the
//! persisted mute flag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::Event;
use crate::storage::{keys, load_json, save_json, PersistentStore};
use crate::timer::TimerMode;

/// Countdown seconds that get a tick cue as a running timer nears zero.
pub const FINAL_TICK_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Pop,
    Tick,
    Success,
    Chime,
    Celebration,
}

/// Fire-and-forget cue player. Implementations must return promptly and
/// swallow their own failures.
pub trait AudioCueSink: Send {
    fn play(&self, cue: Cue);
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AudioCueSink for SilentSink {
    fn play(&self, _cue: Cue) {}
}

/// Cue chosen for a timer event, if any.
pub fn cue_for(event: &Event) -> Option<Cue> {
    match event {
        Event::TimerStarted { .. } | Event::TimerPaused { .. } => Some(Cue::Pop),
        Event::TimerReset { .. } => Some(Cue::Chime),
        Event::ModeChanged { automatic: false, .. } => Some(Cue::Chime),
        Event::CountdownCompleted { mode: TimerMode::Work, .. } => Some(Cue::Celebration),
        Event::CountdownCompleted { .. } => Some(Cue::Success),
        _ => None,
    }
}

/// A sink plus the global mute flag.
pub struct AudioCues {
    sink: Box<dyn AudioCueSink>,
    store: Arc<dyn PersistentStore>,
    muted: bool,
}

impl AudioCues {
    pub fn load(store: Arc<dyn PersistentStore>, sink: Box<dyn AudioCueSink>) -> Result<Self> {
        let muted = load_json(store.as_ref(), keys::MUTED)?.unwrap_or(false);
        Ok(Self { sink, store, muted })
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.muted = muted;
        save_json(self.store.as_ref(), keys::MUTED, &muted)
    }

    pub fn play(&self, cue: Cue) {
        if !self.muted {
            self.sink.play(cue);
        }
    }
}
