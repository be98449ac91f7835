//! # Pomopink Core Library
//!
//! Core logic for the Pomopink Pomodoro companion. Every operation is
//! available through the standalone CLI binary; the library itself has no
//! UI and performs no sound synthesis.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a wall-clock-anchored countdown. The caller pulses it
//!   periodically; remaining time is always derived from the anchor, so late
//!   or suspended pulses never lose time
//! - **Session**: wires the engine to the focus accumulator, the daily
//!   stats ledger, audio cues and external observers, in event order
//! - **Storage**: a key-value [`PersistentStore`] (SQLite on disk, in-memory
//!   for tests) plus TOML configuration
//! - **Caption**: a rate-limited motivational caption client with
//!   retry-then-fallback semantics
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: countdown state machine
//! - [`Session`]: engine plus ledgers and listeners
//! - [`DailyStatsLedger`]: per-day counters with a day-boundary reset
//! - [`HabitLedger`]: habit trackers and their logged wins
//! - [`CaptionClient`]: caption requests against a [`CaptionTransport`]

pub mod audio;
pub mod caption;
pub mod clock;
pub mod daily_stats;
pub mod error;
pub mod events;
pub mod focus;
pub mod habits;
pub mod notes;
pub mod observer;
pub mod session;
pub mod storage;
pub mod summary;
pub mod tasks;
pub mod timer;

pub use audio::{AudioCueSink, AudioCues, Cue, SilentSink};
pub use caption::{CaptionClient, CaptionError, CaptionTransport, GeminiTransport};
pub use clock::{Clock, ManualClock, SystemClock};
pub use daily_stats::{DailyStats, DailyStatsLedger};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use focus::FocusAccumulator;
pub use habits::{HabitLedger, HabitLog, HabitTracker, NotePrompt};
pub use notes::NotesStore;
pub use observer::{ActiveModePublisher, TimerObserver};
pub use session::Session;
pub use storage::{CaptionConfig, Config, MemoryStore, PersistentStore, SqliteStore, TimerConfig};
pub use summary::DailySummary;
pub use tasks::{SubTask, Task, TaskStore};
pub use timer::{ArmToken, TimerDurations, TimerEngine, TimerMode, TimerState};
