mod engine;
mod mode;

pub use engine::{format_mm_ss, ArmToken, TimerEngine, TimerState};
pub use mode::{TimerDurations, TimerMode};
