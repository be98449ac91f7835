use std::io::Write;

use pomopink_core::audio::{AudioCueSink, Cue};

/// Audio cues for a terminal: the BEL character for the cues that matter,
/// nothing for the small ones.
pub struct TerminalBell;

impl AudioCueSink for TerminalBell {
    fn play(&self, cue: Cue) {
        let rings = match cue {
            Cue::Pop | Cue::Tick => 0,
            Cue::Chime | Cue::Success => 1,
            Cue::Celebration => 3,
        };
        tracing::trace!(?cue, "audio cue");
        if rings == 0 {
            return;
        }
        let mut err = std::io::stderr();
        let _ = err.write_all("\x07".repeat(rings).as_bytes());
        let _ = err.flush();
    }
}
