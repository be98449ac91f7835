//! Focus-time accumulation.
//!
//! Sums the per-pulse Work deltas reported by the engine into the daily
//! ledger. Deltas, not totals, are summed, so the result does not depend on
//! how often or how regularly pulses arrive; paused periods report nothing.

use crate::daily_stats::DailyStatsLedger;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct FocusAccumulator {
    session_focus_ms: u64,
}

impl FocusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus accumulated by this process since creation or the last reset.
    pub fn session_focus_ms(&self) -> u64 {
        self.session_focus_ms
    }

    pub fn on_tick(&mut self, delta_ms: u64, ledger: &mut DailyStatsLedger) -> Result<()> {
        if delta_ms == 0 {
            return Ok(());
        }
        self.session_focus_ms = self.session_focus_ms.saturating_add(delta_ms);
        ledger.add_focused_time(delta_ms)?;
        Ok(())
    }

    pub fn reset_focus_time(&mut self, ledger: &mut DailyStatsLedger) -> Result<()> {
        self.session_focus_ms = 0;
        ledger.reset_focus_time()
    }
}
