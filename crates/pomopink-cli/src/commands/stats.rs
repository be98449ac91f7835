use clap::Subcommand;
use pomopink_core::summary::format_focus_time;
use pomopink_core::{DailyStatsLedger, FocusAccumulator};

use super::{open_store, print_json, system_clock};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// Zero today's focused time (the pomodoro count is kept)
    ResetFocus,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = DailyStatsLedger::load(open_store()?, system_clock())?;

    match action {
        StatsAction::Today => {
            let stats = ledger.today();
            print_json(&serde_json::json!({
                "pomodorosCompleted": stats.pomodoros_completed,
                "totalFocusedTimeMs": stats.total_focused_time_ms,
                "focusedTime": format_focus_time(stats.total_focused_time_ms),
            }))?;
        }
        StatsAction::ResetFocus => {
            FocusAccumulator::new().reset_focus_time(&mut ledger)?;
            println!("focused time reset");
        }
    }
    Ok(())
}
