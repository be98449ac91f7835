use pomopink_core::{DailyStatsLedger, DailySummary, HabitLedger, NotesStore, TaskStore};

use super::{open_store, print_json, system_clock};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let clock = system_clock();

    let summary = DailySummary::collect(
        &DailyStatsLedger::load(store.clone(), clock.clone())?,
        &TaskStore::load(store.clone())?,
        &NotesStore::load(store.clone())?,
        &HabitLedger::load(store, clock.clone())?,
        clock.as_ref(),
    );
    print_json(&summary)?;
    Ok(())
}
