//! Integration tests for the daily stats reset at local midnight.

use std::sync::Arc;

use chrono::NaiveDate;
use pomopink_core::storage::{MemoryStore, PersistentStore};
use pomopink_core::{
    Clock, DailyStatsLedger, ManualClock, Session, SilentSink, SqliteStore, TimerDurations,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
}

#[test]
fn test_countdown_spanning_midnight_credits_the_new_day() {
    let clock = ManualClock::at_local(day(10), 23, 50);
    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
    let mut session = Session::load(
        store.clone(),
        clock_arc.clone(),
        TimerDurations::default(),
        Box::new(SilentSink),
    )
    .unwrap();

    session.start().unwrap();
    clock.advance(5 * 60_000);
    session.pulse().unwrap();
    assert_eq!(session.stats().focused_time_today_ms(), 5 * 60_000);

    // 23:55 -> 00:15 next day; the countdown completes after midnight.
    clock.advance(20 * 60_000);
    session.pulse().unwrap();

    assert_eq!(clock.today(), day(11));
    assert_eq!(session.stats().pomodoros_today(), 1);
    // The flush landing after midnight starts the new day's record.
    assert_eq!(session.stats().focused_time_today_ms(), 20 * 60_000);
}

#[test]
fn test_stale_record_reads_as_zero_without_writing() {
    let clock = ManualClock::at_local(day(10), 12, 0);
    let store = Arc::new(MemoryStore::new());
    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());

    let mut ledger = DailyStatsLedger::load(store.clone(), clock_arc.clone()).unwrap();
    ledger.record_pomodoro_completed().unwrap();
    ledger.add_focused_time(25 * 60_000).unwrap();
    let before = store.get("pomodoro-daily-stats").unwrap();

    clock.set(ManualClock::at_local(day(11), 8, 0).now_ms());
    let reloaded = DailyStatsLedger::load(store.clone(), clock_arc).unwrap();
    assert_eq!(reloaded.pomodoros_today(), 0);
    assert_eq!(reloaded.focused_time_today_ms(), 0);
    assert_eq!(store.get("pomodoro-daily-stats").unwrap(), before);
}

#[test]
fn test_stats_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomopink.db");
    let clock = ManualClock::at_local(day(10), 9, 0);
    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());

    {
        let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open_at(&path).unwrap());
        let mut session =
            Session::load(store, clock_arc.clone(), TimerDurations::default(), Box::new(SilentSink))
                .unwrap();
        session.start().unwrap();
        clock.advance(25 * 60_000);
        session.pulse().unwrap();
    }

    let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open_at(&path).unwrap());
    let ledger = DailyStatsLedger::load(store, clock_arc).unwrap();
    assert_eq!(ledger.pomodoros_today(), 1);
    assert_eq!(ledger.focused_time_today_ms(), 25 * 60_000);
}
