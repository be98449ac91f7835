use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use pomopink_core::{ActiveModePublisher, Config, Event, PersistentStore, Session, TimerMode};
use tokio::time::MissedTickBehavior;

use super::{open_store, print_json, system_clock};
use crate::bell::TerminalBell;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one countdown until it completes; Ctrl-C pauses and exits
    Run {
        /// work, short-break or long-break
        #[arg(long, default_value = "work")]
        mode: TimerMode,
        /// Do not draw the countdown on stderr
        #[arg(long)]
        quiet: bool,
    },
    /// Print the configured durations as JSON
    Durations,
    /// Print the mode of a countdown running elsewhere, or "idle"
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    match action {
        TimerAction::Run { mode, quiet } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let store = open_store()?;
            let publisher = ActiveModePublisher::new(store.clone());
            let result = runtime.block_on(run_countdown(&config, store, mode, quiet));
            if let Err(e) = publisher.clear() {
                tracing::warn!(error = %e, "failed to clear active mode");
            }
            result
        }
        TimerAction::Durations => {
            let durations = config.timer.durations();
            let modes: serde_json::Map<String, serde_json::Value> = TimerMode::ALL
                .iter()
                .map(|m| (m.to_string(), durations.duration_ms(*m).into()))
                .collect();
            print_json(&modes)?;
            Ok(())
        }
        TimerAction::Status => {
            match ActiveModePublisher::current(open_store()?.as_ref())? {
                Some(mode) => println!("{mode}"),
                None => println!("idle"),
            }
            Ok(())
        }
    }
}

async fn run_countdown(
    config: &Config,
    store: Arc<dyn PersistentStore>,
    mode: TimerMode,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let publisher = ActiveModePublisher::new(store.clone());
    let mut session = Session::load(
        store,
        system_clock(),
        config.timer.durations(),
        Box::new(TerminalBell),
    )?;
    if mode != session.engine().mode() {
        emit(&session.switch_mode(mode)?)?;
    }
    publisher.publish(mode)?;
    session.subscribe(Box::new(publisher));
    emit(&session.start()?)?;
    let token = session
        .engine()
        .arm_token()
        .ok_or("countdown did not start")?;

    let mut pulses = tokio::time::interval(Duration::from_millis(config.timer.pulse_interval_ms));
    pulses.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown = String::new();
    loop {
        tokio::select! {
            _ = pulses.tick() => {
                let events = session.pulse_armed(token)?;
                if !quiet {
                    draw(&session, &mut shown);
                }
                emit(&events)?;
                if !session.engine().is_running() {
                    break;
                }
            }
            signal = &mut ctrl_c => {
                signal?;
                emit(&session.pause()?)?;
                break;
            }
        }
    }

    if !quiet {
        eprintln!();
    }
    Ok(())
}

/// Print every event except the per-pulse focus ticks.
fn emit(events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        if !matches!(event, Event::FocusTick { .. }) {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}

fn draw(session: &Session, shown: &mut String) {
    let engine = session.engine();
    let line = format!(
        "{} {}  ({})",
        engine.mode().label(),
        engine.display(),
        engine.mode().tagline()
    );
    if *shown != line {
        let mut err = std::io::stderr();
        let _ = write!(err, "\r{line}");
        let _ = err.flush();
        *shown = line;
    }
}
