use clap::Subcommand;
use pomopink_core::audio::{AudioCues, Cue};
use pomopink_core::{ActiveModePublisher, CoreError, HabitLedger, TimerMode};

use super::{open_store, print_json, system_clock};
use crate::bell::TerminalBell;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a tracker
    Create {
        name: String,
        /// Defaults to ✨
        #[arg(long, default_value = "")]
        emoji: String,
    },
    /// List trackers with their win counts
    List {
        #[arg(long)]
        json: bool,
    },
    /// Log a win
    Log {
        id: String,
        /// Mode the win happened in; defaults to the running timer's mode, else work
        #[arg(long)]
        mode: Option<TimerMode>,
        /// Attach a note right away
        #[arg(long)]
        note: Option<String>,
    },
    /// Set or clear (empty text) the note on a win
    Note {
        id: String,
        log_id: String,
        text: String,
    },
    /// Remove one win
    Unlog { id: String, log_id: String },
    /// Delete a tracker and all of its wins
    Delete {
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Change a tracker's emoji
    Emoji { id: String, emoji: String },
    /// Rename a tracker
    Rename { id: String, name: String },
    /// A tracker's wins, newest first
    History {
        id: String,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let clock = system_clock();
    let mut ledger = HabitLedger::load(store.clone(), clock.clone())?;

    match action {
        HabitAction::Create { name, emoji } => {
            let tracker = ledger.create_tracker(&name, &emoji)?;
            println!("{}", tracker.id);
        }
        HabitAction::List { json } => {
            if json {
                print_json(&ledger.trackers())?;
            } else {
                let today = clock.today();
                for t in ledger.trackers() {
                    println!(
                        "{} {}  {} today, {} total  [{}]",
                        t.emoji,
                        t.name,
                        t.wins_on(today),
                        t.total_wins(),
                        t.id
                    );
                }
            }
        }
        HabitAction::Log { id, mode, note } => {
            let mode = match mode {
                Some(mode) => mode,
                None => ActiveModePublisher::current(store.as_ref())?.unwrap_or(TimerMode::Work),
            };
            let log_id = ledger.log_win(&id, mode)?;
            if let Some(note) = note {
                ledger.set_note(&id, &log_id, &note)?;
            }
            AudioCues::load(store, Box::new(TerminalBell))?.play(Cue::Pop);
            println!("{log_id}");
        }
        HabitAction::Note { id, log_id, text } => {
            require(ledger.set_note(&id, &log_id, &text)?, "habit log", &log_id)?;
            println!("ok");
        }
        HabitAction::Unlog { id, log_id } => {
            require(ledger.delete_log(&id, &log_id)?, "habit log", &log_id)?;
            println!("ok");
        }
        HabitAction::Delete { id, yes } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            require(ledger.delete_tracker(&id)?, "habit tracker", &id)?;
            println!("deleted");
        }
        HabitAction::Emoji { id, emoji } => {
            require(ledger.set_emoji(&id, &emoji)?, "habit tracker", &id)?;
            println!("ok");
        }
        HabitAction::Rename { id, name } => {
            require(ledger.rename(&id, &name)?, "habit tracker", &id)?;
            println!("ok");
        }
        HabitAction::History { id, json } => {
            let tracker = ledger
                .tracker(&id)
                .ok_or_else(|| CoreError::not_found("habit tracker", &id))?;
            let history: Vec<_> = tracker.history_newest_first().collect();
            if json {
                print_json(&history)?;
            } else {
                for log in history {
                    let at = pomopink_core::clock::to_datetime(log.timestamp)
                        .with_timezone(&chrono::Local);
                    println!(
                        "{}  {:<10} {}  [{}]",
                        at.format("%Y-%m-%d %H:%M"),
                        log.mode.label(),
                        log.note.as_deref().unwrap_or(""),
                        log.id
                    );
                }
            }
        }
    }
    Ok(())
}

fn require(found: bool, kind: &'static str, id: &str) -> Result<(), CoreError> {
    if found {
        Ok(())
    } else {
        Err(CoreError::not_found(kind, id))
    }
}
