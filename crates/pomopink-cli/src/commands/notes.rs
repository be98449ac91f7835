use clap::Subcommand;
use pomopink_core::NotesStore;

use super::open_store;

#[derive(Subcommand)]
pub enum NotesAction {
    /// Print the notes
    Show,
    /// Replace the notes
    Set { text: String },
    /// Add a line at the end
    Append { line: String },
    /// Erase the notes
    Clear,
}

pub fn run(action: NotesAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut notes = NotesStore::load(open_store()?)?;

    match action {
        NotesAction::Show => println!("{}", notes.text()),
        NotesAction::Set { text } => notes.set_text(text)?,
        NotesAction::Append { line } => notes.append_line(&line)?,
        NotesAction::Clear => notes.clear()?,
    }
    Ok(())
}
