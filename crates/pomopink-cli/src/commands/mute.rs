use pomopink_core::{AudioCues, SilentSink};

use super::open_store;

pub fn run(state: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut cues = AudioCues::load(open_store()?, Box::new(SilentSink))?;
    let muted = match state {
        Some("on") => true,
        Some("off") => false,
        _ => !cues.is_muted(),
    };
    cues.set_muted(muted)?;
    println!("{}", if muted { "muted" } else { "unmuted" });
    Ok(())
}
