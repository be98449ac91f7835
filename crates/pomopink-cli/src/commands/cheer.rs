use pomopink_core::{CaptionClient, Config, GeminiTransport, TaskStore};

use super::{open_store, system_clock};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = open_store()?;
    let pending = TaskStore::load(store.clone())?.pending_count();

    let transport = GeminiTransport::from_config(&config.caption)?;
    let client = CaptionClient::new(transport, store, system_clock(), &config.caption);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let caption = runtime.block_on(client.request_caption(pending));
    println!("{caption}");
    Ok(())
}
