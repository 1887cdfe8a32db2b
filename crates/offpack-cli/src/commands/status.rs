use anyhow::Result;
use offpack_engine::DownloadSummary;
use offpack_storage::StateStore;

pub fn handle(store: &StateStore) -> Result<()> {
    let state = store.state();

    let enabled = state.enabled_sources().count();
    println!(
        "Sources: {} configured, {} enabled",
        state.sources.len(),
        enabled
    );
    println!();

    println!("{}", DownloadSummary::new(state, &[]));
    println!();

    super::settings::print_settings(&state.settings);
    println!();

    match state.download_history.first() {
        Some(entry) => {
            let when = entry
                .recorded_at()
                .map(super::format_timestamp)
                .unwrap_or_else(|| entry.timestamp.to_string());
            println!("Last download: {} -> {}", when, entry.output_path);
        }
        None => println!("No downloads yet."),
    }

    Ok(())
}
