use anyhow::Result;
use offpack_storage::StateStore;

pub fn handle(store: &StateStore, limit: Option<usize>) -> Result<()> {
    let history = &store.state().download_history;

    if history.is_empty() {
        println!("No downloads yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(history.len());
    println!("Download history ({} of {}):", shown.min(history.len()), history.len());

    for entry in history.iter().take(shown) {
        let when = entry
            .recorded_at()
            .map(super::format_timestamp)
            .unwrap_or_else(|| entry.timestamp.to_string());

        println!("  {} ({})", when, entry.id);
        println!("    Packages: {}", entry.package_names.join(", "));
        println!("    Output:   {}", entry.output_path);
    }

    Ok(())
}
