mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use offpack_config::Config;
use offpack_storage::{FileStore, KeyValueStore, MemoryStore, StateStore};
use std::sync::Arc;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.log_level.as_deref() {
        Some(level) => tracing_subscriber::EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {level}"))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "offpack", &mut std::io::stdout());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    let backend: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let files = match &config.storage.data_dir {
            Some(dir) => FileStore::new(dir.clone()),
            None => FileStore::open_default(),
        }
        .context("Failed to open state directory")?;
        tracing::debug!(root = %files.root().display(), "Using file store");
        Arc::new(files)
    };

    let mut store = StateStore::open(backend, &config.storage.state_key).await;

    let result = match cli.command {
        Commands::Status => commands::status::handle(&store),
        Commands::Source(cmd) => commands::source::handle(cmd, &mut store).await,
        Commands::Package(cmd) => commands::package::handle(cmd, &mut store),
        Commands::Settings(cmd) => commands::settings::handle(cmd, &mut store),
        Commands::Download { delay_ms } => {
            let step_delay = delay_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| config.download.step_delay());
            commands::download::handle(&mut store, step_delay).await
        }
        Commands::History { limit } => commands::history::handle(&store, limit),
        Commands::Completions { .. } => Ok(()),
    };

    // Pending writes land before the process exits, even on error
    store.close().await;

    result
}
