use anyhow::Result;
use offpack_core::{DownloadSource, SourceDraft};
use offpack_sources::{ConnectivityCheck, HttpChecker};
use offpack_storage::StateStore;

use crate::cli::SourceCommands;

pub async fn handle(cmd: SourceCommands, store: &mut StateStore) -> Result<()> {
    match cmd {
        SourceCommands::List => list(store),
        SourceCommands::Add {
            name,
            url,
            source_type,
            username,
            password,
            disabled,
        } => {
            let draft = SourceDraft {
                name,
                url,
                source_type,
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
                enabled: !disabled,
            };
            add(store, draft)
        }
        SourceCommands::Edit {
            id,
            name,
            url,
            source_type,
            username,
            password,
            enabled,
        } => {
            let source = store.state().require_source(&id)?;

            // Start from the stored values so only the given flags change
            let draft = SourceDraft {
                name: name.unwrap_or_else(|| source.name.clone()),
                url: url.unwrap_or_else(|| source.url.clone()),
                source_type: source_type.unwrap_or(source.source_type),
                username: username.unwrap_or_else(|| source.username.clone().unwrap_or_default()),
                password: password.unwrap_or_else(|| source.password.clone().unwrap_or_default()),
                enabled: enabled.unwrap_or(source.enabled),
            };
            edit(store, id, draft)
        }
        SourceCommands::Remove { id, force } => remove(store, id, force),
        SourceCommands::Test { target } => test(store, target).await,
        SourceCommands::Move { id, position } => move_to(store, id, position),
    }
}

fn list(store: &StateStore) -> Result<()> {
    let sources = &store.state().sources;

    if sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Sources:");
    for (position, source) in sources.iter().enumerate() {
        print_source(position, source);
    }

    Ok(())
}

fn print_source(position: usize, source: &DownloadSource) {
    let status = if source.enabled { "enabled" } else { "disabled" };
    println!(
        "  {}. {} [{}] ({}, {})",
        position, source.name, source.source_type, status, source.id
    );
    println!("     {}", source.url);
    if source.has_credentials() {
        println!(
            "     Auth: {} / ****",
            source.username.as_deref().unwrap_or("-")
        );
    }
}

fn add(store: &mut StateStore, draft: SourceDraft) -> Result<()> {
    let priority = store.state().sources.len() as i32;
    let source = draft.into_new_source(priority)?;
    let name = source.name.clone();

    let id = store.add_source(source);

    println!("✓ Added source: {}", name);
    println!("  ID: {}", id);

    Ok(())
}

fn edit(store: &mut StateStore, id: String, draft: SourceDraft) -> Result<()> {
    let patch = draft.into_patch()?;

    if store.update_source(&id, patch) {
        println!("✓ Updated source: {}", id);
    } else {
        println!("Source {} unchanged.", id);
    }

    Ok(())
}

fn remove(store: &mut StateStore, id: String, force: bool) -> Result<()> {
    let name = store.state().require_source(&id)?.name.clone();

    if !force && !super::confirm(&format!("Delete source '{}'?", name))? {
        println!("Cancelled.");
        return Ok(());
    }

    store.delete_source(&id);
    println!("✓ Deleted source: {}", name);

    Ok(())
}

async fn test(store: &StateStore, target: String) -> Result<()> {
    let url = match store.state().source(&target) {
        Some(source) => source.url.clone(),
        None => target,
    };

    println!("Testing connection to {}...", url);

    let checker = HttpChecker::new()?;
    let result = checker.check(&url).await?;

    if result.success {
        println!("✓ {}", result.message);
    } else {
        println!("✗ {}", result.message);
    }

    Ok(())
}

fn move_to(store: &mut StateStore, id: String, position: usize) -> Result<()> {
    store.state().require_source(&id)?;

    let moved = store.move_source(&id, position);
    let position = store
        .state()
        .sources
        .iter()
        .position(|s| s.id == id)
        .unwrap_or(position);

    if moved {
        println!("✓ Moved source {} to position {}", id, position);
    } else {
        println!("Source {} already at position {}.", id, position);
    }

    Ok(())
}
