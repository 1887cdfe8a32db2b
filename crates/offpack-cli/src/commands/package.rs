use anyhow::Result;
use offpack_core::{estimate_size, format_size};
use offpack_storage::StateStore;

use crate::cli::PackageCommands;

pub fn handle(cmd: PackageCommands, store: &mut StateStore) -> Result<()> {
    match cmd {
        PackageCommands::List => list(store),
        PackageCommands::Select { ids } => {
            for id in ids {
                if store.state().is_selected(&id) {
                    println!("  {} already selected", id);
                } else {
                    println!("✓ Selected {}", id);
                }
                store.select_package(id);
            }
            print_total(store);
            Ok(())
        }
        PackageCommands::Deselect { ids } => {
            for id in ids {
                if store.state().is_selected(&id) {
                    store.deselect_package(&id);
                    println!("✓ Deselected {}", id);
                } else {
                    println!("  {} was not selected", id);
                }
            }
            print_total(store);
            Ok(())
        }
        PackageCommands::Set { ids } => {
            store.select_all_packages(ids);
            println!("✓ Selection replaced");
            print_total(store);
            Ok(())
        }
        PackageCommands::Clear => {
            store.deselect_all_packages();
            println!("✓ Selection cleared");
            Ok(())
        }
    }
}

fn list(store: &StateStore) -> Result<()> {
    let selected = &store.state().selected_packages;

    if selected.is_empty() {
        println!("No packages selected.");
        return Ok(());
    }

    println!("Selected packages:");
    for id in selected {
        println!("  {}", id);
    }
    print_total(store);

    Ok(())
}

fn print_total(store: &StateStore) {
    let selected = &store.state().selected_packages;
    println!(
        "{} package(s) selected, estimated size {}",
        selected.len(),
        format_size(estimate_size(selected, &[]))
    );
}
