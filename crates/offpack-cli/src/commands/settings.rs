use anyhow::Result;
use offpack_core::{DownloadSettings, SettingsPatch};
use offpack_storage::StateStore;

use crate::cli::SettingsCommands;

pub fn handle(cmd: SettingsCommands, store: &mut StateStore) -> Result<()> {
    match cmd {
        SettingsCommands::Show => {
            print_settings(&store.state().settings);
            Ok(())
        }
        SettingsCommands::Set {
            target_system,
            system_version,
            arch,
            save_dir,
            analyze_deps,
            auto_pack,
            format,
        } => {
            let patch = SettingsPatch {
                target_system,
                target_system_version: system_version,
                target_architecture: arch,
                save_directory: save_dir,
                analyze_dependencies: analyze_deps,
                auto_pack_after_download: auto_pack,
                package_format: format,
            };

            if patch.is_empty() {
                println!("Nothing to change. See `offpack settings set --help`.");
                return Ok(());
            }

            store.update_settings(patch);
            println!("✓ Settings updated");
            print_settings(&store.state().settings);
            Ok(())
        }
    }
}

pub fn print_settings(settings: &DownloadSettings) {
    let save_directory = if settings.has_save_directory() {
        settings.save_directory.as_str()
    } else {
        "(not set)"
    };

    println!("Settings:");
    println!(
        "  Target system:   {} {}",
        settings.target_system, settings.target_system_version
    );
    println!("  Architecture:    {}", settings.target_architecture);
    println!("  Save directory:  {}", save_directory);
    println!("  Analyze deps:    {}", yes_no(settings.analyze_dependencies));
    println!("  Auto pack:       {}", yes_no(settings.auto_pack_after_download));
    println!("  Package format:  {}", settings.package_format);
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
