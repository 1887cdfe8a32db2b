use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use offpack_core::{Architecture, PackageFormat, SourceType, TargetSystem};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "offpack")]
#[command(about = "Offline package downloader for Kylin systems", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Keep state in memory only, nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Log filter, overrides RUST_LOG (e.g. "debug", "offpack_storage=trace")
    #[arg(long, global = true, env = "OFFPACK_LOG")]
    pub log_level: Option<String>,

    /// Alternative config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show sources, selection and settings at a glance
    Status,

    /// Manage download sources
    #[command(subcommand)]
    Source(SourceCommands),

    /// Manage the package selection
    #[command(subcommand)]
    Package(PackageCommands),

    /// Show or change download settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Download and pack the selected packages
    Download {
        /// Delay between progress steps in milliseconds (default from config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Show download history
    History {
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SourceCommands {
    /// List all sources
    List,

    /// Add a new source
    Add {
        /// Display name
        name: String,

        /// Repository URL
        url: String,

        /// Repository type (apt, yum, dnf, custom)
        #[arg(long = "type", default_value = "apt")]
        source_type: SourceType,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Add the source disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Edit an existing source
    Edit {
        /// Source ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long = "type")]
        source_type: Option<SourceType>,

        /// Empty string clears the stored username
        #[arg(long)]
        username: Option<String>,

        /// Empty string clears the stored password
        #[arg(long)]
        password: Option<String>,

        #[arg(long, action = ArgAction::Set)]
        enabled: Option<bool>,
    },

    /// Remove a source
    Remove {
        /// Source ID
        id: String,

        /// Skip confirmation
        #[arg(long, short)]
        force: bool,
    },

    /// Check that a source answers over HTTP
    Test {
        /// Source ID or URL
        target: String,
    },

    /// Move a source to a new position (0-based)
    Move {
        /// Source ID
        id: String,

        position: usize,
    },
}

#[derive(Subcommand)]
pub enum PackageCommands {
    /// List selected packages
    List,

    /// Add packages to the selection
    Select {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove packages from the selection
    Deselect {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Replace the selection
    Set {
        ids: Vec<String>,
    },

    /// Clear the selection
    Clear,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change one or more settings
    Set {
        /// kylin or other
        #[arg(long)]
        target_system: Option<TargetSystem>,

        /// Target system version
        #[arg(long)]
        system_version: Option<String>,

        /// arm64, armv7, x86_64 or x86
        #[arg(long)]
        arch: Option<Architecture>,

        /// Directory the packed output is written to
        #[arg(long)]
        save_dir: Option<String>,

        #[arg(long, action = ArgAction::Set)]
        analyze_deps: Option<bool>,

        #[arg(long, action = ArgAction::Set)]
        auto_pack: Option<bool>,

        /// tar.gz or zip
        #[arg(long)]
        format: Option<PackageFormat>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_source_add() {
        let cli = Cli::try_parse_from([
            "offpack",
            "source",
            "add",
            "Mirror",
            "https://mirror.example/kylin",
            "--type",
            "yum",
            "--disabled",
        ])
        .unwrap();

        match cli.command {
            Commands::Source(SourceCommands::Add {
                name,
                source_type,
                disabled,
                ..
            }) => {
                assert_eq!(name, "Mirror");
                assert_eq!(source_type, SourceType::Yum);
                assert!(disabled);
            }
            _ => panic!("expected source add"),
        }
    }

    #[test]
    fn test_parse_settings_set() {
        let cli = Cli::try_parse_from([
            "offpack",
            "--ephemeral",
            "settings",
            "set",
            "--arch",
            "x86_64",
            "--format",
            "zip",
            "--analyze-deps",
            "false",
        ])
        .unwrap();

        assert!(cli.ephemeral);
        match cli.command {
            Commands::Settings(SettingsCommands::Set {
                arch,
                format,
                analyze_deps,
                save_dir,
                ..
            }) => {
                assert_eq!(arch, Some(Architecture::X86_64));
                assert_eq!(format, Some(PackageFormat::Zip));
                assert_eq!(analyze_deps, Some(false));
                assert_eq!(save_dir, None);
            }
            _ => panic!("expected settings set"),
        }
    }

    #[test]
    fn test_unknown_architecture_is_rejected() {
        let result = Cli::try_parse_from(["offpack", "settings", "set", "--arch", "mips"]);
        assert!(result.is_err());
    }
}
