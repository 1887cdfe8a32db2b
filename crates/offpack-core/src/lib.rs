//! Core domain models and logic for offpack
//!
//! This crate contains:
//! - Domain models (DownloadSource, DownloadSettings, HistoryEntry, AppState)
//! - The reducer applying actions to the application state
//! - Source form validation and size estimation helpers

#[macro_use]
mod macros;

pub mod error;
pub mod history;
pub mod package;
pub mod settings;
pub mod source;
pub mod state;

pub use error::{CoreError, Result};
pub use history::{HISTORY_LIMIT, HistoryEntry};
pub use package::{DEFAULT_PACKAGE_SIZE, SoftwarePackage, estimate_size, format_size};
pub use settings::{Architecture, DownloadSettings, PackageFormat, SettingsPatch, TargetSystem};
pub use source::{
    DownloadSource, NewSource, SourceDraft, SourcePatch, SourceType, generate_source_id,
};
pub use state::{Action, AppState, Transition};
