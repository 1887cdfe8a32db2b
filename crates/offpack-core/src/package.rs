//! Software package domain model and size helpers

use serde::{Deserialize, Serialize};

/// Size assumed for a selected package that is not in the catalog (5 MiB)
pub const DEFAULT_PACKAGE_SIZE: u64 = 5 * 1024 * 1024;

/// A package offered by a source.
///
/// Referenced by id only; the source id is not checked against the
/// configured sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwarePackage {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Size in bytes
    pub size: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub source_id: String,
}

/// Estimate the download size of a selection
pub fn estimate_size<'a>(
    selected: impl IntoIterator<Item = &'a String>,
    catalog: &[SoftwarePackage],
) -> u64 {
    selected
        .into_iter()
        .map(|id| {
            catalog
                .iter()
                .find(|pkg| &pkg.id == id)
                .map_or(DEFAULT_PACKAGE_SIZE, |pkg| pkg.size)
        })
        .sum()
}

/// Human readable size, e.g. `1.5 KB` or `10 MB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');

    format!("{} {}", text, UNITS[exponent])
}
