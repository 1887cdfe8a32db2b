//! Configuration summary shown before a download starts

use offpack_core::{
    AppState, Architecture, PackageFormat, SoftwarePackage, TargetSystem, estimate_size,
    format_size,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub selected: usize,
    pub estimated_size: u64,
    pub target_system: TargetSystem,
    pub target_architecture: Architecture,
    pub package_format: PackageFormat,
}

impl DownloadSummary {
    pub fn new(state: &AppState, catalog: &[SoftwarePackage]) -> Self {
        Self {
            selected: state.selected_packages.len(),
            estimated_size: estimate_size(&state.selected_packages, catalog),
            target_system: state.settings.target_system,
            target_architecture: state.settings.target_architecture,
            package_format: state.settings.package_format,
        }
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Selected packages: {}", self.selected)?;
        writeln!(f, "Estimated size:    {}", format_size(self.estimated_size))?;
        writeln!(
            f,
            "Target system:     {} ({})",
            self.target_system, self.target_architecture
        )?;
        write!(f, "Package format:    {}", self.package_format)
    }
}
