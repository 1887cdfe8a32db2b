//! Download settings domain model

use serde::{Deserialize, Serialize};

/// Singleton record governing target platform and packaging behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadSettings {
    pub target_system: TargetSystem,
    pub target_system_version: String,
    pub target_architecture: Architecture,
    /// Empty until the user picks a directory
    pub save_directory: String,
    pub analyze_dependencies: bool,
    pub auto_pack_after_download: bool,
    pub package_format: PackageFormat,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            target_system: TargetSystem::Kylin,
            target_system_version: "10".to_string(),
            target_architecture: Architecture::Arm64,
            save_directory: String::new(),
            analyze_dependencies: true,
            auto_pack_after_download: true,
            package_format: PackageFormat::TarGz,
        }
    }
}

impl DownloadSettings {
    /// Merge a partial update. Returns true if any field changed.
    pub fn merge(&mut self, patch: SettingsPatch) -> bool {
        let before = self.clone();

        if let Some(target_system) = patch.target_system {
            self.target_system = target_system;
        }
        if let Some(version) = patch.target_system_version {
            self.target_system_version = version;
        }
        if let Some(arch) = patch.target_architecture {
            self.target_architecture = arch;
        }
        if let Some(dir) = patch.save_directory {
            self.save_directory = dir;
        }
        if let Some(analyze) = patch.analyze_dependencies {
            self.analyze_dependencies = analyze;
        }
        if let Some(auto_pack) = patch.auto_pack_after_download {
            self.auto_pack_after_download = auto_pack;
        }
        if let Some(format) = patch.package_format {
            self.package_format = format;
        }

        *self != before
    }

    pub fn has_save_directory(&self) -> bool {
        !self.save_directory.trim().is_empty()
    }
}

/// Partial settings update, omitted fields keep their prior value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_system: Option<TargetSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_system_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_architecture: Option<Architecture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyze_dependencies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_pack_after_download: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_format: Option<PackageFormat>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetSystem {
    #[default]
    Kylin,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Architecture {
    #[default]
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "armv7")]
    Armv7,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "x86")]
    X86,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PackageFormat {
    #[default]
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "zip")]
    Zip,
}

impl PackageFormat {
    /// File extension of the packed archive, without the leading dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

string_enum!(TargetSystem, "target system", {
    Kylin => "kylin",
    Other => "other",
});

string_enum!(Architecture, "target architecture", {
    Arm64 => "arm64",
    Armv7 => "armv7",
    X86_64 => "x86_64",
    X86 => "x86",
});

string_enum!(PackageFormat, "package format", {
    TarGz => "tar.gz",
    Zip => "zip",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = DownloadSettings::default();
        assert_eq!(settings.target_system, TargetSystem::Kylin);
        assert_eq!(settings.target_system_version, "10");
        assert_eq!(settings.target_architecture, Architecture::Arm64);
        assert_eq!(settings.package_format, PackageFormat::TarGz);
        assert!(settings.analyze_dependencies);
        assert!(settings.auto_pack_after_download);
        assert!(!settings.has_save_directory());
    }

    #[test]
    fn test_merge_keeps_omitted_fields() {
        let mut settings = DownloadSettings::default();
        let changed = settings.merge(SettingsPatch {
            target_architecture: Some(Architecture::X86_64),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(settings.target_architecture, Architecture::X86_64);
        assert_eq!(settings.package_format, PackageFormat::TarGz);
        assert_eq!(settings.target_system_version, "10");
    }

    #[test]
    fn test_merge_same_value_is_unchanged() {
        let mut settings = DownloadSettings::default();
        assert!(!settings.merge(SettingsPatch {
            target_system: Some(TargetSystem::Kylin),
            ..Default::default()
        }));
    }

    #[test]
    fn test_settings_json_layout() {
        let json = serde_json::to_value(DownloadSettings::default()).unwrap();
        assert_eq!(json["targetArchitecture"], "arm64");
        assert_eq!(json["packageFormat"], "tar.gz");
        assert_eq!(json["autoPackAfterDownload"], true);
    }

    #[test]
    fn test_partial_settings_json_fills_defaults() {
        let settings: DownloadSettings =
            serde_json::from_str(r#"{"targetArchitecture":"x86"}"#).unwrap();
        assert_eq!(settings.target_architecture, Architecture::X86);
        assert_eq!(settings.target_system_version, "10");
    }

    #[test]
    fn test_patch_from_partial_json() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"packageFormat":"zip"}"#).unwrap();
        assert_eq!(patch.package_format, Some(PackageFormat::Zip));
        assert!(patch.target_system.is_none());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("x86_64".parse::<Architecture>().unwrap(), Architecture::X86_64);
        assert_eq!("TAR.GZ".parse::<PackageFormat>().unwrap(), PackageFormat::TarGz);
        assert_eq!(PackageFormat::Zip.extension(), "zip");
        assert!("riscv64".parse::<Architecture>().is_err());
    }
}
