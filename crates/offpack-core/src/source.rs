//! Download source domain model

use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// A configured package repository endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSource {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: i32,
}

fn default_enabled() -> bool {
    true
}

impl DownloadSource {
    pub fn from_new(id: String, source: NewSource) -> Self {
        let NewSource {
            name,
            url,
            source_type,
            username,
            password,
            enabled,
            priority,
        } = source;

        Self {
            id,
            name,
            url,
            source_type,
            username,
            password,
            enabled,
            priority,
        }
    }

    /// Merge a patch into this source. Returns true if any field changed.
    pub fn apply_patch(&mut self, patch: SourcePatch) -> bool {
        let before = self.clone();

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(source_type) = patch.source_type {
            self.source_type = source_type;
        }
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(password) = patch.password {
            self.password = password;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }

        *self != before
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }
}

/// Fields of a source before it is assigned an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSource {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub enabled: bool,
    pub priority: i32,
}

/// Partial update of a source. The id is never part of a patch.
///
/// Credentials are tri-state: `None` leaves them alone, `Some(None)` clears
/// them and `Some(Some(value))` replaces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub source_type: Option<SourceType>,
    pub username: Option<Option<String>>,
    pub password: Option<Option<String>>,
    pub enabled: Option<bool>,
    pub priority: Option<i32>,
}

impl SourcePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Apt,
    Yum,
    Dnf,
    Custom,
}

string_enum!(SourceType, "source type", {
    Apt => "apt",
    Yum => "yum",
    Dnf => "dnf",
    Custom => "custom",
});

/// Raw input of the source form, validated before it reaches the store
#[derive(Debug, Clone, Default)]
pub struct SourceDraft {
    pub name: String,
    pub url: String,
    pub source_type: SourceType,
    pub username: String,
    pub password: String,
    pub enabled: bool,
}

impl SourceDraft {
    /// Validate the draft into a new source with the given priority
    pub fn into_new_source(self, priority: i32) -> Result<NewSource> {
        let (name, url, username, password) = self.validated()?;

        Ok(NewSource {
            name,
            url,
            source_type: self.source_type,
            username,
            password,
            enabled: self.enabled,
            priority,
        })
    }

    /// Validate the draft into a patch for an existing source.
    ///
    /// Empty credentials clear the stored ones, priority is left untouched.
    pub fn into_patch(self) -> Result<SourcePatch> {
        let (name, url, username, password) = self.validated()?;

        Ok(SourcePatch {
            name: Some(name),
            url: Some(url),
            source_type: Some(self.source_type),
            username: Some(username),
            password: Some(password),
            enabled: Some(self.enabled),
            priority: None,
        })
    }

    fn validated(&self) -> Result<(String, String, Option<String>, Option<String>)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("source name is required".to_string()));
        }

        let url = self.url.trim();
        if url.is_empty() {
            return Err(CoreError::Validation("source URL is required".to_string()));
        }

        Ok((
            name.to_string(),
            url.to_string(),
            non_empty(&self.username),
            non_empty(&self.password),
        ))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Generate a source id that does not collide with any of `existing`
pub fn generate_source_id(existing: &[DownloadSource]) -> String {
    loop {
        let id = format!("source_{}", uuid::Uuid::new_v4().simple());
        if !existing.iter().any(|s| s.id == id) {
            return id;
        }
    }
}
