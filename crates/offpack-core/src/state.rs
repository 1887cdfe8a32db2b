//! Application state aggregate and the reducer applying actions to it

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
    CoreError, DownloadSettings, DownloadSource, HISTORY_LIMIT, HistoryEntry, Result,
    SettingsPatch, SourcePatch,
};

/// Aggregate root: sources, selection, settings and history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    /// Insertion order, not priority order
    pub sources: Vec<DownloadSource>,
    /// Unique ids in the order they were picked
    pub selected_packages: IndexSet<String>,
    pub settings: DownloadSettings,
    /// Newest first, at most [`HISTORY_LIMIT`] entries
    pub download_history: Vec<HistoryEntry>,
}

/// A state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddSource(DownloadSource),
    UpdateSource { id: String, patch: SourcePatch },
    DeleteSource(String),
    ReorderSources(Vec<DownloadSource>),
    SelectPackage(String),
    DeselectPackage(String),
    SelectAllPackages(Vec<String>),
    DeselectAllPackages,
    UpdateSettings(SettingsPatch),
    AddHistoryEntry(HistoryEntry),
    LoadState(AppState),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddSource(_) => "add_source",
            Self::UpdateSource { .. } => "update_source",
            Self::DeleteSource(_) => "delete_source",
            Self::ReorderSources(_) => "reorder_sources",
            Self::SelectPackage(_) => "select_package",
            Self::DeselectPackage(_) => "deselect_package",
            Self::SelectAllPackages(_) => "select_all_packages",
            Self::DeselectAllPackages => "deselect_all_packages",
            Self::UpdateSettings(_) => "update_settings",
            Self::AddHistoryEntry(_) => "add_history_entry",
            Self::LoadState(_) => "load_state",
        }
    }
}

/// Outcome of applying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Unchanged,
}

impl Transition {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    fn from_changed(changed: bool) -> Self {
        if changed { Self::Applied } else { Self::Unchanged }
    }
}

impl AppState {
    /// Apply one action. Either the whole transition happens or nothing changes.
    pub fn apply(&mut self, action: Action) -> Transition {
        let changed = match action {
            Action::AddSource(source) => {
                if self.source(&source.id).is_some() {
                    false
                } else {
                    self.sources.push(source);
                    true
                }
            }

            Action::UpdateSource { id, patch } => self
                .sources
                .iter_mut()
                .find(|s| s.id == id)
                .is_some_and(|source| source.apply_patch(patch)),

            Action::DeleteSource(id) => {
                let before = self.sources.len();
                self.sources.retain(|s| s.id != id);
                self.sources.len() != before
            }

            Action::ReorderSources(sources) => {
                let changed = self.sources != sources;
                self.sources = sources;
                changed
            }

            Action::SelectPackage(id) => self.selected_packages.insert(id),

            Action::DeselectPackage(id) => self.selected_packages.shift_remove(&id),

            Action::SelectAllPackages(ids) => {
                let ids = ids.into_iter().collect::<IndexSet<_>>();
                let changed = !same_order(&self.selected_packages, &ids);
                self.selected_packages = ids;
                changed
            }

            Action::DeselectAllPackages => {
                let changed = !self.selected_packages.is_empty();
                self.selected_packages.clear();
                changed
            }

            Action::UpdateSettings(patch) => self.settings.merge(patch),

            Action::AddHistoryEntry(entry) => {
                self.download_history.insert(0, entry);
                self.download_history.truncate(HISTORY_LIMIT);
                true
            }

            Action::LoadState(mut state) => {
                state.normalize();
                let changed = *self != state
                    || !same_order(&self.selected_packages, &state.selected_packages);
                *self = state;
                changed
            }
        };

        Transition::from_changed(changed)
    }

    pub fn source(&self, id: &str) -> Option<&DownloadSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Like [`AppState::source`], for callers that need the source to exist
    pub fn require_source(&self, id: &str) -> Result<&DownloadSource> {
        self.source(id)
            .ok_or_else(|| CoreError::SourceNotFound(id.to_string()))
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &DownloadSource> {
        self.sources.iter().filter(|s| s.enabled)
    }

    pub fn is_selected(&self, package_id: &str) -> bool {
        self.selected_packages.contains(package_id)
    }

    /// Enforce the history cap on state that did not go through the reducer
    pub fn normalize(&mut self) {
        self.download_history.truncate(HISTORY_LIMIT);
    }
}

/// `IndexSet` equality ignores order, the selection order matters here
fn same_order(a: &IndexSet<String>, b: &IndexSet<String>) -> bool {
    a.iter().eq(b.iter())
}
