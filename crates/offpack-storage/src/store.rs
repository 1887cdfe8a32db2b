//! The application state store
//!
//! Owns the [`AppState`] and is the only way to change it. Every applied
//! transition serializes the full state and hands it to the [`Persister`];
//! persistence failures are logged and never reach the caller.

use offpack_core::{
    Action, AppState, DownloadSource, HistoryEntry, NewSource, SettingsPatch, SourcePatch,
    Transition, generate_source_id,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{KeyValueStore, Persister};

/// Slot holding the serialized state
pub const DEFAULT_STATE_KEY: &str = "downloadState";

pub struct StateStore {
    state: AppState,
    persister: Persister,
}

impl StateStore {
    /// Restore the persisted state, falling back to defaults when the slot is
    /// absent, unreadable or malformed.
    pub async fn open(backend: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let restored = restore(backend.as_ref(), key).await;

        let mut state = AppState::default();
        if let Some(restored) = restored {
            state.apply(Action::LoadState(restored));
        }

        Self {
            state,
            persister: Persister::spawn(backend, key.to_string()),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action and persist the new state if anything changed
    pub fn dispatch(&mut self, action: Action) -> Transition {
        let name = action.name();
        let transition = self.state.apply(action);

        if transition.is_applied() {
            debug!(action = name, "State updated");
            self.persist();
        }

        transition
    }

    /// Append a source under a freshly generated id and return that id
    pub fn add_source(&mut self, source: NewSource) -> String {
        let id = generate_source_id(&self.state.sources);
        self.dispatch(Action::AddSource(DownloadSource::from_new(id.clone(), source)));
        id
    }

    /// Returns false if no source has this id or nothing changed
    pub fn update_source(&mut self, id: &str, patch: SourcePatch) -> bool {
        self.dispatch(Action::UpdateSource {
            id: id.to_string(),
            patch,
        })
        .is_applied()
    }

    /// Returns false if no source has this id
    pub fn delete_source(&mut self, id: &str) -> bool {
        self.dispatch(Action::DeleteSource(id.to_string()))
            .is_applied()
    }

    /// Replace the source list; the caller keeps every entry it wants to keep
    pub fn reorder_sources(&mut self, sources: Vec<DownloadSource>) {
        self.dispatch(Action::ReorderSources(sources));
    }

    /// Move a source to `position` (clamped to the list), keeping all others
    pub fn move_source(&mut self, id: &str, position: usize) -> bool {
        let mut sources = self.state.sources.clone();
        let Some(from) = sources.iter().position(|s| s.id == id) else {
            return false;
        };

        let source = sources.remove(from);
        let to = position.min(sources.len());
        sources.insert(to, source);

        self.dispatch(Action::ReorderSources(sources)).is_applied()
    }

    pub fn select_package(&mut self, package_id: impl Into<String>) {
        self.dispatch(Action::SelectPackage(package_id.into()));
    }

    pub fn deselect_package(&mut self, package_id: &str) {
        self.dispatch(Action::DeselectPackage(package_id.to_string()));
    }

    pub fn select_all_packages(&mut self, package_ids: Vec<String>) {
        self.dispatch(Action::SelectAllPackages(package_ids));
    }

    pub fn deselect_all_packages(&mut self) {
        self.dispatch(Action::DeselectAllPackages);
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.dispatch(Action::UpdateSettings(patch));
    }

    pub fn add_history_entry(&mut self, entry: HistoryEntry) {
        self.dispatch(Action::AddHistoryEntry(entry));
    }

    /// Replace the whole state, meant for restoring a snapshot
    pub fn load_state(&mut self, state: AppState) {
        self.dispatch(Action::LoadState(state));
    }

    /// Wait for the latest snapshot to be written (or to fail)
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Write pending state and stop the background writer
    pub async fn close(self) {
        self.persister.close().await;
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(json) => {
                self.persister.submit(json);
            }
            Err(e) => error!(error = %e, "Failed to serialize state"),
        }
    }
}

async fn restore(backend: &dyn KeyValueStore, key: &str) -> Option<AppState> {
    let json = match backend.get_item(key).await {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!(key, "No saved state, using defaults");
            return None;
        }
        Err(e) => {
            error!(key, error = %e, "Failed to load state from storage");
            return None;
        }
    };

    match serde_json::from_str::<AppState>(&json) {
        Ok(state) => {
            info!(
                sources = state.sources.len(),
                selected = state.selected_packages.len(),
                history = state.download_history.len(),
                "Restored saved state"
            );
            Some(state)
        }
        Err(e) => {
            warn!(key, error = %e, "Saved state is malformed, using defaults");
            None
        }
    }
}
