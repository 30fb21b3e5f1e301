//! Persisted widget configuration.
//!
//! This module provides a tiny JSON-backed store that records the widget's
//! configuration: the selected data source and the data version it was
//! written with. The file lives in the standard configuration directory
//! (`~/.config/listpeek/preferences.json` on most platforms) and is safe to
//! read/write from multiple threads thanks to the internal `Mutex`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config_file_path;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "LISTPEEK_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Version stamped into every payload this build writes.
pub const DATA_VERSION: &str = "1.0";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    #[serde(default = "default_data_version")]
    pub data_version: String,
    /// Identifier of the data source chosen on the configuration surface.
    #[serde(default)]
    pub selected_source: Option<String>,
}

impl Default for PreferencesPayload {
    fn default() -> Self {
        Self {
            data_version: default_data_version(),
            selected_source: None,
        }
    }
}

fn default_data_version() -> String {
    DATA_VERSION.to_string()
}

/// Thread-safe preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct WidgetPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl WidgetPreferences {
    /// Open the store at the default location (or [`PREFERENCES_PATH_ENV`]).
    pub fn new() -> Result<Self, PreferencesError> {
        Self::at_path(config_file_path(PREFERENCES_PATH_ENV, PREFERENCES_FILE_NAME))
    }

    /// Open the store at an explicit path. A missing file yields defaults.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let resolved_path = path.into();
        let payload = load_payload(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_persistent(&self) -> bool {
        self.persist_to_disk
    }

    /// Returns the persisted data source identifier, if one was saved.
    pub fn selected_source(&self) -> Option<String> {
        self.payload.lock().expect("preferences lock poisoned").selected_source.clone()
    }

    /// Persist a new data source identifier. The in-memory value is updated
    /// even when writing to disk fails.
    pub fn set_selected_source(&self, identifier: Option<String>) -> Result<(), PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        payload.selected_source = identifier;
        payload.data_version = default_data_version();
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<PreferencesPayload>(&data) {
            Ok(payload) => {
                if payload.data_version != DATA_VERSION {
                    warn!(
                        path = %path.display(),
                        found = %payload.data_version,
                        expected = DATA_VERSION,
                        "Preferences written by a different data version; it will be rewritten on next save"
                    );
                }
                Ok(payload)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let preferences = WidgetPreferences::at_path(dir.path().join("preferences.json")).expect("open");
        assert_eq!(preferences.selected_source(), None);
        assert_eq!(preferences.payload.lock().unwrap().data_version, DATA_VERSION);
    }

    #[test]
    fn selected_source_round_trips_through_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("preferences.json");
        let preferences = WidgetPreferences::at_path(&path).expect("open");
        preferences.set_selected_source(Some("FAQ".into())).expect("save");

        let reopened = WidgetPreferences::at_path(&path).expect("reopen");
        assert_eq!(reopened.selected_source().as_deref(), Some("FAQ"));
        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"data_version\": \"1.0\""));
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").expect("write");
        let preferences = WidgetPreferences::at_path(&path).expect("open");
        assert_eq!(preferences.selected_source(), None);
    }

    #[test]
    fn older_payload_without_version_is_accepted() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"selected_source":"Announcements"}"#).expect("write");
        let preferences = WidgetPreferences::at_path(&path).expect("open");
        assert_eq!(preferences.selected_source().as_deref(), Some("Announcements"));
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let preferences = WidgetPreferences::ephemeral();
        preferences.set_selected_source(Some("FAQ".into())).expect("set");
        assert_eq!(preferences.selected_source().as_deref(), Some("FAQ"));
        assert!(!preferences.is_persistent());
    }

    #[test]
    fn env_override_controls_default_location() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("custom.json");
        temp_env::with_var(PREFERENCES_PATH_ENV, Some(path.to_str().expect("utf8 path")), || {
            let preferences = WidgetPreferences::new().expect("open");
            assert_eq!(preferences.path(), path.as_path());
        });
    }
}
