//! User-editable sync settings.
//!
//! Settings are persisted as a small JSON blob:
//!
//! ```json
//! { "autoSyncEnabled": true, "syncInterval": 10, "excludedRepos": ["org/private"] }
//! ```
//!
//! Missing keys take their defaults individually. A fractional interval is
//! rounded up to whole minutes. A blob that cannot be parsed, or whose
//! interval is not in `1..=MAX_SYNC_INTERVAL_MINUTES`, is replaced wholesale
//! by [`SyncSettings::default`]; it is logged and never fatal.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::exclusion::ExclusionPolicy;

/// Default minutes between automatic syncs.
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u64 = 10;

/// Longest accepted interval: one week.
pub const MAX_SYNC_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    ConfigurationInvalid(String),

    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sync cadence and repository exclusions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    pub auto_sync_enabled: bool,
    #[serde(rename = "syncInterval", deserialize_with = "deserialize_minutes")]
    pub sync_interval_minutes: u64,
    pub excluded_repos: BTreeSet<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_sync_enabled: true,
            sync_interval_minutes: DEFAULT_SYNC_INTERVAL_MINUTES,
            excluded_repos: BTreeSet::new(),
        }
    }
}

/// Accept any JSON number, rounding up. Negative and NaN saturate to 0 and
/// fail validation.
fn deserialize_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let minutes = f64::deserialize(deserializer)?;
    Ok(minutes.ceil() as u64)
}

impl SyncSettings {
    /// Strictly parse a settings blob.
    pub fn parse_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| SettingsError::ConfigurationInvalid(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a settings blob, falling back to defaults when it is invalid.
    pub fn from_json(json: &str) -> Self {
        Self::parse_json(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid sync settings, using defaults");
            Self::default()
        })
    }

    /// Load settings from `path`. An absent or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::ConfigurationInvalid(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sync_interval_minutes == 0 {
            return Err(SettingsError::ConfigurationInvalid(
                "syncInterval must be greater than zero".to_string(),
            ));
        }
        if self.sync_interval_minutes > MAX_SYNC_INTERVAL_MINUTES {
            return Err(SettingsError::ConfigurationInvalid(format!(
                "syncInterval must be at most {MAX_SYNC_INTERVAL_MINUTES} minutes"
            )));
        }
        Ok(())
    }

    /// Time between automatic syncs.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_minutes.max(1).saturating_mul(60))
    }

    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(self.excluded_repos.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert!(settings.auto_sync_enabled);
        assert_eq!(settings.sync_interval_minutes, 10);
        assert!(settings.excluded_repos.is_empty());
        assert_eq!(settings.interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_parses_full_blob() {
        let settings = SyncSettings::from_json(
            r#"{"autoSyncEnabled": false, "syncInterval": 30, "excludedRepos": ["org/ignored", "me/dotfiles"]}"#,
        );
        assert!(!settings.auto_sync_enabled);
        assert_eq!(settings.sync_interval_minutes, 30);
        assert!(settings.excluded_repos.contains("org/ignored"));
        assert!(settings.exclusion_policy().is_excluded("me/dotfiles"));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings = SyncSettings::from_json(r#"{"excludedRepos": ["org/ignored"]}"#);
        assert!(settings.auto_sync_enabled);
        assert_eq!(settings.sync_interval_minutes, 10);
        assert_eq!(settings.excluded_repos.len(), 1);
    }

    #[test]
    fn test_unparsable_blob_falls_back_to_defaults() {
        assert_eq!(SyncSettings::from_json("{not json"), SyncSettings::default());
        assert_eq!(
            SyncSettings::from_json(r#"{"syncInterval": "often"}"#),
            SyncSettings::default()
        );
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let err = SyncSettings::parse_json(r#"{"syncInterval": 0}"#).unwrap_err();
        assert!(matches!(err, SettingsError::ConfigurationInvalid(_)));
        assert_eq!(
            SyncSettings::from_json(r#"{"syncInterval": 0, "autoSyncEnabled": false}"#),
            SyncSettings::default()
        );
    }

    #[test]
    fn test_oversized_interval_falls_back_to_defaults() {
        let err = SyncSettings::parse_json(r#"{"syncInterval": 400000000000000000}"#).unwrap_err();
        assert!(matches!(err, SettingsError::ConfigurationInvalid(_)));

        let settings = SyncSettings::from_json(r#"{"syncInterval": 400000000000000000}"#);
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(settings.interval(), Duration::from_secs(600));
    }

    #[test]
    fn test_interval_saturates_instead_of_overflowing() {
        let settings = SyncSettings {
            sync_interval_minutes: u64::MAX,
            ..Default::default()
        };
        assert_eq!(settings.interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_fractional_interval_rounds_up() {
        let settings = SyncSettings::from_json(
            r#"{"syncInterval": 2.5, "excludedRepos": ["org/ignored"]}"#,
        );
        assert_eq!(settings.sync_interval_minutes, 3);
        assert!(settings.excluded_repos.contains("org/ignored"));

        let tiny = SyncSettings::from_json(r#"{"syncInterval": 0.1}"#);
        assert_eq!(tiny.sync_interval_minutes, 1);
    }

    #[test]
    fn test_negative_interval_is_invalid() {
        assert!(SyncSettings::parse_json(r#"{"syncInterval": -5}"#).is_err());
    }

    #[test]
    fn test_serializes_with_wire_keys() {
        let json = serde_json::to_value(SyncSettings::default()).unwrap();
        assert_eq!(json["autoSyncEnabled"], true);
        assert_eq!(json["syncInterval"], 10);
        assert_eq!(json["excludedRepos"], serde_json::json!([]));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SyncSettings::load(&dir.path().join("absent.json"));
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = SyncSettings {
            auto_sync_enabled: false,
            sync_interval_minutes: 5,
            excluded_repos: ["org/ignored".to_string()].into(),
        };

        settings.save(&path).unwrap();
        assert_eq!(SyncSettings::load(&path), settings);
    }

    #[test]
    fn test_save_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = SyncSettings {
            sync_interval_minutes: 0,
            ..Default::default()
        };
        assert!(settings.save(&dir.path().join("s.json")).is_err());
    }
}
