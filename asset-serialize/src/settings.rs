//! Serializer settings and their TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::format::Format;

/// Serializer configuration, usually loaded from an `asset_serializer.toml`.
///
/// Every field has a default, so an empty file is a valid configuration:
///
/// ```toml
/// format = "ron"
/// accept_legacy_ids = true
/// reconcile_stale_ids = true
/// prune_registry = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerSettings {
    /// Encoding used by [`save_asset`](crate::save_asset) and
    /// [`load_asset`](crate::load_asset).
    pub format: Format,
    /// Accept documents that store item ids as a per-item `~Id` member.
    ///
    /// When disabled such documents fail with a type mismatch.
    pub accept_legacy_ids: bool,
    /// Turn ids of keys that disappeared from a live collection into
    /// tombstones when it is serialized.
    pub reconcile_stale_ids: bool,
    /// Drop registry entries of dropped collections on every save and load.
    pub prune_registry: bool,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            format: Format::default(),
            accept_legacy_ids: true,
            reconcile_stale_ids: true,
            prune_registry: true,
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_settings(text: &str) -> Result<SerializerSettings, SettingsError> {
    Ok(toml::from_str(text)?)
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<SerializerSettings, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    let settings = parse_settings(&content)?;
    log::info!(
        "Loaded serializer settings from {}: format {:?}, legacy ids {}",
        path.display(),
        settings.format,
        if settings.accept_legacy_ids { "accepted" } else { "rejected" },
    );
    Ok(settings)
}

/// Load settings, falling back to defaults if the file is missing or invalid.
pub fn load_or_default(path: &Path) -> SerializerSettings {
    match load_settings(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("No serializer settings ({e}), using defaults");
            SerializerSettings::default()
        }
    }
}
