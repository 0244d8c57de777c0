//! Settings loading and validation.
//!
//! Loading flow:
//! 1. Start from serialized [`TallySettings::default()`]
//! 2. Merge the JSON settings file if it exists
//! 3. Merge `TALLY_*` environment variables (highest priority)
//! 4. Extract and [`validate`]
//!
//! Objects merge per key, so a file or variable only overrides what it names.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{TallySettings, tally_home};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TALLY_";

/// Resolve the default settings file (`~/.tally/settings.json`).
pub fn settings_path() -> PathBuf {
    tally_home().join("settings.json")
}

/// Load settings from the default path with env overrides.
pub fn load_settings() -> Result<TallySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific file with env overrides.
///
/// A missing file is not an error: defaults and environment still apply.
/// A file that exists but does not parse is.
pub fn load_settings_from_path(path: &Path) -> Result<TallySettings> {
    let settings: TallySettings = figment_for(path).extract()?;
    validate(&settings)?;
    Ok(settings)
}

/// Build the provider chain for `path`.
///
/// Public so callers can layer extra providers (CLI flags, tests) on top.
pub fn figment_for(path: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(TallySettings::default()));

    if path.exists() {
        debug!(?path, "loading settings from file");
        figment = figment.merge(Json::file(path));
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Check value ranges that serde can't express.
pub fn validate(settings: &TallySettings) -> Result<()> {
    let graph = &settings.graph;
    if !(1..=100).contains(&graph.page_size) {
        return Err(SettingsError::InvalidValue(format!(
            "graph.page_size must be between 1 and 100, got {}",
            graph.page_size
        )));
    }
    if graph.max_pages == 0 {
        return Err(SettingsError::InvalidValue(
            "graph.max_pages must be at least 1".to_string(),
        ));
    }
    if graph.timeout_secs == 0 {
        return Err(SettingsError::InvalidValue(
            "graph.timeout_secs must be at least 1".to_string(),
        ));
    }
    if graph.base_url.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "graph.base_url must not be empty".to_string(),
        ));
    }
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue(
            "database.pool_size must be at least 1".to_string(),
        ));
    }
    let activity = &settings.activity;
    if activity.default_limit == 0 || activity.default_limit > activity.max_limit {
        return Err(SettingsError::InvalidValue(format!(
            "activity.default_limit must be between 1 and activity.max_limit ({}), got {}",
            activity.max_limit, activity.default_limit
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
