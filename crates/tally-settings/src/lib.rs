//! # tally-settings
//!
//! Layered configuration for the tally server.
//!
//! Settings are merged from three layers (lowest to highest priority):
//! 1. **Compiled defaults**: [`TallySettings::default()`]
//! 2. **Settings file**: `~/.tally/settings.json`, or a path given on the CLI
//! 3. **Environment variables**: `TALLY_*`, with `__` between section and
//!    key (`TALLY_SERVER__PORT=8080`, `TALLY_GRAPH__API_VERSION=v19.0`)
//!
//! The loaded value is validated once and then passed explicitly to the
//! crates that need it; there is no global settings singleton.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{figment_for, load_settings, load_settings_from_path, settings_path, validate};
pub use types::*;
