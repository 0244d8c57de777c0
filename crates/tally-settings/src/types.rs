//! Settings sections.
//!
//! Field names are `snake_case` so environment keys map one-to-one
//! (`TALLY_GRAPH__MAX_PAGES` → `graph.max_pages`). Every section is
//! `#[serde(default)]`: a settings file only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallySettings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// `SQLite` database.
    pub database: DatabaseSettings,
    /// Facebook Graph API client.
    pub graph: GraphSettings,
    /// Reconciliation behavior.
    pub reconcile: ReconcileSettings,
    /// Activity log listing.
    pub activity: ActivitySettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the database file.
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: tally_home().join("tally.db").to_string_lossy().into_owned(),
            pool_size: 8,
            busy_timeout_ms: 30_000,
        }
    }
}

/// Graph API client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// API origin, without version.
    pub base_url: String,
    /// Versioned path segment (`v18.0`).
    pub api_version: String,
    /// Comments requested per page (Graph caps this at 100).
    pub page_size: u32,
    /// Most comment pages followed in one fetch.
    pub max_pages: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".to_string(),
            api_version: "v18.0".to_string(),
            page_size: 100,
            max_pages: 50,
            timeout_secs: 30,
            user_agent: concat!("tally/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Reconciliation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Reply to each comment that was assigned a number.
    pub reply_to_assigned: bool,
    /// Reply text; `{number}` and `{name}` are substituted.
    pub reply_template: String,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            reply_to_assigned: false,
            reply_template: "{name}, you're in with number {number}!".to_string(),
        }
    }
}

/// Activity log listing settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySettings {
    /// Rows returned when no limit is requested.
    pub default_limit: u32,
    /// Upper bound on a requested limit.
    pub max_limit: u32,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 500,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// `~/.tally`, falling back to `/tmp/.tally` without a home directory.
pub fn tally_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tally")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let settings = TallySettings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.graph.base_url, "https://graph.facebook.com");
        assert_eq!(settings.graph.api_version, "v18.0");
        assert_eq!(settings.graph.page_size, 100);
        assert_eq!(settings.activity.default_limit, 50);
        assert!(!settings.reconcile.reply_to_assigned);
        assert!(settings.database.path.ends_with("tally.db"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: TallySettings =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.graph.max_pages, 50);
    }

    #[test]
    fn user_agent_carries_version() {
        assert!(GraphSettings::default().user_agent.starts_with("tally/"));
    }
}
