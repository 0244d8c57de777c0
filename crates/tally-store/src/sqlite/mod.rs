//! `SQLite` backend.
//!
//! - **[`connection`]**: `r2d2` pool with WAL mode, foreign keys and a busy
//!   timeout applied to every connection.
//! - **[`migrations`]**: version-tracked schema evolution, each migration in
//!   its own transaction.
//! - **[`repositories`]**: stateless repository structs; each method takes
//!   `&Connection` and executes SQL.

pub mod connection;
pub mod migrations;
pub mod repositories;

pub use connection::{
    ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory,
};
pub use migrations::{current_version, latest_version, run_migrations};

/// Current time as fixed-width RFC 3339 (`2025-01-01T00:00:00.000000Z`).
///
/// Every timestamp column uses this format so text order is time order.
pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
