//! # tally-store
//!
//! `SQLite` persistence for the tally contest reconciler.
//!
//! - **Connection pool**: `r2d2` + `r2d2_sqlite`, created once at startup and
//!   passed explicitly to everything that needs the database
//! - **Migrations**: version-tracked schema embedded at compile time
//! - **Repositories**: stateless structs over `&Connection` for contests,
//!   entries, access tokens and activity logs
//! - **[`ContestStore`]**: pool-owning facade used by the reconciler and the
//!   HTTP layer

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;

pub use errors::{Result, StoreError};
pub use sqlite::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use sqlite::repositories::contest::ContestUpdate;
pub use store::ContestStore;
