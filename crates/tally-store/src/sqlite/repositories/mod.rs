//! Repository structs over `&Connection`.
//!
//! Each repository is a unit struct with associated functions; callers pick
//! the connection (pooled or inside a transaction) and the repository runs
//! the SQL.

pub mod activity;
pub mod contest;
pub mod entry;
pub mod token;

pub use activity::ActivityRepo;
pub use contest::{ContestRepo, ContestUpdate};
pub use entry::EntryRepo;
pub use token::TokenRepo;

/// Convert a stored `INTEGER` number column into the domain's `u64`.
pub(crate) fn number_from_row(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}
