//! Entry repository: CRUD for the `entries` table.
//!
//! The unique indexes on `(contest_id, comment_id)` and `(contest_id, number)`
//! back up the lookup-before-insert the reconciler does; a violating insert
//! surfaces as a `StoreError::Sqlite` constraint error.

use rusqlite::{Connection, OptionalExtension, params};
use tally_core::Entry;

use super::number_from_row;
use crate::errors::{Result, StoreError};
use crate::sqlite::now;

/// Entry repository, stateless.
pub struct EntryRepo;

impl EntryRepo {
    /// Entry created for `comment_id` in this contest, if any.
    pub fn find_by_comment(
        conn: &Connection,
        contest_id: i64,
        comment_id: &str,
    ) -> Result<Option<Entry>> {
        let row = conn
            .query_row(
                "SELECT id, contest_id, comment_id, user_name, number, created_at
                 FROM entries WHERE contest_id = ?1 AND comment_id = ?2",
                params![contest_id, comment_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Entry holding `number` in this contest, if any.
    pub fn find_by_number(conn: &Connection, contest_id: i64, number: u64) -> Result<Option<Entry>> {
        // Numbers beyond SQLite's integer range can never have been stored.
        let Ok(number) = i64::try_from(number) else {
            return Ok(None);
        };
        let row = conn
            .query_row(
                "SELECT id, contest_id, comment_id, user_name, number, created_at
                 FROM entries WHERE contest_id = ?1 AND number = ?2",
                params![contest_id, number],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Insert an entry and return the stored row.
    pub fn create(
        conn: &Connection,
        contest_id: i64,
        comment_id: &str,
        user_name: &str,
        number: u64,
    ) -> Result<Entry> {
        let stored = i64::try_from(number).map_err(|_| {
            StoreError::InvalidOperation(format!("number {number} is out of range"))
        })?;
        let created_at = now();
        let _ = conn.execute(
            "INSERT INTO entries (contest_id, comment_id, user_name, number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![contest_id, comment_id, user_name, stored, created_at],
        )?;
        Ok(Entry {
            id: conn.last_insert_rowid(),
            contest_id,
            comment_id: comment_id.to_owned(),
            user_name: user_name.to_owned(),
            number,
            created_at,
        })
    }

    /// All entries for a contest, ordered by number.
    pub fn list_for_contest(conn: &Connection, contest_id: i64) -> Result<Vec<Entry>> {
        let mut stmt = conn.prepare(
            "SELECT id, contest_id, comment_id, user_name, number, created_at
             FROM entries WHERE contest_id = ?1 ORDER BY number ASC",
        )?;
        let rows = stmt
            .query_map(params![contest_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete entries by ID. Returns how many rows were removed.
    pub fn delete_ids(conn: &Connection, ids: &[i64]) -> Result<usize> {
        let mut stmt = conn.prepare("DELETE FROM entries WHERE id = ?1")?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![id])?;
        }
        Ok(deleted)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
        Ok(Entry {
            id: row.get(0)?,
            contest_id: row.get(1)?,
            comment_id: row.get(2)?,
            user_name: row.get(3)?,
            number: number_from_row(row, 4)?,
            created_at: row.get(5)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
