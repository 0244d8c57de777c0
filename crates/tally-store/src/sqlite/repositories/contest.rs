//! Contest repository: CRUD for the `contests` table.

use rusqlite::{Connection, OptionalExtension, params};
use tally_core::{Contest, ContestSummary};

use crate::errors::Result;
use crate::sqlite::now;

/// Partial update for a contest. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContestUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New external post ID.
    pub post_id: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

impl ContestUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.post_id.is_none() && self.description.is_none()
    }
}

/// Contest repository, stateless.
pub struct ContestRepo;

impl ContestRepo {
    /// Insert a contest and return the stored row.
    pub fn create(
        conn: &Connection,
        name: &str,
        post_id: &str,
        description: Option<&str>,
    ) -> Result<Contest> {
        let created_at = now();
        let _ = conn.execute(
            "INSERT INTO contests (name, post_id, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, post_id, description, created_at],
        )?;
        Ok(Contest {
            id: conn.last_insert_rowid(),
            name: name.to_owned(),
            post_id: post_id.to_owned(),
            description: description.map(str::to_owned),
            created_at,
        })
    }

    /// Get a contest by ID.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Contest>> {
        let row = conn
            .query_row(
                "SELECT id, name, post_id, description, created_at
                 FROM contests WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All contests, newest first, each with its entry count.
    pub fn list_with_counts(conn: &Connection) -> Result<Vec<ContestSummary>> {
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, c.post_id, c.description, c.created_at,
                    (SELECT COUNT(*) FROM entries e WHERE e.contest_id = c.id)
             FROM contests c
             ORDER BY c.created_at DESC, c.id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ContestSummary {
                    contest: Self::map_row(row)?,
                    entry_count: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a partial update. Returns the updated row, or `None` if the
    /// contest does not exist.
    pub fn update(conn: &Connection, id: i64, update: &ContestUpdate) -> Result<Option<Contest>> {
        let Some(mut contest) = Self::get(conn, id)? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(contest));
        }

        if let Some(name) = &update.name {
            contest.name.clone_from(name);
        }
        if let Some(post_id) = &update.post_id {
            contest.post_id.clone_from(post_id);
        }
        if let Some(description) = &update.description {
            contest.description.clone_from(description);
        }

        let _ = conn.execute(
            "UPDATE contests SET name = ?1, post_id = ?2, description = ?3 WHERE id = ?4",
            params![contest.name, contest.post_id, contest.description, id],
        )?;
        Ok(Some(contest))
    }

    /// Delete a contest. Entries go with it; activity rows keep their history
    /// with the contest reference nulled. Returns whether a row was deleted.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM contests WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contest> {
        Ok(Contest {
            id: row.get(0)?,
            name: row.get(1)?,
            post_id: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
