//! Activity log repository: the operator audit trail.

use rusqlite::{Connection, params};
use tally_core::{ActivityKind, ActivityLogEntry};

use crate::errors::Result;
use crate::sqlite::now;

/// Activity log repository, stateless.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Append a row. Returns the new row ID.
    pub fn log(
        conn: &Connection,
        kind: ActivityKind,
        message: &str,
        contest_id: Option<i64>,
        ip_address: Option<&str>,
    ) -> Result<i64> {
        let _ = conn.execute(
            "INSERT INTO activity_logs (kind, message, contest_id, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![kind.as_str(), message, contest_id, ip_address, now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Newest rows first, optionally restricted to one contest.
    pub fn recent(
        conn: &Connection,
        limit: u32,
        contest_id: Option<i64>,
    ) -> Result<Vec<ActivityLogEntry>> {
        let mut stmt = conn.prepare(
            "SELECT a.id, a.kind, a.message, a.contest_id, c.name, a.ip_address, a.created_at
             FROM activity_logs a
             LEFT JOIN contests c ON c.id = a.contest_id
             WHERE ?1 IS NULL OR a.contest_id = ?1
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![contest_id, limit], |row| {
                Ok(ActivityLogEntry {
                    id: row.get(0)?,
                    kind: row.get(1)?,
                    message: row.get(2)?,
                    contest_id: row.get(3)?,
                    contest_name: row.get(4)?,
                    ip_address: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
