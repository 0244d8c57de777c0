//! Access token repository.
//!
//! Tokens are append-only; the newest row wins.

use rusqlite::{Connection, OptionalExtension, params};
use tally_core::AccessToken;

use crate::errors::Result;
use crate::sqlite::now;

/// Access token repository, stateless.
pub struct TokenRepo;

impl TokenRepo {
    /// Store a token and return the stored row.
    pub fn save(
        conn: &Connection,
        token_type: &str,
        token: &str,
        expires_at: Option<&str>,
    ) -> Result<AccessToken> {
        let created_at = now();
        let _ = conn.execute(
            "INSERT INTO access_tokens (token_type, token, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![token_type, token, expires_at, created_at],
        )?;
        Ok(AccessToken {
            id: conn.last_insert_rowid(),
            token_type: token_type.to_owned(),
            token: token.to_owned(),
            expires_at: expires_at.map(str::to_owned),
            created_at,
        })
    }

    /// The most recently created token, if any.
    pub fn latest(conn: &Connection) -> Result<Option<AccessToken>> {
        let row = conn
            .query_row(
                "SELECT id, token_type, token, expires_at, created_at
                 FROM access_tokens
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1",
                [],
                |row| {
                    Ok(AccessToken {
                        id: row.get(0)?,
                        token_type: row.get(1)?,
                        token: row.get(2)?,
                        expires_at: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
