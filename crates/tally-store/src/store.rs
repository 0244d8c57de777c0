//! [`ContestStore`]: the pool-owning facade over all repositories.
//!
//! Each method checks out one connection, runs the repository call and
//! returns it to the pool. Multi-row writes run inside a transaction.

use tally_core::{AccessToken, ActivityKind, ActivityLogEntry, Contest, ContestSummary, Entry};
use tracing::debug;

use crate::errors::Result;
use crate::sqlite::repositories::{ActivityRepo, ContestRepo, ContestUpdate, EntryRepo, TokenRepo};
use crate::sqlite::{ConnectionPool, PooledConnection, run_migrations};

/// Persistence facade shared by the reconciler and the HTTP layer.
///
/// Cheap to clone: clones share the same pool.
#[derive(Clone)]
pub struct ContestStore {
    pool: ConnectionPool,
}

impl ContestStore {
    /// Wrap a pool without touching the schema.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Wrap a pool and bring the schema up to date.
    pub fn open(pool: ConnectionPool) -> Result<Self> {
        let store = Self::new(pool);
        let applied = run_migrations(&*store.conn()?)?;
        debug!(applied, "store opened");
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ── Contests ─────────────────────────────────────────────────────────

    /// Create a contest.
    pub fn create_contest(
        &self,
        name: &str,
        post_id: &str,
        description: Option<&str>,
    ) -> Result<Contest> {
        ContestRepo::create(&*self.conn()?, name, post_id, description)
    }

    /// Look up a contest by ID.
    pub fn find_contest(&self, id: i64) -> Result<Option<Contest>> {
        ContestRepo::get(&*self.conn()?, id)
    }

    /// All contests, newest first, with entry counts.
    pub fn list_contests(&self) -> Result<Vec<ContestSummary>> {
        ContestRepo::list_with_counts(&*self.conn()?)
    }

    /// Partially update a contest. `None` if it does not exist.
    pub fn update_contest(&self, id: i64, update: &ContestUpdate) -> Result<Option<Contest>> {
        ContestRepo::update(&*self.conn()?, id, update)
    }

    /// Delete a contest and its entries.
    pub fn delete_contest(&self, id: i64) -> Result<bool> {
        ContestRepo::delete(&*self.conn()?, id)
    }

    // ── Entries ──────────────────────────────────────────────────────────

    /// Entry created for a comment in a contest.
    pub fn find_entry_by_comment(&self, contest_id: i64, comment_id: &str) -> Result<Option<Entry>> {
        EntryRepo::find_by_comment(&*self.conn()?, contest_id, comment_id)
    }

    /// Entry holding a number in a contest.
    pub fn find_entry_by_number(&self, contest_id: i64, number: u64) -> Result<Option<Entry>> {
        EntryRepo::find_by_number(&*self.conn()?, contest_id, number)
    }

    /// Record a number assignment.
    pub fn create_entry(
        &self,
        contest_id: i64,
        comment_id: &str,
        user_name: &str,
        number: u64,
    ) -> Result<Entry> {
        EntryRepo::create(&*self.conn()?, contest_id, comment_id, user_name, number)
    }

    /// Entries of a contest ordered by number.
    pub fn list_entries(&self, contest_id: i64) -> Result<Vec<Entry>> {
        EntryRepo::list_for_contest(&*self.conn()?, contest_id)
    }

    /// Delete a set of entries atomically. Returns how many were removed.
    pub fn delete_entries(&self, ids: &[i64]) -> Result<usize> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let deleted = EntryRepo::delete_ids(&tx, ids)?;
        tx.commit()?;
        Ok(deleted)
    }

    // ── Tokens ───────────────────────────────────────────────────────────

    /// Store a new access token.
    pub fn save_token(
        &self,
        token_type: &str,
        token: &str,
        expires_at: Option<&str>,
    ) -> Result<AccessToken> {
        TokenRepo::save(&*self.conn()?, token_type, token, expires_at)
    }

    /// The most recently stored token.
    pub fn find_latest_token(&self) -> Result<Option<AccessToken>> {
        TokenRepo::latest(&*self.conn()?)
    }

    // ── Activity ─────────────────────────────────────────────────────────

    /// Append an activity row.
    pub fn log_activity(
        &self,
        kind: ActivityKind,
        message: &str,
        contest_id: Option<i64>,
        ip_address: Option<&str>,
    ) -> Result<i64> {
        ActivityRepo::log(&*self.conn()?, kind, message, contest_id, ip_address)
    }

    /// Newest activity rows, optionally for one contest.
    pub fn recent_activity(&self, limit: u32, contest_id: Option<i64>) -> Result<Vec<ActivityLogEntry>> {
        ActivityRepo::recent(&*self.conn()?, limit, contest_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
