//! The reconciliation routine.
//!
//! One run:
//! 1. resolve the contest and the newest access token
//! 2. fetch the post and the full comment list
//! 3. walk comments in order, assigning at most one number each
//! 4. write the post back once if anything changed
//!
//! If the final write fails, entries created during the run are deleted so
//! the database never claims numbers the post does not show.

use std::sync::Arc;

use dashmap::DashMap;
use futures::TryStreamExt;
use tally_core::numbers::{apply_name, extract_numbers, is_available};
use tally_core::{Contest, Entry, RunId};
use tally_graph::{Comment, PostClient};
use tally_settings::ReconcileSettings;
use tally_store::{ContestStore, StoreError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::{ReconcileError, Result};
use crate::report::{CommentDetail, CommentOutcome, ReconcileReport, SkipReason};

/// Runs reconciliation for contests, one run per contest at a time.
pub struct Reconciler {
    store: ContestStore,
    client: Arc<dyn PostClient>,
    settings: ReconcileSettings,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl Reconciler {
    /// Create a reconciler.
    pub fn new(store: ContestStore, client: Arc<dyn PostClient>, settings: ReconcileSettings) -> Self {
        Self {
            store,
            client,
            settings,
            locks: DashMap::new(),
        }
    }

    /// Reconcile one contest.
    ///
    /// Waits for any in-flight run for the same contest to finish first.
    #[instrument(skip(self))]
    pub async fn run(&self, contest_id: i64) -> Result<ReconcileReport> {
        let lock = Arc::clone(self.locks.entry(contest_id).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.run_locked(contest_id).await
        };
        drop(lock);
        // Waiters clone the Arc under the shard lock, so a count of one
        // means nobody else is queued on this contest.
        let _ = self
            .locks
            .remove_if(&contest_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn run_locked(&self, contest_id: i64) -> Result<ReconcileReport> {
        let contest = self
            .store
            .find_contest(contest_id)?
            .ok_or(ReconcileError::ContestNotFound(contest_id))?;
        let token = self
            .store
            .find_latest_token()?
            .ok_or(ReconcileError::MissingToken)?;
        if token.is_expired() {
            return Err(ReconcileError::TokenExpired(
                token.expires_at.clone().unwrap_or_default(),
            ));
        }

        let run_id = RunId::new();
        info!(run_id = %run_id, contest_id, post_id = %contest.post_id, "reconciliation started");

        let post = self
            .client
            .fetch_post(&contest.post_id, &token.token)
            .await
            .map_err(ReconcileError::Fetch)?;
        let comments: Vec<Comment> = self
            .client
            .comments(&contest.post_id, &token.token, None)
            .try_collect()
            .await
            .map_err(ReconcileError::Fetch)?;
        debug!(run_id = %run_id, comments = comments.len(), "fetched comments");

        let mut report = ReconcileReport::new(run_id, contest_id);
        let mut text = post.text.clone();
        let mut created: Vec<Entry> = Vec::new();

        for comment in &comments {
            let user_name = comment.author_name().map(str::to_owned);
            let outcome = match &user_name {
                None => CommentOutcome::Error {
                    error: "comment has no author".into(),
                },
                Some(name) => self
                    .assign(&contest, comment, name, &mut text, &mut created)
                    .unwrap_or_else(|e| {
                        warn!(comment_id = %comment.id, error = %e, "comment failed");
                        CommentOutcome::Error {
                            error: e.to_string(),
                        }
                    }),
            };
            report.record(CommentDetail {
                comment_id: comment.id.clone(),
                user_name,
                outcome,
            });
        }

        if text != post.text {
            if let Err(source) = self
                .client
                .write_post(&contest.post_id, &text, &token.token)
                .await
            {
                let rolled_back = self.roll_back(&created);
                error!(
                    run_id = %report.run_id,
                    contest_id,
                    rolled_back,
                    error = %source,
                    "post update failed"
                );
                return Err(ReconcileError::Write {
                    source,
                    rolled_back,
                });
            }
            report.post_updated = true;

            if self.settings.reply_to_assigned {
                self.reply_to_assigned(&created, &token.token).await;
            }
        }

        info!(
            run_id = %report.run_id,
            contest_id,
            processed = report.processed,
            assigned = report.assigned,
            skipped = report.skipped,
            errors = report.errors,
            post_updated = report.post_updated,
            "reconciliation complete"
        );
        Ok(report)
    }

    /// Try to give `comment` one number, updating `text` on success.
    fn assign(
        &self,
        contest: &Contest,
        comment: &Comment,
        user_name: &str,
        text: &mut String,
        created: &mut Vec<Entry>,
    ) -> std::result::Result<CommentOutcome, StoreError> {
        if self
            .store
            .find_entry_by_comment(contest.id, &comment.id)?
            .is_some()
        {
            return Ok(CommentOutcome::Skipped {
                reason: SkipReason::AlreadyProcessed,
            });
        }

        let numbers = extract_numbers(&comment.text);
        if numbers.is_empty() {
            return Ok(CommentOutcome::Skipped {
                reason: SkipReason::NoNumbers,
            });
        }

        for number in numbers {
            if self.store.find_entry_by_number(contest.id, number)?.is_some() {
                continue;
            }
            if !is_available(text, number) {
                continue;
            }

            let entry = self
                .store
                .create_entry(contest.id, &comment.id, user_name, number)?;
            *text = apply_name(text, number, user_name);
            debug!(comment_id = %comment.id, number, "number assigned");
            created.push(entry);
            return Ok(CommentOutcome::Assigned { number });
        }

        Ok(CommentOutcome::Skipped {
            reason: SkipReason::NoneAvailable,
        })
    }

    /// Delete this run's entries. Returns how many were removed.
    fn roll_back(&self, created: &[Entry]) -> usize {
        if created.is_empty() {
            return 0;
        }
        let ids: Vec<i64> = created.iter().map(|e| e.id).collect();
        match self.store.delete_entries(&ids) {
            Ok(deleted) => deleted,
            Err(e) => {
                error!(error = %e, entries = ids.len(), "failed to roll back entries");
                0
            }
        }
    }

    async fn reply_to_assigned(&self, created: &[Entry], token: &str) {
        for entry in created {
            let message = render_reply(&self.settings.reply_template, entry.number, &entry.user_name);
            if let Err(e) = self
                .client
                .reply_to_comment(&entry.comment_id, &message, token)
                .await
            {
                warn!(comment_id = %entry.comment_id, error = %e, "reply failed");
            }
        }
    }
}

/// Fill `{number}` and `{name}` in a reply template.
pub fn render_reply(template: &str, number: u64, name: &str) -> String {
    template
        .replace("{number}", &number.to_string())
        .replace("{name}", name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
