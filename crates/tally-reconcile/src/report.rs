//! Run report: counters plus one detail row per comment.

use std::fmt;

use serde::Serialize;
use tally_core::RunId;

/// Why a comment got no number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// An entry already exists for this comment.
    #[serde(rename = "Already processed")]
    AlreadyProcessed,
    /// The comment mentions no numbers.
    #[serde(rename = "No numbers found in comment")]
    NoNumbers,
    /// Every number mentioned is taken or not on the list.
    #[serde(rename = "No available numbers found")]
    NoneAvailable,
}

impl SkipReason {
    /// Human-readable reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyProcessed => "Already processed",
            Self::NoNumbers => "No numbers found in comment",
            Self::NoneAvailable => "No available numbers found",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommentOutcome {
    /// The commenter got `number`.
    Assigned {
        /// Assigned number.
        number: u64,
    },
    /// Nothing was assigned.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
    /// Processing the comment failed; the run continued.
    Error {
        /// Failure message.
        error: String,
    },
}

/// One row of the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommentDetail {
    /// External comment ID.
    pub comment_id: String,
    /// Commenter display name, when the comment has one.
    pub user_name: Option<String>,
    /// Result for this comment.
    #[serde(flatten)]
    pub outcome: CommentOutcome,
}

/// Result of one reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Correlates log lines for this run.
    pub run_id: RunId,
    /// Contest reconciled.
    pub contest_id: i64,
    /// Comments examined.
    pub processed: usize,
    /// Comments that got a number.
    pub assigned: usize,
    /// Comments skipped.
    pub skipped: usize,
    /// Comments that failed.
    pub errors: usize,
    /// Whether the post text was written back.
    pub post_updated: bool,
    /// One entry per comment, in comment order.
    pub details: Vec<CommentDetail>,
}

impl ReconcileReport {
    pub(crate) fn new(run_id: RunId, contest_id: i64) -> Self {
        Self {
            run_id,
            contest_id,
            processed: 0,
            assigned: 0,
            skipped: 0,
            errors: 0,
            post_updated: false,
            details: Vec::new(),
        }
    }

    /// Append a detail row and bump the matching counter.
    pub(crate) fn record(&mut self, detail: CommentDetail) {
        self.processed += 1;
        match detail.outcome {
            CommentOutcome::Assigned { .. } => self.assigned += 1,
            CommentOutcome::Skipped { .. } => self.skipped += 1,
            CommentOutcome::Error { .. } => self.errors += 1,
        }
        self.details.push(detail);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn detail(comment_id: &str, outcome: CommentOutcome) -> CommentDetail {
        CommentDetail {
            comment_id: comment_id.into(),
            user_name: Some("Ann".into()),
            outcome,
        }
    }

    #[test]
    fn record_bumps_counters() {
        let mut report = ReconcileReport::new(RunId::new(), 1);
        report.record(detail("c1", CommentOutcome::Assigned { number: 2 }));
        report.record(detail(
            "c2",
            CommentOutcome::Skipped {
                reason: SkipReason::NoNumbers,
            },
        ));
        report.record(detail(
            "c3",
            CommentOutcome::Error {
                error: "boom".into(),
            },
        ));

        assert_eq!(report.processed, 3);
        assert_eq!(report.assigned, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.details.len(), 3);
    }

    #[test]
    fn detail_serializes_flat_with_status_tag() {
        let assigned = serde_json::to_value(detail("c1", CommentOutcome::Assigned { number: 7 }))
            .unwrap();
        assert_eq!(
            assigned,
            json!({"comment_id": "c1", "user_name": "Ann", "status": "assigned", "number": 7})
        );

        let skipped = serde_json::to_value(detail(
            "c2",
            CommentOutcome::Skipped {
                reason: SkipReason::NoneAvailable,
            },
        ))
        .unwrap();
        assert_eq!(skipped["status"], "skipped");
        assert_eq!(skipped["reason"], "No available numbers found");
    }

    #[test]
    fn skip_reason_display_matches_serialization() {
        for reason in [
            SkipReason::AlreadyProcessed,
            SkipReason::NoNumbers,
            SkipReason::NoneAvailable,
        ] {
            assert_eq!(
                serde_json::to_value(reason).unwrap(),
                json!(reason.to_string())
            );
        }
    }
}
