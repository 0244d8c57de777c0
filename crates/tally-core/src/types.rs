//! Domain types shared across the store, reconciler and HTTP layers.
//!
//! Timestamps are RFC 3339 strings, the same shape they have in the
//! database, so rows convert into these types without reparsing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contest: a display name paired with one external post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    /// Row ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// External post ID (`{page_id}_{post_id}`).
    pub post_id: String,
    /// Optional operator notes.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// A contest plus the number of entries assigned so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestSummary {
    /// The contest itself.
    #[serde(flatten)]
    pub contest: Contest,
    /// Number of entries assigned.
    pub entry_count: i64,
}

/// One commenter holding one number within one contest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Row ID.
    pub id: i64,
    /// Owning contest.
    pub contest_id: i64,
    /// External comment ID that claimed the number.
    pub comment_id: String,
    /// Commenter display name at the time of assignment.
    pub user_name: String,
    /// The assigned number.
    pub number: u64,
    /// Creation timestamp.
    pub created_at: String,
}

/// A stored Graph API access token.
///
/// The token string is never serialized and is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Row ID.
    pub id: i64,
    /// Token kind (`page`, `user`, ...).
    pub token_type: String,
    /// Opaque token value.
    #[serde(skip_serializing, default)]
    pub token: String,
    /// Expiry timestamp, if the token expires.
    pub expires_at: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

impl AccessToken {
    /// Whether the token's expiry lies before `now`.
    ///
    /// Tokens without an expiry, or with an unparseable one, never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .is_some_and(|expiry| expiry.with_timezone(&Utc) <= now)
    }

    /// Whether the token has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Category of an operator action recorded in the activity log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A contest was created.
    CreateContest,
    /// A contest was edited.
    UpdateContest,
    /// A contest was deleted.
    DeleteContest,
    /// A contest's detail view was opened.
    ViewContest,
    /// The contest list was opened.
    ListContests,
    /// A new access token was stored.
    SaveToken,
    /// A reconciliation run completed.
    ProcessComments,
}

impl ActivityKind {
    /// Wire/database name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateContest => "create_contest",
            Self::UpdateContest => "update_contest",
            Self::DeleteContest => "delete_contest",
            Self::ViewContest => "view_contest",
            Self::ListContests => "list_contests",
            Self::SaveToken => "save_token",
            Self::ProcessComments => "process_comments",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_contest" => Ok(Self::CreateContest),
            "update_contest" => Ok(Self::UpdateContest),
            "delete_contest" => Ok(Self::DeleteContest),
            "view_contest" => Ok(Self::ViewContest),
            "list_contests" => Ok(Self::ListContests),
            "save_token" => Ok(Self::SaveToken),
            "process_comments" => Ok(Self::ProcessComments),
            other => Err(format!("unknown activity kind: {other}")),
        }
    }
}

/// One row of the audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Row ID.
    pub id: i64,
    /// Category (see [`ActivityKind`]); kept as text so old rows always load.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// Related contest, if any and still present.
    pub contest_id: Option<i64>,
    /// Name of the related contest, when it still exists.
    pub contest_name: Option<String>,
    /// Client address the action came from.
    pub ip_address: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
