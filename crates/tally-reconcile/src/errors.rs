//! Reconciliation errors.
//!
//! Only run-level failures live here. Problems with a single comment are
//! recorded in the report and never abort the run.

use tally_graph::GraphError;
use tally_store::StoreError;
use thiserror::Error;

/// A failure that stops a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The contest does not exist.
    #[error("contest not found: {0}")]
    ContestNotFound(i64),

    /// No access token has been saved.
    #[error("no access token found")]
    MissingToken,

    /// The newest access token is past its expiry.
    #[error("access token expired at {0}")]
    TokenExpired(String),

    /// Reading the post or its comments failed; nothing was processed.
    #[error("failed to fetch post or comments: {0}")]
    Fetch(#[source] GraphError),

    /// Writing the post back failed; entries created by the run were removed.
    #[error("failed to update post ({rolled_back} entries rolled back): {source}")]
    Write {
        /// Upstream failure.
        #[source]
        source: GraphError,
        /// Entries deleted to undo the run.
        rolled_back: usize,
    },

    /// Contest or token lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Whether the run was rejected before doing any work because of bad input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ContestNotFound(_) | Self::MissingToken | Self::TokenExpired(_)
        )
    }
}

/// Convenience type alias for reconciliation results.
pub type Result<T> = std::result::Result<T, ReconcileError>;
