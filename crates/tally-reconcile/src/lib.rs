//! # tally-reconcile
//!
//! The reconciliation routine: read a contest's post and comments, give each
//! commenter the first free number they asked for, and write the updated
//! numbered list back to the post once.
//!
//! Runs for the same contest are serialized; runs for different contests
//! proceed in parallel.

#![deny(unsafe_code)]

pub mod errors;
pub mod reconciler;
pub mod report;

pub use errors::{ReconcileError, Result};
pub use reconciler::{Reconciler, render_reply};
pub use report::{CommentDetail, CommentOutcome, ReconcileReport, SkipReason};
