//! # tally-core
//!
//! Foundation types and pure rules shared by every tally crate.
//!
//! - **Number rules**: [`numbers::extract_numbers`], [`numbers::is_available`],
//!   [`numbers::apply_name`] over comment text and numbered-list post text
//! - **Domain types**: [`Contest`], [`Entry`], [`AccessToken`], [`ActivityLogEntry`]
//! - **Run IDs**: time-ordered [`RunId`] for correlating a reconciliation run
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` stack

#![deny(unsafe_code)]

pub mod ids;
pub mod logging;
pub mod numbers;
pub mod types;

pub use ids::RunId;
pub use types::{AccessToken, ActivityKind, ActivityLogEntry, Contest, ContestSummary, Entry};
