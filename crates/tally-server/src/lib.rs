//! # tally-server
//!
//! JSON API over `axum`:
//!
//! - **Contests**: list, create, detail with entries, partial update, delete
//! - **Tokens**: save a Graph access token, check whether one is usable
//! - **Activity**: audit log listing
//! - **Reconciliation**: run the reconciler for one contest
//!
//! Every operator action is recorded in the activity log together with the
//! client address taken from proxy headers.

#![deny(unsafe_code)]

pub mod errors;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use errors::ApiError;
pub use server::{AppState, TallyServer};
pub use shutdown::ShutdownCoordinator;
