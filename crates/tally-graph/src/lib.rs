//! # tally-graph
//!
//! Client for the Facebook Graph API surface the reconciler needs: read a
//! post, stream its comments, overwrite the post text and reply to a comment.
//!
//! The [`PostClient`] trait is the seam; [`GraphClient`] is the `reqwest`
//! implementation. Comment pagination is exposed as a lazy stream so callers
//! never see page boundaries.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod graph;
pub mod types;

pub use client::{CommentStream, PostClient};
pub use errors::{GraphError, Result};
pub use graph::GraphClient;
pub use types::{Author, Comment, Post};
