//! The post/comment client seam.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::Result;
use crate::types::{Comment, Post};

/// Lazy, ordered stream of a post's comments across all pages.
pub type CommentStream<'a> = BoxStream<'a, Result<Comment>>;

/// Read and write access to a post and its comments.
///
/// Implemented by [`GraphClient`](crate::GraphClient) against the live API and
/// by in-memory fakes in tests.
#[async_trait]
pub trait PostClient: Send + Sync {
    /// Fetch a post's current text.
    async fn fetch_post(&self, post_id: &str, token: &str) -> Result<Post>;

    /// Stream every comment on a post in chronological order, following
    /// pagination. `since` restricts to comments after that time.
    ///
    /// Nothing is fetched until the stream is polled; each call starts a
    /// fresh scan.
    fn comments<'a>(
        &'a self,
        post_id: &str,
        token: &str,
        since: Option<&str>,
    ) -> CommentStream<'a>;

    /// Replace a post's text.
    async fn write_post(&self, post_id: &str, text: &str, token: &str) -> Result<()>;

    /// Reply to a comment. Returns the reply's ID.
    async fn reply_to_comment(&self, comment_id: &str, text: &str, token: &str) -> Result<String>;
}
