//! Graph API payload types.
//!
//! Graph calls the text field `message`; these types expose it as `text`.
//! Missing text (photo-only posts, sticker comments) deserializes as empty.

use serde::{Deserialize, Serialize};

/// A post as returned by `GET /{post_id}?fields=id,message,created_time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post ID.
    pub id: String,
    /// Post body.
    #[serde(rename = "message", default)]
    pub text: String,
    /// Creation time as reported by Graph.
    #[serde(default)]
    pub created_time: Option<String>,
}

/// The user or page that wrote a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author ID.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One comment on a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: String,
    /// Comment body.
    #[serde(rename = "message", default)]
    pub text: String,
    /// Author; Graph omits it when the commenter's profile is not visible.
    #[serde(default)]
    pub from: Option<Author>,
    /// Creation time as reported by Graph.
    #[serde(default)]
    pub created_time: Option<String>,
}

impl Comment {
    /// The author's display name, if present and not blank.
    pub fn author_name(&self) -> Option<&str> {
        self.from
            .as_ref()
            .map(|a| a.name.trim())
            .filter(|name| !name.is_empty())
    }
}

/// One page of an edge listing.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Cursor links of a page.
#[derive(Debug, Deserialize)]
pub(crate) struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// Response of a write (`POST /{post_id}`).
#[derive(Debug, Deserialize)]
pub(crate) struct WriteAck {
    #[serde(default)]
    pub success: Option<bool>,
}

/// Response of a create (`POST /{comment_id}/comments`).
#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_message_maps_to_text() {
        let post: Post = serde_json::from_str(
            r#"{"id":"1_2","message":"1. \n2. ","created_time":"2025-01-01T00:00:00+0000"}"#,
        )
        .unwrap();
        assert_eq!(post.text, "1. \n2. ");
    }

    #[test]
    fn post_without_message_has_empty_text() {
        let post: Post = serde_json::from_str(r#"{"id":"1_2"}"#).unwrap();
        assert!(post.text.is_empty());
        assert!(post.created_time.is_none());
    }

    #[test]
    fn comment_author_name() {
        let comment: Comment = serde_json::from_str(
            r#"{"id":"c1","message":"7 please","from":{"id":"u1","name":" Ann "}}"#,
        )
        .unwrap();
        assert_eq!(comment.author_name(), Some("Ann"));
    }

    #[test]
    fn comment_without_author() {
        let comment: Comment = serde_json::from_str(r#"{"id":"c1","message":"7"}"#).unwrap();
        assert!(comment.author_name().is_none());

        let blank: Comment =
            serde_json::from_str(r#"{"id":"c2","message":"7","from":{"id":"u1","name":"  "}}"#)
                .unwrap();
        assert!(blank.author_name().is_none());
    }

    #[test]
    fn page_without_paging() {
        let page: Page<Comment> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(page.paging.is_none());
    }
}
