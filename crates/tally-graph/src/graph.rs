//! `reqwest` implementation of [`PostClient`] for the Graph API.
//!
//! GET calls carry the token as an `access_token` query parameter; POST calls
//! send a JSON body with the token alongside the fields.

use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tally_settings::GraphSettings;
use tracing::{debug, info, instrument, warn};

use crate::client::{CommentStream, PostClient};
use crate::errors::{GraphError, Result};
use crate::types::{Comment, Created, Page, Post, WriteAck};

const POST_FIELDS: &str = "id,message,created_time";
const COMMENT_FIELDS: &str = "id,message,from,created_time";

/// Graph API client.
pub struct GraphClient {
    client: reqwest::Client,
    root: String,
    page_size: u32,
    max_pages: u32,
}

impl GraphClient {
    /// Build a client from settings.
    pub fn new(settings: &GraphSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let root = format!(
            "{}/{}",
            settings.base_url.trim_end_matches('/'),
            settings.api_version.trim_matches('/')
        );
        info!(root = %root, "graph client initialized");

        Ok(Self {
            client,
            root,
            page_size: settings.page_size,
            max_pages: settings.max_pages,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.root)
    }
}

/// Send a request and decode a JSON body, mapping non-2xx to [`GraphError::Api`].
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(GraphError::Api {
            status: status.as_u16(),
            message: parse_api_error(&body, status.as_u16()),
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Pull the message out of a Graph error envelope
/// (`{"error":{"message":..,"type":..,"code":..}}`), falling back to the raw body.
fn parse_api_error(body: &str, status: u16) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| format!("HTTP {status}: {body}"))
}

#[async_trait]
impl PostClient for GraphClient {
    #[instrument(skip_all, fields(post_id = %post_id))]
    async fn fetch_post(&self, post_id: &str, token: &str) -> Result<Post> {
        let request = self
            .client
            .get(self.url(post_id))
            .query(&[("fields", POST_FIELDS), ("access_token", token)]);
        let post: Post = send_json(request).await?;
        debug!(len = post.text.len(), "fetched post");
        Ok(post)
    }

    fn comments<'a>(
        &'a self,
        post_id: &str,
        token: &str,
        since: Option<&str>,
    ) -> CommentStream<'a> {
        let mut query = vec![
            ("fields", COMMENT_FIELDS.to_owned()),
            ("limit", self.page_size.to_string()),
            ("order", "chronological".to_owned()),
            ("access_token", token.to_owned()),
        ];
        if let Some(since) = since {
            query.push(("since", since.to_owned()));
        }
        let first = self
            .client
            .get(self.url(&format!("{post_id}/comments")))
            .query(&query);
        let post_id = post_id.to_owned();
        let max_pages = self.max_pages;

        Box::pin(stream! {
            let mut request = Some(first);
            let mut pages: u32 = 0;

            while let Some(current) = request.take() {
                if pages == max_pages {
                    warn!(post_id = %post_id, max_pages, "comment page limit reached");
                    yield Err(GraphError::PageLimit { max_pages });
                    return;
                }
                pages += 1;

                let page: Page<Comment> = match send_json(current).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                debug!(post_id = %post_id, page = pages, count = page.data.len(), "fetched comment page");

                // `next` is an absolute URL that already carries the token.
                request = page
                    .paging
                    .and_then(|p| p.next)
                    .map(|next| self.client.get(next));

                for comment in page.data {
                    yield Ok(comment);
                }
            }
        })
    }

    #[instrument(skip_all, fields(post_id = %post_id))]
    async fn write_post(&self, post_id: &str, text: &str, token: &str) -> Result<()> {
        let request = self
            .client
            .post(self.url(post_id))
            .json(&serde_json::json!({ "message": text, "access_token": token }));
        let ack: WriteAck = send_json(request).await?;
        if ack.success == Some(false) {
            return Err(GraphError::Api {
                status: 200,
                message: "post update was not acknowledged".into(),
            });
        }
        info!(len = text.len(), "post updated");
        Ok(())
    }

    #[instrument(skip_all, fields(comment_id = %comment_id))]
    async fn reply_to_comment(&self, comment_id: &str, text: &str, token: &str) -> Result<String> {
        let request = self
            .client
            .post(self.url(&format!("{comment_id}/comments")))
            .json(&serde_json::json!({ "message": text, "access_token": token }));
        let created: Created = send_json(request).await?;
        debug!(reply_id = %created.id, "replied to comment");
        Ok(created.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
