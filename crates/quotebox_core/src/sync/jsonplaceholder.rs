//! JSONPlaceholder-backed remote.
//!
//! The service returns placeholder posts, remapped into quote shape:
//! `id = post.id`, `text = post.title`, `author = "User {userId}"`,
//! `category = "Server"`. Appends are accepted but not retained remotely.

use crate::model::quote::{Quote, QuoteId};
use crate::sync::remote::{RemoteError, RemoteQuoteSource, RemoteResult, SyncStage};
use log::warn;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

pub const JSONPLACEHOLDER_SOURCE_ID: &str = "jsonplaceholder";
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com";
pub const DEFAULT_FETCH_LIMIT: u32 = 10;
/// Category assigned to every remapped post.
pub const SERVER_CATEGORY: &str = "Server";

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
    #[serde(rename = "userId")]
    user_id: u64,
    title: String,
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    title: &'a str,
    body: String,
    #[serde(rename = "userId")]
    user_id: u64,
}

/// Blocking HTTP client for the `/posts` resource.
pub struct JsonPlaceholderRemote {
    client: Client,
    endpoint: String,
    fetch_limit: u32,
}

impl JsonPlaceholderRemote {
    pub fn new(endpoint: impl Into<String>, fetch_limit: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            fetch_limit,
        }
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.endpoint)
    }
}

impl Default for JsonPlaceholderRemote {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_FETCH_LIMIT)
    }
}

impl RemoteQuoteSource for JsonPlaceholderRemote {
    fn source_id(&self) -> &str {
        JSONPLACEHOLDER_SOURCE_ID
    }

    fn fetch_all(&self) -> RemoteResult<Vec<Quote>> {
        let response = self
            .client
            .get(self.posts_url())
            .query(&[("_limit", self.fetch_limit)])
            .send()
            .map_err(|err| transport_error(SyncStage::Fetch, &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(SyncStage::Fetch, status));
        }

        let posts: Vec<Post> = response.json().map_err(|err| {
            RemoteError::new(
                JSONPLACEHOLDER_SOURCE_ID,
                SyncStage::Fetch,
                "decode",
                err.to_string(),
                false,
            )
        })?;

        Ok(posts.into_iter().filter_map(post_to_quote).collect())
    }

    fn append(&self, quote: &Quote) -> RemoteResult<()> {
        let body = NewPost {
            title: &quote.text,
            body: format!("{} - {}", quote.author, quote.category),
            user_id: 1,
        };
        let response = self
            .client
            .post(self.posts_url())
            .json(&body)
            .send()
            .map_err(|err| transport_error(SyncStage::Append, &err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(SyncStage::Append, status));
        }
        Ok(())
    }
}

fn post_to_quote(post: Post) -> Option<Quote> {
    let author = format!("User {}", post.user_id);
    match Quote::with_id(
        QuoteId::from(post.id),
        &post.title,
        SERVER_CATEGORY,
        Some(&author),
    ) {
        Ok(quote) => Some(quote),
        Err(err) => {
            warn!(
                "event=remote_fetch module=sync status=warn source={} error_code=post_skipped post_id={} error={}",
                JSONPLACEHOLDER_SOURCE_ID, post.id, err
            );
            None
        }
    }
}

fn transport_error(stage: SyncStage, err: &reqwest::Error) -> RemoteError {
    let code = if err.is_timeout() { "timeout" } else { "network" };
    RemoteError::new(JSONPLACEHOLDER_SOURCE_ID, stage, code, err.to_string(), true)
}

fn status_error(stage: SyncStage, status: reqwest::StatusCode) -> RemoteError {
    RemoteError::new(
        JSONPLACEHOLDER_SOURCE_ID,
        stage,
        "http_status",
        format!("HTTP error! status: {}", status.as_u16()),
        status.is_server_error(),
    )
}
