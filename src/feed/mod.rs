//! Post list pagination
//!
//! [`PostFeed`] holds the posts shown so far plus the cursor to the next
//! page, and appends pages on demand. `load_more` borrows the feed mutably,
//! so a second call cannot start while one is in flight; owners that share a
//! feed across tasks wrap it in a `tokio::sync::Mutex`, which queues callers.

use serde::{Deserialize, Serialize};

use crate::client::{ContentClient, PageRequest, QueryPage, Result};
use crate::content::{mapper, PostSummary};

/// Posts loaded so far and where to resume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationState {
    pub posts: Vec<PostSummary>,
    /// `None` iff there are no further pages
    pub next_cursor: Option<String>,
}

impl PaginationState {
    /// Map a fetched page into a fresh state
    pub fn from_page(page: &QueryPage) -> Self {
        Self {
            posts: page.results.iter().map(mapper::to_summary).collect(),
            next_cursor: page.next_page.clone(),
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Pagination controller over a content client
pub struct PostFeed<'a, C: ?Sized> {
    client: &'a C,
    doc_type: String,
    state: PaginationState,
}

impl<'a, C: ContentClient + ?Sized> PostFeed<'a, C> {
    /// Start from an already fetched first page
    pub fn new(client: &'a C, doc_type: impl Into<String>, first_page: PaginationState) -> Self {
        Self {
            client,
            doc_type: doc_type.into(),
            state: first_page,
        }
    }

    /// Fetch the first page and start from it
    pub async fn fetch_first(
        client: &'a C,
        doc_type: impl Into<String>,
        page_size: usize,
    ) -> Result<Self> {
        let doc_type = doc_type.into();
        let page = client
            .query_by_type(&doc_type, &PageRequest::First { page_size })
            .await?;
        tracing::debug!(
            "First page of {}: {} posts, more: {}",
            doc_type,
            page.results.len(),
            page.next_page.is_some()
        );
        Ok(Self::new(client, doc_type, PaginationState::from_page(&page)))
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    /// Fetch the next page and append it.
    ///
    /// Without a cursor this returns immediately without a request. On
    /// failure the posts and the cursor are left as they were.
    pub async fn load_more(&mut self) -> Result<&PaginationState> {
        let Some(cursor) = self.state.next_cursor.clone() else {
            tracing::debug!("No further pages of {}", self.doc_type);
            return Ok(&self.state);
        };

        let page = self
            .client
            .query_by_type(&self.doc_type, &PageRequest::Cursor(cursor))
            .await?;

        let before = self.state.posts.len();
        self.state
            .posts
            .extend(page.results.iter().map(mapper::to_summary));
        self.state.next_cursor = page.next_page;

        tracing::debug!(
            "Appended {} posts of {} ({} total, more: {})",
            self.state.posts.len() - before,
            self.doc_type,
            self.state.posts.len(),
            self.state.has_more()
        );
        Ok(&self.state)
    }

    /// Keep loading until the last page, returning each appended page
    /// (the first page included) in order
    pub async fn load_all(&mut self) -> Result<Vec<Vec<PostSummary>>> {
        let mut pages = vec![self.state.posts.clone()];
        while self.has_more() {
            let before = self.state.posts.len();
            self.load_more().await?;
            pages.push(self.state.posts[before..].to_vec());
        }
        Ok(pages)
    }
}
