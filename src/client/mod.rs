//! Content client - the contract the rest of the crate fetches documents through
//!
//! Two implementations ship with the crate: [`PrismicClient`] talks to a live
//! repository over HTTP, [`MemoryClient`] serves a fixed document set loaded
//! from a fixtures file.

mod memory;
mod prismic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::Document;

pub use memory::MemoryClient;
pub use prismic::PrismicClient;

#[cfg(test)]
pub(crate) use memory::tests::post as test_post;

/// Errors surfaced by a content client
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("No {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content API answered {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No master ref advertised by {0}")]
    MissingRef(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Which page of a type query to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// The first page, with the configured page size
    First { page_size: usize },
    /// A later page, addressed by the cursor the previous page returned
    Cursor(String),
}

/// Ordering direction on the first publication date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-item lookup relative to an anchor document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborQuery {
    /// Id (not uid) of the anchor document
    pub after_id: String,
    pub direction: Direction,
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Document>,

    /// Cursor to the next page, `None` on the last page
    #[serde(default)]
    pub next_page: Option<String>,
}

#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Fetch one page of documents of the given type
    async fn query_by_type(&self, doc_type: &str, page: &PageRequest) -> Result<QueryPage>;

    /// Fetch a document by its uid
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document>;

    /// Fetch the first document after `query.after_id` in the given ordering
    async fn query_first(&self, doc_type: &str, query: &NeighborQuery)
        -> Result<Option<Document>>;
}
