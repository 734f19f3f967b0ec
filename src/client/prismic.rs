//! Prismic REST API v2 client

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::{ContentClient, ContentError, Direction, NeighborQuery, PageRequest, QueryPage, Result};
use crate::config::PrismicConfig;
use crate::content::Document;

/// Ordering used for type queries: newest first
const LIST_ORDERING: &str = "[document.first_publication_date desc]";

/// API root response, only the refs are of interest
#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    label: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

impl ApiInfo {
    fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// Client for a Prismic repository
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    release_ref: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client for the configured repository endpoint
    /// (e.g. `https://your-repo.cdn.prismic.io/api/v2`)
    pub fn new(config: &PrismicConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: non_empty(&config.access_token),
            release_ref: non_empty(&config.release_ref),
            master_ref: OnceCell::new(),
        })
    }

    /// The ref every query runs against: the configured release/preview
    /// ref if any, otherwise the repository master ref (resolved once)
    async fn content_ref(&self) -> Result<String> {
        if let Some(reference) = &self.release_ref {
            return Ok(reference.clone());
        }
        self.master_ref
            .get_or_try_init(|| self.fetch_master_ref())
            .await
            .cloned()
    }

    async fn fetch_master_ref(&self) -> Result<String> {
        let request = self.with_token(self.http.get(&self.endpoint));
        let info: ApiInfo = self.get_json(request).await?;
        let master = info
            .master_ref()
            .ok_or_else(|| ContentError::MissingRef(self.endpoint.clone()))?;
        tracing::debug!(
            "Using master ref {} ({} refs advertised: {})",
            master,
            info.refs.len(),
            info.refs
                .iter()
                .map(|r| r.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(master.to_string())
    }

    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    /// Run a search against the current ref
    async fn search(&self, params: &[(&str, String)]) -> Result<QueryPage> {
        let reference = self.content_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);
        let request = self
            .http
            .get(url)
            .query(&[("ref", reference)])
            .query(params);
        self.get_json(self.with_token(request)).await
    }

    /// Fetch a cursor URL as handed back in `next_page`
    async fn follow_cursor(&self, cursor: &str) -> Result<QueryPage> {
        let url = cursor_url(cursor, self.access_token.as_deref())?;
        self.get_json(self.http.get(url)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                path: response.url().path().to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentClient for PrismicClient {
    async fn query_by_type(&self, doc_type: &str, page: &PageRequest) -> Result<QueryPage> {
        match page {
            PageRequest::First { page_size } => {
                tracing::debug!("Querying {} (page size {})", doc_type, page_size);
                self.search(&[
                    ("q", at_predicate("document.type", doc_type)),
                    ("pageSize", page_size.to_string()),
                    ("orderings", LIST_ORDERING.to_string()),
                ])
                .await
            }
            PageRequest::Cursor(cursor) => {
                tracing::debug!("Following cursor for {}", doc_type);
                self.follow_cursor(cursor).await
            }
        }
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document> {
        let page = self
            .search(&[
                ("q", at_predicate(&format!("my.{}.uid", doc_type), uid)),
                ("pageSize", "1".to_string()),
            ])
            .await?;

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn query_first(
        &self,
        doc_type: &str,
        query: &NeighborQuery,
    ) -> Result<Option<Document>> {
        let page = self
            .search(&[
                ("q", at_predicate("document.type", doc_type)),
                ("pageSize", "1".to_string()),
                ("after", query.after_id.clone()),
                ("orderings", ordering(query.direction).to_string()),
            ])
            .await?;

        Ok(page.results.into_iter().next())
    }
}

/// Build an `at` predicate, e.g. `[[at(document.type,"posts")]]`
fn at_predicate(path: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[[at({},\"{}\")]]", path, escaped)
}

fn ordering(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascending => "[document.first_publication_date]",
        Direction::Descending => "[document.first_publication_date desc]",
    }
}

/// Parse a `next_page` cursor, adding the access token when the API left it out
fn cursor_url(cursor: &str, access_token: Option<&str>) -> Result<Url> {
    let mut url =
        Url::parse(cursor).map_err(|e| ContentError::InvalidCursor(format!("{}: {}", cursor, e)))?;
    if let Some(token) = access_token {
        if !url.query_pairs().any(|(k, _)| k == "access_token") {
            url.query_pairs_mut().append_pair("access_token", token);
        }
    }
    Ok(url)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
