//! In-memory content client, backed by a fixed set of documents

use async_trait::async_trait;
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use super::{ContentClient, ContentError, Direction, NeighborQuery, PageRequest, QueryPage, Result};
use crate::content::Document;

/// Serves documents from memory with the same ordering and paging rules as
/// the HTTP client: type queries come newest first, cursors are opaque
/// strings handed back by the previous page.
#[derive(Debug, Default)]
pub struct MemoryClient {
    documents: Vec<Document>,
    requests: AtomicUsize,
}

impl MemoryClient {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            requests: AtomicUsize::new(0),
        }
    }

    /// Load documents from a JSON file holding either an array of documents
    /// or a saved search response (`{"results": [...]}`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let documents: Vec<Document> = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            serde_json::from_value::<QueryPage>(value)?.results
        };
        tracing::debug!(
            "Loaded {} fixture documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::new(documents))
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(AtomicOrdering::SeqCst)
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Documents of a type, oldest first
    fn chronological(&self, doc_type: &str) -> Vec<&Document> {
        let mut docs: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| d.doc_type == doc_type)
            .collect();
        docs.sort_by(|a, b| compare_chronological(a, b));
        docs
    }
}

/// Order by first publication date, undated documents first, id as tiebreaker
fn compare_chronological(a: &Document, b: &Document) -> Ordering {
    a.first_publication_date
        .cmp(&b.first_publication_date)
        .then_with(|| a.id.cmp(&b.id))
}

/// Page number, page size and the `start..end` window a cursor points at
fn parse_cursor(cursor: &str) -> Result<(usize, usize, usize, usize)> {
    let invalid = || ContentError::InvalidCursor(cursor.to_string());
    let (page, size) = cursor.split_once(':').ok_or_else(invalid)?;
    let page: usize = page.parse().map_err(|_| invalid())?;
    let size: usize = size.parse().map_err(|_| invalid())?;
    if page == 0 || size == 0 {
        return Err(invalid());
    }
    let start = (page - 1).checked_mul(size).ok_or_else(invalid)?;
    let end = start.checked_add(size).ok_or_else(invalid)?;
    Ok((page, size, start, end))
}

#[async_trait]
impl ContentClient for MemoryClient {
    async fn query_by_type(&self, doc_type: &str, page: &PageRequest) -> Result<QueryPage> {
        self.record_request();

        let (page_number, page_size, start, end) = match page {
            PageRequest::First { page_size } => {
                let size = (*page_size).max(1);
                (1, size, 0, size)
            }
            PageRequest::Cursor(cursor) => parse_cursor(cursor)?,
        };

        let mut docs = self.chronological(doc_type);
        docs.reverse();

        let results: Vec<Document> = docs
            .iter()
            .skip(start)
            .take(page_size)
            .map(|d| (*d).clone())
            .collect();

        let next_page = if end < docs.len() {
            Some(format!("{}:{}", page_number + 1, page_size))
        } else {
            None
        };

        Ok(QueryPage { results, next_page })
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document> {
        self.record_request();

        self.documents
            .iter()
            .find(|d| d.doc_type == doc_type && d.uid.as_deref() == Some(uid))
            .cloned()
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
        self.record_request();

        let mut docs = self.chronological(doc_type);
        if query.direction == Direction::Descending {
            docs.reverse();
        }

        let found = docs
            .iter()
            .position(|d| d.id == query.after_id)
            .and_then(|pos| docs.get(pos + 1))
            .map(|d| (*d).clone());

        Ok(found)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::record::{parse_date, PostFields, TextField};

    /// A `posts` document published on the given day of March 2021
    pub(crate) fn post(uid: &str, day: u32) -> Document {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            doc_type: "posts".to_string(),
            first_publication_date: parse_date(&format!("2021-03-{:02}T12:00:00+0000", day)),
            last_publication_date: parse_date(&format!("2021-03-{:02}T12:00:00+0000", day)),
            tags: Vec::new(),
            lang: Some("pt-br".to_string()),
            data: PostFields {
                title: Some(TextField::Plain(format!("Title {}", uid))),
                ..Default::default()
            },
        }
    }

    fn uids(page: &QueryPage) -> Vec<&str> {
        page.results
            .iter()
            .map(|d| d.uid.as_deref().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_pages_newest_first() {
        let client = MemoryClient::new(vec![post("a", 1), post("c", 3), post("b", 2)]);

        let first = client
            .query_by_type("posts", &PageRequest::First { page_size: 2 })
            .await
            .unwrap();
        assert_eq!(uids(&first), vec!["c", "b"]);
        assert_eq!(first.next_page.as_deref(), Some("2:2"));

        let second = client
            .query_by_type("posts", &PageRequest::Cursor("2:2".to_string()))
            .await
            .unwrap();
        assert_eq!(uids(&second), vec!["a"]);
        assert_eq!(second.next_page, None);
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_bad_cursor() {
        let client = MemoryClient::new(vec![post("a", 1)]);
        let err = client
            .query_by_type("posts", &PageRequest::Cursor("page-two".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn test_overflowing_cursor_is_invalid() {
        let client = MemoryClient::new(vec![post("a", 1)]);
        for cursor in [format!("{}:2", usize::MAX), format!("2:{}", usize::MAX)] {
            let err = client
                .query_by_type("posts", &PageRequest::Cursor(cursor.clone()))
                .await
                .unwrap_err();
            assert!(matches!(err, ContentError::InvalidCursor(_)), "{}", cursor);
        }

        // a page size that still fits is served as one big page
        let page = client
            .query_by_type("posts", &PageRequest::Cursor(format!("1:{}", usize::MAX)))
            .await
            .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let client = MemoryClient::new(vec![post("a", 1)]);
        assert_eq!(
            client.get_by_uid("posts", "a").await.unwrap().id,
            "id-a"
        );
        let err = client.get_by_uid("posts", "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_query_first_both_directions() {
        let client = MemoryClient::new(vec![post("a", 1), post("b", 2), post("c", 3)]);
        let after_b = |direction| NeighborQuery {
            after_id: "id-b".to_string(),
            direction,
        };

        let next = client
            .query_first("posts", &after_b(Direction::Ascending))
            .await
            .unwrap();
        assert_eq!(next.unwrap().id, "id-c");

        let previous = client
            .query_first("posts", &after_b(Direction::Descending))
            .await
            .unwrap();
        assert_eq!(previous.unwrap().id, "id-a");
    }

    #[test]
    fn test_from_file_accepts_both_shapes() {
        let dir = tempfile::tempdir().unwrap();

        let array_path = dir.path().join("array.json");
        fs::write(
            &array_path,
            r#"[{"id": "1", "uid": "one", "type": "posts", "data": {}}]"#,
        )
        .unwrap();
        assert_eq!(MemoryClient::from_file(&array_path).unwrap().documents.len(), 1);

        let search_path = dir.path().join("search.json");
        fs::write(
            &search_path,
            r#"{"page": 1, "next_page": null, "results": [
                {"id": "1", "uid": "one", "type": "posts"},
                {"id": "2", "uid": "two", "type": "posts"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(MemoryClient::from_file(&search_path).unwrap().documents.len(), 2);
    }
}
