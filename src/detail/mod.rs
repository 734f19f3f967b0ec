//! Post detail assembly: the post itself, its reading time and its
//! chronological neighbors

use serde::Serialize;

use crate::client::{ContentClient, Direction, NeighborQuery, Result};
use crate::content::{mapper, reading_time, Document, NeighborLinks, PostDetail};

/// Everything a post page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPage {
    pub post: PostDetail,
    /// Estimated minutes to read
    pub reading_time: u32,
    pub neighbors: NeighborLinks,
}

/// Assemble a post page from already fetched documents
pub fn assemble(doc: &Document, previous: Option<&Document>, next: Option<&Document>) -> PostPage {
    let post = mapper::to_detail(doc);
    let reading_time = reading_time::reading_time(&post.content);
    PostPage {
        post,
        reading_time,
        neighbors: NeighborLinks {
            previous: previous.map(mapper::to_summary),
            next: next.map(mapper::to_summary),
        },
    }
}

/// Look up the nearest earlier and nearest later post
pub async fn resolve_neighbors<C: ContentClient + ?Sized>(
    client: &C,
    doc_type: &str,
    doc: &Document,
) -> Result<(Option<Document>, Option<Document>)> {
    let next = client
        .query_first(
            doc_type,
            &NeighborQuery {
                after_id: doc.id.clone(),
                direction: Direction::Ascending,
            },
        )
        .await?;

    let previous = client
        .query_first(
            doc_type,
            &NeighborQuery {
                after_id: doc.id.clone(),
                direction: Direction::Descending,
            },
        )
        .await?;

    Ok((previous, next))
}

/// Fetch a post by uid together with its neighbors
pub async fn load_post<C: ContentClient + ?Sized>(
    client: &C,
    doc_type: &str,
    uid: &str,
) -> Result<PostPage> {
    let doc = client.get_by_uid(doc_type, uid).await?;
    let (previous, next) = resolve_neighbors(client, doc_type, &doc).await?;
    tracing::debug!(
        "Resolved {} (previous: {:?}, next: {:?})",
        uid,
        previous.as_ref().and_then(|d| d.uid.as_deref()),
        next.as_ref().and_then(|d| d.uid.as_deref())
    );
    Ok(assemble(&doc, previous.as_ref(), next.as_ref()))
}
