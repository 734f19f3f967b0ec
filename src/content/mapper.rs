//! Maps raw documents into view models
//!
//! Mapping never fails: an absent field becomes an empty string, an empty
//! vector or `None`. A missing publication date stays `None`.

use super::post::{ContentBlock, Paragraph, PostDetail, PostSummary};
use super::record::{ContentGroup, Document, TextField};

/// Project a document into the list view
pub fn to_summary(doc: &Document) -> PostSummary {
    PostSummary {
        uid: doc.uid.clone().unwrap_or_default(),
        first_publication_date: doc.first_publication_date,
        title: text(doc.data.title.as_ref()),
        subtitle: text(doc.data.subtitle.as_ref()),
        author: text(doc.data.author.as_ref()),
    }
}

/// Project a document into the detail view
pub fn to_detail(doc: &Document) -> PostDetail {
    let banner = doc.data.banner.as_ref();
    let banner_url = banner
        .and_then(|b| b.url.clone())
        .filter(|url| !url.trim().is_empty());
    let banner_alt = banner
        .and_then(|b| b.alt.clone())
        .filter(|alt| !alt.trim().is_empty());

    let content = doc
        .data
        .content
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(to_block)
        .collect();

    PostDetail {
        summary: to_summary(doc),
        last_publication_date: doc.last_publication_date,
        banner_url,
        banner_alt,
        content,
    }
}

fn to_block(group: &ContentGroup) -> ContentBlock {
    let body = group
        .body
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|block| Paragraph::new(block.text.clone().unwrap_or_default()))
        .collect();

    ContentBlock {
        heading: text(group.heading.as_ref()),
        body,
    }
}

fn text(field: Option<&TextField>) -> String {
    field.map(TextField::as_text).unwrap_or_default()
}
