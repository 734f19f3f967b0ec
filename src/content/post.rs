//! Post view models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A post as shown in the list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Routing key
    pub uid: String,

    /// First publication date, `None` when the repository has none
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,

    /// Last publication date
    pub last_publication_date: Option<DateTime<FixedOffset>>,

    /// Banner image URL
    pub banner_url: Option<String>,

    /// Banner alt text from the repository, `None` when blank
    pub banner_alt: Option<String>,

    /// Body sections in document order
    pub content: Vec<ContentBlock>,
}

impl PostDetail {
    /// The edit date worth showing: the last publication date, but only
    /// when the post was republished after it first went out.
    pub fn edited_at(&self) -> Option<DateTime<FixedOffset>> {
        match (self.summary.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) if last > first => Some(last),
            (None, Some(last)) => Some(last),
            _ => None,
        }
    }
}

/// A section of a post: a heading followed by paragraphs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Chronological neighbors of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborLinks {
    /// Nearest earlier post
    pub previous: Option<PostSummary>,

    /// Nearest later post
    pub next: Option<PostSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::record::parse_date;

    fn detail(first: Option<&str>, last: Option<&str>) -> PostDetail {
        PostDetail {
            summary: PostSummary {
                first_publication_date: first.and_then(parse_date),
                ..Default::default()
            },
            last_publication_date: last.and_then(parse_date),
            ..Default::default()
        }
    }

    #[test]
    fn test_edited_at_only_when_republished() {
        let unchanged = detail(
            Some("2021-03-15T19:25:28+0000"),
            Some("2021-03-15T19:25:28+0000"),
        );
        assert_eq!(unchanged.edited_at(), None);

        let edited = detail(
            Some("2021-03-15T19:25:28+0000"),
            Some("2021-03-25T10:00:00+0000"),
        );
        assert_eq!(edited.edited_at(), parse_date("2021-03-25T10:00:00+0000"));

        assert_eq!(detail(None, None).edited_at(), None);
    }

    #[test]
    fn test_detail_serializes_flat() {
        let post = PostDetail {
            summary: PostSummary {
                uid: "hello".to_string(),
                title: "Hello".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["uid"], "hello");
        assert_eq!(value["title"], "Hello");
        assert!(value["banner_url"].is_null());
    }
}
