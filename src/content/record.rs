//! Raw documents as returned by the content API
//!
//! Every field the repository may leave out is an `Option` here; the mapper
//! decides what an absent value turns into.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// A single document from the content repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Repository-internal id (used as the `after` anchor for neighbor lookups)
    pub id: String,

    /// Human-readable unique id, the routing key
    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type name, `posts` for blog posts
    #[serde(rename = "type")]
    pub doc_type: String,

    #[serde(default, deserialize_with = "lenient_date")]
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    #[serde(default, deserialize_with = "lenient_date")]
    pub last_publication_date: Option<DateTime<FixedOffset>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub lang: Option<String>,

    /// Custom type fields
    #[serde(default)]
    pub data: PostFields,
}

/// Fields of the `posts` custom type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFields {
    pub title: Option<TextField>,
    pub subtitle: Option<TextField>,
    pub author: Option<TextField>,
    pub banner: Option<ImageField>,
    pub content: Option<Vec<ContentGroup>>,
}

/// A text field, stored either as key text or as a rich text block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(Vec<RichTextBlock>),
}

impl TextField {
    /// Flatten to plain text; rich text blocks are joined with newlines
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(s) => s.clone(),
            TextField::Rich(blocks) => blocks
                .iter()
                .filter_map(|b| b.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// An image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// One item of the `content` group: a heading and its rich text body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentGroup {
    pub heading: Option<TextField>,
    pub body: Option<Vec<RichTextBlock>>,
}

/// A rich text block (paragraph, heading, list item...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
}

/// Accepts RFC 3339 and the `+0000` offset form the API emits.
/// Anything else becomes `None` instead of rejecting the whole document.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let parsed = parse_date(&s);
        if parsed.is_none() {
            tracing::warn!("Ignoring unparsable publication date {:?}", s);
        }
        parsed
    }))
}

/// Parse a publication date string
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prismic_document() {
        let json = r#"{
            "id": "YF1s2BIAACMAVKsd",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "href": "https://example.cdn.prismic.io/api/v2/documents/search",
            "tags": [],
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "last_publication_date": "2021-03-25T19:25:28+0000",
            "lang": "pt-br",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                "author": "Joseph Oliveira",
                "banner": { "url": "https://images.prismic.io/banner.png", "alt": null },
                "content": [
                    {
                        "heading": "Proin et varius",
                        "body": [{ "type": "paragraph", "text": "Lorem ipsum", "spans": [] }]
                    }
                ]
            }
        }"#;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.doc_type, "posts");
        assert_eq!(
            doc.first_publication_date.unwrap().to_rfc3339(),
            "2021-03-15T19:25:28+00:00"
        );
        let content = doc.data.content.unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(
            content[0].body.as_ref().unwrap()[0].text.as_deref(),
            Some("Lorem ipsum")
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let doc: Document =
            serde_json::from_str(r#"{"id": "a", "type": "posts", "data": {}}"#).unwrap();
        assert_eq!(doc.uid, None);
        assert_eq!(doc.first_publication_date, None);
        assert_eq!(doc.data.banner, None);
        assert_eq!(doc.data.content, None);
    }

    #[test]
    fn test_null_and_garbage_dates() {
        let doc: Document = serde_json::from_str(
            r#"{"id": "a", "type": "posts", "first_publication_date": null,
                "last_publication_date": "yesterday-ish"}"#,
        )
        .unwrap();
        assert_eq!(doc.first_publication_date, None);
        assert_eq!(doc.last_publication_date, None);
    }

    #[test]
    fn test_rich_text_title() {
        let doc: Document = serde_json::from_str(
            r#"{"id": "a", "type": "posts", "data": {
                "title": [{"type": "heading1", "text": "Rich"}, {"type": "paragraph", "text": "title"}]
            }}"#,
        )
        .unwrap();
        assert_eq!(doc.data.title.unwrap().as_text(), "Rich\ntitle");
    }

    #[test]
    fn test_parse_date_forms() {
        assert!(parse_date("2021-03-15T19:25:28+0000").is_some());
        assert!(parse_date("2021-03-15T19:25:28+00:00").is_some());
        assert!(parse_date("2021-03-15T19:25:28Z").is_some());
        assert!(parse_date("15/03/2021").is_none());
    }
}
