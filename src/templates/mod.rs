//! Built-in templates using the Tera template engine
//!
//! Templates are embedded in the binary. Content coming from the repository
//! is plain text, so autoescaping stays on for every `.html` template.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::config::{CommentsConfig, SiteConfig};
use crate::content::record::parse_date;
use crate::content::PostSummary;
use crate::detail::PostPage;
use crate::helpers::{date_xml, document_path, format_in, is_routable_uid, url_for};

/// Template renderer with the site templates loaded
pub struct TemplateRenderer {
    tera: Tera,
    config: ConfigData,
    doc_type: String,
    site: SiteConfig,
    tz: chrono_tz::Tz,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates and filters registered
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("404.html", include_str!("site/404.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/post_meta.html",
                include_str!("site/partials/post_meta.html"),
            ),
            (
                "partials/comments.html",
                include_str!("site/partials/comments.html"),
            ),
        ])?;

        let tz = site.tz();
        let default_format = site.date_format.clone();
        tera.register_filter(
            "date_format",
            move |value: &Value, args: &HashMap<String, Value>| {
                date_format_filter(value, args, &tz, &default_format)
            },
        );
        tera.register_filter("date_xml", date_xml_filter);

        let url_config = site.clone();
        tera.register_filter(
            "url_for",
            move |value: &Value, _args: &HashMap<String, Value>| {
                let path = tera::try_get_value!("url_for", "value", String, value);
                Ok(Value::String(url_for(&url_config, &path)))
            },
        );

        Ok(Self {
            tera,
            config: ConfigData::from(site),
            doc_type: site.prismic.document_type.clone(),
            site: site.clone(),
            tz,
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// List item for a post: the summary plus its link and display date
    pub fn list_item(&self, post: &PostSummary) -> ListItem {
        let date = post
            .first_publication_date
            .map(|d| format_in(&d, &self.tz, &self.site.date_format))
            .unwrap_or_default();
        ListItem {
            url: self.post_url(&post.uid),
            date,
            post: post.clone(),
        }
    }

    /// Link to a post page
    pub fn post_url(&self, uid: &str) -> String {
        document_path(&self.site, &self.doc_type, uid)
            .unwrap_or_else(|| url_for(&self.site, uid))
    }

    /// Render the post list with the first page of posts
    pub fn render_index(&self, posts: &[PostSummary], next_page: Option<&str>) -> Result<String> {
        let items: Vec<ListItem> = posts.iter().map(|p| self.list_item(p)).collect();

        let mut context = self.base_context();
        context.insert("posts", &items);
        context.insert("next_page", &next_page);
        self.render("index.html", &context)
    }

    /// Render a post page. A neighbor without a usable uid has no page of
    /// its own and is left out.
    pub fn render_post(&self, page: &PostPage) -> Result<String> {
        let neighbor = |post: &Option<PostSummary>| {
            post.as_ref()
                .filter(|p| is_routable_uid(&p.uid))
                .map(|p| self.list_item(p))
        };
        let previous = neighbor(&page.neighbors.previous);
        let next = neighbor(&page.neighbors.next);

        let mut context = self.base_context();
        context.insert("post", &page.post);
        context.insert("reading_time", &page.reading_time);
        context.insert("edited_at", &page.post.edited_at());
        context.insert("previous", &previous);
        context.insert("next", &next);
        context.insert("current_path", &self.post_url(&page.post.summary.uid));
        self.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, uid: Option<&str>) -> Result<String> {
        let mut context = self.base_context();
        context.insert("uid", &uid);
        self.render("404.html", &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config);
        context
    }
}

/// Tera filter: format an RFC 3339 date with date-fns tokens in the site timezone
fn date_format_filter(
    value: &Value,
    args: &HashMap<String, Value>,
    tz: &chrono_tz::Tz,
    default_format: &str,
) -> tera::Result<Value> {
    let Some(raw) = value.as_str() else {
        return Ok(Value::String(String::new()));
    };
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => default_format.to_string(),
    };

    match parse_date(raw) {
        Some(date) => Ok(Value::String(format_in(&date, tz, &format))),
        None => Ok(Value::String(raw.to_string())),
    }
}

/// Tera filter: normalise a date for `<time datetime>`
fn date_xml_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let formatted = value
        .as_str()
        .and_then(parse_date)
        .map(|d| date_xml(&d))
        .unwrap_or_default();
    Ok(Value::String(formatted))
}

/// Data structures for template context

/// Site settings exposed to templates (never the access token)
#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub time_format: String,
    pub comments: CommentsConfig,
}

impl From<&SiteConfig> for ConfigData {
    fn from(site: &SiteConfig) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            author: site.author.clone(),
            language: site.language.clone(),
            url: site.url.clone(),
            root: site.root.clone(),
            time_format: site.time_format.clone(),
            comments: site.comments.clone(),
        }
    }
}

/// A post in the list, as rendered and as served in page files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    #[serde(flatten)]
    pub post: PostSummary,
    pub url: String,
    /// Publication date in the site format, empty when unpublished
    pub date: String,
}
