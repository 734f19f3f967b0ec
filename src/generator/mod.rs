//! Generator module - fetches every post and writes the static site
//!
//! All content is fetched before anything is written, so a failed fetch
//! leaves the previous output in place instead of publishing a partial list.
//! Files are replaced atomically, and pages for posts that left the
//! repository are removed once the new output is in place.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::client::ContentClient;
use crate::content::PostSummary;
use crate::detail::{self, PostPage};
use crate::feed::PostFeed;
use crate::helpers::{is_routable_uid, url_for};
use crate::templates::{ListItem, TemplateRenderer};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub posts: usize,
    pub list_pages: usize,
    pub skipped: usize,
}

/// A list page as served to the "load more" button
#[derive(Debug, Serialize)]
struct PageFile {
    results: Vec<ListItem>,
    next_page: Option<String>,
}

/// Static site generator
pub struct Generator<'a> {
    blog: &'a Blog,
    renderer: TemplateRenderer,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config)?;
        Ok(Self { blog, renderer })
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Generate the entire site
    pub async fn generate<C: ContentClient + ?Sized>(&self, client: &C) -> Result<Report> {
        let doc_type = &self.blog.config.prismic.document_type;

        // Walk the whole list, one page at a time
        let mut feed = PostFeed::fetch_first(client, doc_type.as_str(), self.blog.config.per_page)
            .await
            .context("Failed to fetch the first page of posts")?;
        let pages = feed
            .load_all()
            .await
            .context("Failed to fetch the post list")?;

        let mut skipped = 0;
        let mut routable_pages: Vec<Vec<PostSummary>> = Vec::with_capacity(pages.len());
        for page in pages {
            let mut kept = Vec::with_capacity(page.len());
            for post in page {
                if is_routable_uid(&post.uid) {
                    kept.push(post);
                } else {
                    tracing::warn!("Skipping post with unusable uid {:?}", post.uid);
                    skipped += 1;
                }
            }
            routable_pages.push(kept);
        }
        let pages = routable_pages;

        // Resolve every post page and where it goes
        let mut post_pages = Vec::new();
        for post in pages.iter().flatten() {
            let page = detail::load_post(client, doc_type, &post.uid)
                .await
                .with_context(|| format!("Failed to fetch post {:?}", post.uid))?;
            let output_path = self
                .post_output_path(&post.uid)
                .with_context(|| format!("No route configured for post {:?}", post.uid))?;
            post_pages.push((output_path, page));
        }

        tracing::info!(
            "Fetched {} posts in {} list pages",
            post_pages.len(),
            pages.len()
        );

        // Everything is in hand, write it out
        fs::create_dir_all(&self.blog.public_dir)?;
        self.copy_source_assets()?;
        self.write_list_pages(&pages)?;
        for (output_path, page) in &post_pages {
            write_file(output_path, &self.renderer.render_post(page)?)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }
        self.write_not_found_page()?;

        let produced: HashSet<&Path> = post_pages.iter().map(|(path, _)| path.as_path()).collect();
        self.prune_stale_posts(&produced)?;
        self.prune_stale_list_pages(pages.len())?;

        Ok(Report {
            posts: post_pages.len(),
            list_pages: pages.len(),
            skipped,
        })
    }

    /// Write index.html with the first page and pages/N.json for the rest
    fn write_list_pages(&self, pages: &[Vec<PostSummary>]) -> Result<()> {
        let page_url = |n: usize| url_for(&self.blog.config, &format!("/pages/{}.json", n));
        let next_of = |i: usize| (i + 1 < pages.len()).then(|| page_url(i + 2));

        let first = pages.first().map(Vec::as_slice).unwrap_or_default();
        let html = self.renderer.render_index(first, next_of(0).as_deref())?;
        write_file(&self.blog.public_dir.join("index.html"), &html)?;

        for (i, posts) in pages.iter().enumerate().skip(1) {
            let file = PageFile {
                results: posts.iter().map(|p| self.renderer.list_item(p)).collect(),
                next_page: next_of(i),
            };
            let path = self
                .blog
                .public_dir
                .join("pages")
                .join(format!("{}.json", i + 1));
            write_file(&path, &serde_json::to_string(&file)?)?;
        }

        tracing::debug!("Generated index and {} list pages", pages.len().saturating_sub(1));
        Ok(())
    }

    /// Render and write a post page, returning its path
    pub fn write_post_page(&self, page: &PostPage) -> Result<PathBuf> {
        let uid = &page.post.summary.uid;
        let output_path = self
            .post_output_path(uid)
            .with_context(|| format!("No route configured for post {:?}", uid))?;
        let html = self.renderer.render_post(page)?;
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);
        Ok(output_path)
    }

    /// Where a post page lives under the public directory
    pub fn post_output_path(&self, uid: &str) -> Option<PathBuf> {
        if !is_routable_uid(uid) {
            return None;
        }
        let route = self
            .blog
            .config
            .route_for(&self.blog.config.prismic.document_type)?;
        let relative = route.path.replace(":uid", uid);
        Some(
            self.blog
                .public_dir
                .join(relative.trim_matches('/'))
                .join("index.html"),
        )
    }

    /// Remove post pages this run did not produce. Only routes whose last
    /// segment is the uid are pruned, so the post directories are known.
    fn prune_stale_posts(&self, produced: &HashSet<&Path>) -> Result<()> {
        let Some(route) = self
            .blog
            .config
            .route_for(&self.blog.config.prismic.document_type)
        else {
            return Ok(());
        };
        let Some((prefix, suffix)) = route.path.split_once(":uid") else {
            return Ok(());
        };
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() || !suffix.trim_matches('/').is_empty() {
            tracing::debug!("Not pruning posts for route {:?}", route.path);
            return Ok(());
        }

        let posts_dir = self.blog.public_dir.join(prefix);
        if !posts_dir.is_dir() {
            return Ok(());
        }

        let mut removed = 0;
        for entry in WalkDir::new(&posts_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let index = entry.path().join("index.html");
            if entry.file_type().is_dir() && index.is_file() && !produced.contains(index.as_path()) {
                fs::remove_dir_all(entry.path())
                    .with_context(|| format!("Failed to remove {:?}", entry.path()))?;
                tracing::info!("Removed stale post: {:?}", entry.path());
                removed += 1;
            }
        }

        tracing::debug!("Pruned {} stale posts from {:?}", removed, posts_dir);
        Ok(())
    }

    /// Remove `pages/N.json` files beyond the current page count
    fn prune_stale_list_pages(&self, page_count: usize) -> Result<()> {
        let pages_dir = self.blog.public_dir.join("pages");
        if !pages_dir.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(&pages_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let current = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_suffix(".json"))
                .and_then(|n| n.parse::<usize>().ok())
                .is_some_and(|n| (2..=page_count).contains(&n));
            if entry.file_type().is_file() && !current {
                fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
                tracing::debug!("Removed stale list page: {:?}", path);
            }
        }
        Ok(())
    }

    fn write_not_found_page(&self) -> Result<()> {
        let html = self.renderer.render_not_found(None)?;
        write_file(&self.blog.public_dir.join("404.html"), &html)
    }

    /// Copy static assets (images, css...) to the public directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        tracing::debug!("Copied {} assets from {:?}", copied, source_dir);
        Ok(())
    }
}

/// Write through a temporary file in the same directory and rename it into
/// place, so readers see either the old file or the new one
fn write_file(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("No parent directory for {:?}", path))?;
    fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create a temporary file in {:?}", parent))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {:?}", path))?;
    // Temporary files are private, published pages are not
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    file.persist(path)
        .with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}
