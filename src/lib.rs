//! spacetraveling: a static blog generator for posts kept in Prismic
//!
//! Posts are fetched through a [`client::ContentClient`], mapped into view
//! models, paginated by [`feed::PostFeed`], assembled into post pages by
//! [`detail`] and rendered with built-in Tera templates.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use client::{ContentClient, MemoryClient, PrismicClient};

/// The main application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new instance from a directory, reading `_config.yml` when
    /// present and overlaying content API settings from the environment
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir.as_ref());
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        }
    }

    /// Content client for this site: a fixtures file when given, otherwise
    /// the configured Prismic repository
    pub fn content_client(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentClient>> {
        if let Some(path) = fixtures {
            tracing::info!("Reading content from fixtures {:?}", path);
            let client = MemoryClient::from_file(path)
                .with_context(|| format!("Failed to load fixtures {:?}", path))?;
            return Ok(Arc::new(client));
        }

        if self.config.prismic.endpoint.is_empty() {
            anyhow::bail!(
                "No content API endpoint configured. Set prismic.endpoint in _config.yml or {}",
                config::ENV_API_ENDPOINT
            );
        }
        Ok(Arc::new(PrismicClient::new(&self.config.prismic)?))
    }

    /// Generate the static site
    pub async fn generate(&self, client: &dyn ContentClient) -> Result<generator::Report> {
        commands::generate::run(self, client).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_new_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.public_dir, dir.path().join("public"));
        assert_eq!(blog.source_dir, dir.path().join("source"));
    }

    #[test]
    fn test_new_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "public_dir: dist\nper_page: 6\n").unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.public_dir, dir.path().join("dist"));
        assert_eq!(blog.config.per_page, 6);
    }

    #[test]
    fn test_client_requires_endpoint_or_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config::SiteConfig::default();
        config.prismic.endpoint.clear();
        let blog = Blog::with_config(dir.path(), config);
        assert!(blog.content_client(None).is_err());

        let fixtures = dir.path().join("posts.json");
        fs::write(&fixtures, "[]").unwrap();
        assert!(blog.content_client(Some(&fixtures)).is_ok());
    }
}
