//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable holding the content API endpoint
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable holding the content API access token
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA timezone name used to display dates, empty for UTC
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub routes: Vec<RouteConfig>,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    // Date / Time format (date-fns style tokens)
    pub date_format: String,
    pub time_format: String,

    // Pagination
    pub per_page: usize,

    /// Seconds between background regenerations in server mode, 0 disables
    pub revalidate: u64,

    // Content repository
    pub prismic: PrismicConfig,

    // Comments
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Spacetraveling".to_string(),
            description: String::new(),
            author: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),
            routes: vec![RouteConfig::default()],

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            date_format: "dd MMM yyyy".to_string(),
            time_format: "HH:mm".to_string(),

            per_page: 4,
            revalidate: 60 * 60 * 48,

            prismic: PrismicConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Overlay content API settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay content API settings from a variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|v| !v.is_empty()) {
            tracing::debug!("Content API endpoint taken from {}", ENV_API_ENDPOINT);
            self.prismic.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            tracing::debug!("Content API token taken from {}", ENV_ACCESS_TOKEN);
            self.prismic.access_token = Some(token);
        }
    }

    /// Timezone for displayed dates
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", self.timezone);
            chrono_tz::UTC
        })
    }

    /// Route pattern for a document type
    pub fn route_for(&self, doc_type: &str) -> Option<&RouteConfig> {
        self.routes.iter().find(|r| r.doc_type == doc_type)
    }
}

/// Content repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API endpoint, e.g. `https://your-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Release or preview ref to query instead of the master ref
    pub release_ref: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            release_ref: None,
            document_type: "posts".to_string(),
        }
    }
}

/// Maps a document type to a URL pattern with a `:uid` placeholder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            doc_type: "posts".to_string(),
            path: "/post/:uid".to_string(),
        }
    }
}

/// utterances comment widget settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    pub script_src: String,
    /// GitHub repository holding the comment issues (`owner/name`)
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
    pub label: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            script_src: "https://utteranc.es/client.js".to_string(),
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
            label: "Utterances-comment".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Spacetraveling");
        assert_eq!(config.per_page, 4);
        assert_eq!(config.prismic.document_type, "posts");
        assert_eq!(config.route_for("posts").unwrap().path, "/post/:uid");
        assert_eq!(config.comments.issue_term, "pathname");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
per_page: 10
timezone: America/Sao_Paulo
prismic:
  endpoint: https://blog.cdn.prismic.io/api/v2
routes:
  - type: posts
    path: /blog/:uid/
comments:
  repo: someone/blog-comments
  theme: github-light
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.per_page, 10);
        assert_eq!(config.prismic.endpoint, "https://blog.cdn.prismic.io/api/v2");
        assert_eq!(config.prismic.document_type, "posts");
        assert_eq!(config.route_for("posts").unwrap().path, "/blog/:uid/");
        assert_eq!(config.comments.repo, "someone/blog-comments");
        assert_eq!(config.comments.theme, "github-light");
        assert_eq!(config.comments.issue_term, "pathname");
        assert_eq!(config.tz(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = SiteConfig::default();
        config.prismic.endpoint = "https://from-file.cdn.prismic.io/api/v2".to_string();

        config.apply_env_with(|key| match key {
            ENV_API_ENDPOINT => Some("https://from-env.cdn.prismic.io/api/v2".to_string()),
            ENV_ACCESS_TOKEN => Some("token".to_string()),
            _ => None,
        });
        assert_eq!(config.prismic.endpoint, "https://from-env.cdn.prismic.io/api/v2");
        assert_eq!(config.prismic.access_token.as_deref(), Some("token"));

        config.apply_env_with(|_| Some(String::new()));
        assert_eq!(config.prismic.endpoint, "https://from-env.cdn.prismic.io/api/v2");
    }

    #[test]
    fn test_unknown_timezone_is_utc() {
        let config = SiteConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert_eq!(config.tz(), chrono_tz::UTC);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\n").unwrap();
        assert_eq!(SiteConfig::load(&path).unwrap().title, "From Disk");
    }
}
