//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists, refusing to overwrite it", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("source/css"))?;
    fs::create_dir_all(target_dir.join("source/images"))?;
    fs::create_dir_all(target_dir.join("fixtures"))?;

    let config_content = r#"# Site
title: Spacetraveling
description: ''
author: ''
language: pt-BR
timezone: ''

# URL
url: http://localhost:4000
root: /
routes:
  - type: posts
    path: /post/:uid

# Directory
source_dir: source
public_dir: public

# Date / Time format (date-fns tokens)
date_format: dd MMM yyyy
time_format: HH:mm

# Pagination
per_page: 4

# Seconds between regenerations while serving, 0 disables
revalidate: 172800

# Content repository. The endpoint and token may also come from
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN.
prismic:
  endpoint: ''
  document_type: posts

# utterances comments
comments:
  enable: true
  repo: ''
  issue_term: pathname
  theme: github-dark
  label: Utterances-comment
"#;

    fs::write(&config_path, config_content)?;

    let stylesheet = r#"body { margin: 0; background: #1a1d23; color: #d7d7d7; font-family: Inter, sans-serif; }
.container { max-width: 720px; margin: 0 auto; padding: 0 1rem; }
.header { max-width: 720px; margin: 0 auto; padding: 4rem 1rem 2rem; }
.post-item { display: block; color: inherit; text-decoration: none; margin-bottom: 3rem; }
.post-item h2 { color: #f8f8f8; }
.post-info { display: flex; gap: 1.5rem; color: #bbbbbb; font-size: 0.875rem; }
.load-more { background: none; border: none; color: #ff57b2; font-size: 1.125rem; cursor: pointer; }
.load-more.failed { color: #e94e4e; }
.post-banner { width: 100%; max-height: 400px; object-fit: cover; }
.post-edited { font-style: italic; color: #bbbbbb; }
.divider { max-width: 720px; margin: 4rem auto 3rem; border-top: 1px solid #4b4b4b; }
.post-links { display: flex; justify-content: space-between; }
.post-links a { color: #ff57b2; }
.next-post { text-align: right; }
"#;
    fs::write(target_dir.join("source/css/style.css"), stylesheet)?;

    let logo = r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="26" viewBox="0 0 240 26"><text x="0" y="20" fill="#ff57b2" font-family="Inter, sans-serif" font-size="22">spacetraveling.</text></svg>
"##;
    fs::write(target_dir.join("source/images/logo.svg"), logo)?;

    // Sample content for offline builds (--fixtures fixtures/posts.json)
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S+0000");
    let fixtures = format!(
        r#"[
  {{
    "id": "sample-hello-world",
    "uid": "hello-world",
    "type": "posts",
    "first_publication_date": "{now}",
    "last_publication_date": "{now}",
    "data": {{
      "title": "Hello World",
      "subtitle": "Your very first post",
      "author": "Spacetraveling",
      "banner": {{ "url": null }},
      "content": [
        {{
          "heading": "Quick start",
          "body": [
            {{ "type": "paragraph", "text": "Point prismic.endpoint at your repository and run spacetraveling generate." }}
          ]
        }}
      ]
    }}
  }}
]
"#
    );
    fs::write(target_dir.join("fixtures/posts.json"), fixtures)?;

    Ok(())
}
