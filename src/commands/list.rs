//! List the posts in the content repository

use anyhow::Result;

use crate::client::ContentClient;
use crate::feed::PostFeed;
use crate::helpers::format_in;
use crate::Blog;

/// Print every post, newest first, page by page
pub async fn run(blog: &Blog, client: &dyn ContentClient) -> Result<()> {
    let config = &blog.config;
    let tz = config.tz();

    let mut feed =
        PostFeed::fetch_first(client, config.prismic.document_type.as_str(), config.per_page)
            .await?;
    let pages = feed.load_all().await?;

    println!("Posts ({}):", feed.state().posts.len());
    for (i, page) in pages.iter().enumerate() {
        println!(" page {}", i + 1);
        for post in page {
            let date = post
                .first_publication_date
                .map(|d| format_in(&d, &tz, "yyyy-MM-dd"))
                .unwrap_or_else(|| "unpublished".to_string());
            println!("  {} - {} [{}] by {}", date, post.title, post.uid, post.author);
        }
    }

    Ok(())
}
