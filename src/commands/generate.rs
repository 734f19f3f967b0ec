//! Generate static files

use anyhow::Result;

use crate::client::ContentClient;
use crate::generator::{Generator, Report};
use crate::Blog;

/// Fetch every post and write the site
pub async fn run(blog: &Blog, client: &dyn ContentClient) -> Result<Report> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog)?;
    let report = generator.generate(client).await?;

    if report.skipped > 0 {
        tracing::warn!("{} posts skipped for lack of a usable uid", report.skipped);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} posts ({} list pages) in {:.2}s",
        report.posts,
        report.list_pages,
        duration.as_secs_f64()
    );

    Ok(report)
}
