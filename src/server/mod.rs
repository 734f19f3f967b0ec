//! Preview server
//!
//! Serves the generated site and renders posts that are missing from the
//! output on first request. With `revalidate` set, the whole site is
//! regenerated in the background at that interval.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::client::ContentClient;
use crate::detail;
use crate::generator::Generator;
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    client: Arc<dyn ContentClient>,
    /// Held while anything writes to the public directory
    write_lock: Mutex<()>,
}

impl ServerState {
    pub fn new(blog: Blog, client: Arc<dyn ContentClient>) -> Self {
        Self {
            blog,
            client,
            write_lock: Mutex::new(()),
        }
    }

    /// Regenerate the whole site
    pub async fn regenerate(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let report = Generator::new(&self.blog)?
            .generate(self.client.as_ref())
            .await?;
        tracing::info!("Regenerated {} posts", report.posts);
        Ok(())
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let config = &state.blog.config;
    let static_files =
        ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);

    let mut posts = Router::new();
    if let Some(route) = config.route_for(&config.prismic.document_type) {
        posts = posts.route(&route.path, get(post_handler));
    } else {
        tracing::warn!(
            "No route for {:?}, posts are only served from disk",
            config.prismic.document_type
        );
    }

    let root = config.root.trim_end_matches('/');
    let app = if root.is_empty() {
        posts
    } else {
        Router::new().nest(root, posts)
    };

    app.fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(
    blog: Blog,
    client: Arc<dyn ContentClient>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let revalidate = blog.config.revalidate;
    let state = Arc::new(ServerState::new(blog, client));
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if revalidate > 0 {
        println!("Regenerating every {}s.", revalidate);
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if revalidate > 0 {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(revalidate));
            // The first tick completes immediately and the site was just built
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = state.regenerate().await {
                    tracing::error!("Regeneration failed, keeping previous output: {:#}", e);
                }
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a post page, rendering it on first request when missing
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
) -> Response {
    match serve_post(&state, &uid).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to serve post {:?}: {:#}", uid, e);
            (StatusCode::BAD_GATEWAY, "Failed to load post").into_response()
        }
    }
}

async fn serve_post(state: &ServerState, uid: &str) -> Result<Response> {
    let generator = Generator::new(&state.blog)?;

    let Some(path) = generator.post_output_path(uid) else {
        return not_found(&generator, uid);
    };
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        return Ok(Html(html).into_response());
    }

    let doc_type = &state.blog.config.prismic.document_type;
    let page = match detail::load_post(state.client.as_ref(), doc_type, uid).await {
        Ok(page) => page,
        Err(e) if e.is_not_found() => return not_found(&generator, uid),
        Err(e) => return Err(e.into()),
    };

    let html = generator.renderer().render_post(&page)?;
    {
        let _guard = state.write_lock.lock().await;
        generator.write_post_page(&page)?;
    }
    tracing::info!("Rendered post on demand: {}", uid);

    Ok(Html(html).into_response())
}

fn not_found(generator: &Generator<'_>, uid: &str) -> Result<Response> {
    let html = generator.renderer().render_not_found(Some(uid))?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{test_post, MemoryClient};
    use crate::config::SiteConfig;

    fn state(dir: &std::path::Path) -> (Arc<ServerState>, Arc<MemoryClient>) {
        let client = Arc::new(MemoryClient::new(vec![
            test_post("first", 1),
            test_post("second", 2),
        ]));
        let blog = Blog::with_config(dir, SiteConfig::default());
        (Arc::new(ServerState::new(blog, client.clone())), client)
    }

    async fn get_post(state: &Arc<ServerState>, uid: &str) -> Response {
        post_handler(State(state.clone()), Path(uid.to_string())).await
    }

    #[tokio::test]
    async fn test_missing_post_is_rendered_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(dir.path());

        let response = get_post(&state, "second").await;
        assert_eq!(response.status(), StatusCode::OK);

        let written = dir.path().join("public/post/second/index.html");
        let html = std::fs::read_to_string(written).unwrap();
        assert!(html.contains("Title second"));
        assert!(html.contains(r#"href="/post/first""#));
    }

    #[tokio::test]
    async fn test_existing_page_is_served_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let (state, client) = state(dir.path());

        get_post(&state, "first").await;
        let after_first = client.request_count();

        let response = get_post(&state, "first").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.request_count(), after_first);
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(dir.path());

        let response = get_post(&state, "ghost").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!dir.path().join("public/post/ghost").exists());

        let response = get_post(&state, "..").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleted_post_is_not_found_after_regenerate() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());

        let before = ServerState::new(
            blog.clone(),
            Arc::new(MemoryClient::new(vec![test_post("keep", 1), test_post("gone", 2)])),
        );
        before.regenerate().await.unwrap();
        assert!(dir.path().join("public/post/gone/index.html").exists());

        let after = Arc::new(ServerState::new(
            blog,
            Arc::new(MemoryClient::new(vec![test_post("keep", 1)])),
        ));
        after.regenerate().await.unwrap();

        let response = get_post(&after, "gone").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = get_post(&after, "keep").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_regenerate_writes_site() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(dir.path());

        state.regenerate().await.unwrap();
        assert!(dir.path().join("public/index.html").exists());
        assert!(dir.path().join("public/post/first/index.html").exists());
    }
}
