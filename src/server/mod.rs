//! Local preview server
//!
//! Serves the site directory as static files and answers the JSON API the
//! blog pages use for listing, searching and reading posts.

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{FrontMatter, PostHeader, PostSummary, SiteContent};
use crate::error::ContentError;
use crate::search::{all_tags, filter, SelectedTags};
use crate::theme::Theme;
use crate::Blog;

/// Shared, read-only server state
pub struct ServerState {
    content: SiteContent,
    posts: Vec<PostSummary>,
    theme: Theme,
    date_format: String,
    site_title: String,
}

impl ServerState {
    /// Load the manifest once; it is not re-read while the server runs
    pub fn load(blog: &Blog, theme: Theme) -> Result<Self, ContentError> {
        let content = SiteContent::new(blog);
        let posts = content.load_manifest()?;
        Ok(Self {
            content,
            posts,
            theme,
            date_format: blog.config.date_format.clone(),
            site_title: blog.config.title.clone(),
        })
    }
}

/// Build the application router
pub fn router(blog: &Blog, state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/tags", get(list_tags))
        .route("/api/post", get(show_post))
        .fallback_service(ServeDir::new(&blog.site_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(ServerState::load(blog, blog.theme())?);
    tracing::info!(
        "Serving {} posts from {:?}",
        state.posts.len(),
        blog.site_dir
    );
    let app = router(blog, state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Query string of `/api/posts`: `q=<text>` plus one `tag=<tag>` per selected tag
#[derive(Debug, Default)]
pub struct PostsQuery {
    pub q: String,
    pub tags: SelectedTags,
}

impl PostsQuery {
    /// Build from decoded query pairs; tags are taken verbatim, a repeated `q` keeps the last
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut q = String::new();
        let mut tags = Vec::new();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => q = value,
                "tag" => tags.push(value),
                _ => tracing::debug!("Ignoring query parameter {:?}", key),
            }
        }
        Self {
            q,
            tags: tags.into_iter().collect(),
        }
    }
}

async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Vec<PostSummary>> {
    let query = PostsQuery::from_pairs(pairs);
    let matches = filter(&state.posts, &query.q, &query.tags);
    tracing::debug!("{:?} matched {} posts", query, matches.len());
    Json(matches.into_iter().cloned().collect())
}

async fn list_tags(State(state): State<Arc<ServerState>>) -> Json<Vec<String>> {
    Json(all_tags(&state.posts))
}

/// Query string of `/api/post`
#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub file: Option<String>,
    pub theme: Option<Theme>,
}

/// A rendered post as returned by `/api/post`
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub file: String,
    pub metadata: FrontMatter,
    pub header: PostHeader,
    /// `Post | Site`, for the page's `<title>`
    pub page_title: String,
    pub html: String,
    pub theme: Theme,
}

async fn show_post(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostQuery>,
) -> Result<Json<PostResponse>, ApiError> {
    let file = query
        .file
        .filter(|f| !f.is_empty())
        .ok_or(ApiError::MissingFile)?;
    let theme = query.theme.unwrap_or(state.theme);

    let post = tokio::task::spawn_blocking(move || {
        let post = state.content.load_post(&file, theme)?;
        let header = post.header(&state.date_format);
        let page_title = header.page_title(&state.site_title);
        Ok::<_, ContentError>(PostResponse {
            file: post.file,
            metadata: post.metadata,
            header,
            page_title,
            html: post.html,
            theme,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(post))
}

/// Errors returned by the JSON API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing `file` parameter")]
    MissingFile,

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::Content(ContentError::InvalidFileName(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Content(ContentError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
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
