//! Development server with live reload
//!
//! Every request recomposes its page, so post edits show up on the next
//! load. File changes additionally push a reload to connected browsers.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::Composer;
use crate::templates::STYLESHEET;
use crate::Folio;

/// Server state
struct ServerState {
    composer: RwLock<Arc<Composer>>,
    /// Post assets are served straight from the source directory
    assets_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
}

impl ServerState {
    async fn composer(&self) -> Arc<Composer> {
        self.composer.read().await.clone()
    }
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let composer = Composer::new(folio)?.with_live_reload(watch);
    let state = Arc::new(ServerState {
        composer: RwLock::new(Arc::new(composer)),
        assets_dir: folio.source_dir.clone(),
        reload_tx,
    });

    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let folio = folio.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(folio, state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/__livereload", get(livereload_handler))
        .route("/css/style.css", get(stylesheet_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .route("/:section", get(section_handler))
        .route("/:section/", get(section_handler))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch sources and config; reload the composer and notify browsers
fn watch_and_reload(folio: Folio, state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&folio.source_dir, &folio.index_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }
    for section in &folio.config.sections {
        if let Some(file) = &section.content {
            let path = folio.base_dir.join(file);
            if path.exists() {
                debouncer
                    .watcher()
                    .watch(&path, RecursiveMode::NonRecursive)?;
                tracing::debug!("Watching: {:?}", path);
            }
        }
    }
    let config_path = folio.config_path();
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out irrelevant events (like .git, .DS_Store, etc.)
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }
                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if relevant.iter().any(|e| e.path.ends_with("_config.yml")) {
                    match Folio::new(&folio.base_dir).and_then(|f| Composer::new(&f)) {
                        Ok(composer) => {
                            *state.composer.blocking_write() =
                                Arc::new(composer.with_live_reload(true));
                            tracing::info!("Reloaded configuration");
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                            continue;
                        }
                    }
                }

                // Notify all connected clients to reload
                let _ = state.reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let composer = state.composer().await;
    let default = composer.config().default_section.clone();
    page_response(composer.render_section(&default).await)
}

async fn section_handler(
    State(state): State<Arc<ServerState>>,
    Path(section): Path<String>,
    request: Request<Body>,
) -> Response {
    let composer = state.composer().await;
    if !composer.config().has_section(&section) {
        // Not a section: maybe an asset at the top level
        return serve_asset(&state, request).await;
    }
    page_response(composer.render_section(&section).await)
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let composer = state.composer().await;
    if !composer.config().index.enable {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    page_response(composer.render_indexed_post(&slug).await)
}

async fn stylesheet_handler() -> Response {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET).into_response()
}

async fn static_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    serve_asset(&state, request).await
}

/// Serve a file from the source directory using tower-http
async fn serve_asset(state: &ServerState, request: Request<Body>) -> Response {
    let path = request.uri().path();
    if path.ends_with(".md") || path.ends_with(".markdown") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let mut service = ServeDir::new(&state.assets_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

fn page_response(page: Result<String>) -> Response {
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
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
