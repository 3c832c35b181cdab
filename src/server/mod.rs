//! Preview server with live reload
//!
//! Serves the site root as static files, exposes rendered documents at
//! `/__content/<key>` and rebundles when content changes.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path as UrlPath, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::content::{ContentBundle, MarkdownRenderer};
use crate::viewer::not_found_markup;
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    site_dir: PathBuf,
    bundle: RwLock<ContentBundle>,
    renderer: MarkdownRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Bundle, then serve the site until interrupted
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let count = folio.bundle()?;
    tracing::info!("Bundled {} files", count);

    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        site_dir: folio.base_dir.clone(),
        bundle: RwLock::new(folio.load_bundle()?),
        renderer: folio.renderer(),
        reload_tx,
        live_reload: watch,
    });

    let app = router(state.clone());

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let folio = folio.clone();
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
        .route("/__livereload", get(livereload_handler))
        .route("/__content/*key", get(content_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

/// Rebundle on content or config changes, swap the served bundle, notify clients
fn watch_and_reload(folio: Folio, state: Arc<ServerState>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&folio.content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", folio.content_dir);

    let config_path = folio.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|e| {
                    let path_str = e.path.to_string_lossy();
                    !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                });
                if !relevant {
                    continue;
                }

                tracing::info!("Content changed, rebundling...");
                match rebundle(&folio.base_dir) {
                    Ok(bundle) => {
                        tracing::info!("Bundled {} files", bundle.len());
                        match state.bundle.write() {
                            Ok(mut guard) => *guard = bundle,
                            Err(e) => {
                                tracing::error!("Bundle lock poisoned: {}", e);
                                break;
                            }
                        }
                        let _ = state.reload_tx.send(());
                    }
                    Err(e) => {
                        tracing::error!("Bundling failed: {}", e);
                    }
                }
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

fn rebundle(base_dir: &std::path::Path) -> Result<ContentBundle> {
    let folio = Folio::new(base_dir)?;
    folio.bundle()?;
    folio.load_bundle()
}

/// Rendered fragment for one content key
async fn content_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(key): UrlPath<String>,
) -> Response {
    let text = match state.bundle.read() {
        Ok(bundle) => bundle.get(&key).map(str::to_string),
        Err(_) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response();
        }
    };

    match text {
        Some(text) => Html(state.renderer.render(&text)).into_response(),
        None => (StatusCode::NOT_FOUND, Html(not_found_markup(&key))).into_response(),
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

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
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

/// Serve site files, injecting the live reload script into HTML
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = match percent_decode_str(request.uri().path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => return (StatusCode::NOT_FOUND, "Not found").into_response(),
    };
    if path.split('/').any(|segment| segment == "..") {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let file_path = if path == "/" {
        state.site_dir.join("index.html")
    } else {
        let candidate = state.site_dir.join(path.trim_start_matches('/'));
        if candidate.is_dir() {
            candidate.join("index.html")
        } else {
            candidate
        }
    };

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    } else {
        let mut service = ServeDir::new(&state.site_dir).append_index_html_on_directories(true);
        match service.try_call(request).await {
            Ok(response) => response.into_response(),
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
        }
    }
}

fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}
