//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};
use i2s_bridge::firmware::FirmwareGenerator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;

use crate::api::{self, AppState};
use crate::state::FormState;

/// Build the full axum router.
///
/// The router serves:
/// - REST API at `/api/*`
/// - The embedded form page at `/`, or static files from `static_dir`
pub fn build_router(
    form: Arc<Mutex<FormState>>,
    generator: Arc<dyn FirmwareGenerator>,
    static_dir: Option<PathBuf>,
) -> Router {
    let app_state = AppState { form, generator };

    // CORS layer for serving the page from a different origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/api/state", get(api::get_state))
        .route("/api/options", get(api::get_options))
        .route("/api/config", post(api::post_config))
        .route("/api/diagram.svg", get(api::get_diagram))
        .route("/api/note", get(api::get_note))
        .route("/api/prompt", get(api::get_prompt))
        .route("/api/generate", post(api::post_generate))
        .route("/api/firmware.cpp", get(api::get_firmware))
        .with_state(app_state);

    let router = Router::new().merge(api_routes).layer(cors);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(api::index)),
    }
}

/// Bind the listener, start serving on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("web server stopped: {e}");
        }
    });

    Ok(addr)
}
