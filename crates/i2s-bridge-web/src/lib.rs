//! Browser-based configuration form for `i2s-bridge`.
//!
//! `i2s-bridge-web` serves a single-page form (board, microphone, pins,
//! sample rate) together with a small REST API. The page shows the wiring
//! diagram for the current pins and, on request, the firmware the model
//! generates for them.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use i2s_bridge::prelude::*;
//! use i2s_bridge_web::{FormState, WebConfig, spawn_web};
//!
//! let client = GenerationSettings::default().build_client(api_key_from_env()?)?;
//! let form = Arc::new(Mutex::new(FormState::default()));
//!
//! let addr = spawn_web(form, Arc::new(client), WebConfig::default()).await?;
//! println!("Form: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! browser ──/api/config──▶ Arc<Mutex<FormState>> ◀──/api/state, /api/diagram.svg── browser
//!                                   │
//! browser ──/api/generate──▶ FirmwareGenerator (Gemini) ──▶ FormState.firmware
//! ```
//!
//! The generator is a trait object so tests and alternative backends can
//! stand in for the Gemini client.

mod api;
mod server;
pub mod state;

pub use state::{FormSnapshot, FormState};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use i2s_bridge::firmware::FirmwareGenerator;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Directory to serve instead of the built-in page.
    ///
    /// If `None`, `/` serves the embedded form.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            static_dir: None,
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `form`: Shared form state. Callers may pre-seed it or inspect it later.
/// * `generator`: Backend used by `POST /api/generate`.
/// * `config`: Server configuration.
pub async fn spawn_web(
    form: Arc<Mutex<FormState>>,
    generator: Arc<dyn FirmwareGenerator>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = server::build_router(form, generator, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
