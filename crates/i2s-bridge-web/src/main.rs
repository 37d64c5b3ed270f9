//! Serve the firmware configuration form in a browser.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p i2s-bridge-web
//! GEMINI_API_KEY=... cargo run -p i2s-bridge-web -- --port 8080
//! GEMINI_API_KEY=... cargo run -p i2s-bridge-web -- --model gemini-2.5-pro --retries 2
//! ```
//!
//! Then open the printed URL. The API can also be driven directly:
//!
//! ```bash
//! curl -X POST localhost:3001/api/config -H 'content-type: application/json' \
//!   -d '{"mcu":"rp2040","sample_rate":16000}'
//! curl -X POST localhost:3001/api/generate
//! curl localhost:3001/api/firmware.cpp -o firmware.cpp
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use i2s_bridge::prelude::*;
use i2s_bridge_web::{FormState, WebConfig, spawn_web};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Browser form for generating I2S-to-USB-audio bridge firmware.
#[derive(Parser)]
#[command(name = "i2s-bridge-web", version)]
struct Args {
    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Listen on all interfaces instead of localhost only.
    #[arg(long)]
    public: bool,

    /// Serve this directory instead of the built-in page.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Gemini model to use.
    #[arg(long, default_value = i2s_bridge::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature.
    #[arg(long, default_value_t = i2s_bridge::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum output tokens.
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// API base URL.
    #[arg(long, default_value = i2s_bridge::GEMINI_BASE_URL)]
    base_url: String,

    /// Retries for rate-limit and server errors.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

async fn run(args: Args) -> Result<(), BridgeError> {
    let settings = GenerationSettings {
        model: args.model,
        temperature: args.temperature,
        max_output_tokens: args.max_output_tokens,
        base_url: args.base_url,
        retries: args.retries,
    };
    let client = settings.build_client(api_key_from_env()?)?;

    let host: [u8; 4] = if args.public {
        [0, 0, 0, 0]
    } else {
        [127, 0, 0, 1]
    };
    let web_config = WebConfig {
        bind_addr: (host, args.port).into(),
        static_dir: args.static_dir,
    };

    let form = Arc::new(Mutex::new(FormState::default()));
    let addr = spawn_web(form, Arc::new(client), web_config).await?;
    println!("Configuration form: http://{addr}");
    info!("Using model {}", settings.model);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
