//! Generate I2S-to-USB-audio bridge firmware from the command line.
//!
//! Reads the API key from `GEMINI_API_KEY` (or `API_KEY`).
//!
//! # Examples
//!
//! ```sh
//! # Default board (ESP32-S3 + INMP441 on GPIO 4/5/6), print code to stdout
//! i2s-bridge
//!
//! # Pico at 16 kHz mono, save firmware and wiring diagram
//! i2s-bridge --mcu rp2040 --sample-rate 16000 --channels 1 \
//!   --output firmware.cpp --diagram wiring.svg
//!
//! # Start from a saved config and only look at the prompt
//! i2s-bridge --config board.json --dry-run
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use i2s_bridge::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Generate USB Audio Class firmware for an I2S microphone bridge.
#[derive(Parser, Debug)]
#[command(name = "i2s-bridge", version)]
struct Cli {
    // ── Hardware ───────────────────────────────────────────────
    /// JSON file with a saved hardware configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target microcontroller (esp32-s3, rp2040). Switching boards resets pins
    /// to the new board's defaults.
    #[arg(long)]
    mcu: Option<Mcu>,

    /// Microphone model (inmp441, msm261s4030, generic-i2s)
    #[arg(long)]
    mic: Option<Microphone>,

    /// GPIO for the I2S bit clock (SCK/BCK)
    #[arg(long)]
    bck: Option<u8>,

    /// GPIO for the I2S word select (WS/LRCK)
    #[arg(long)]
    ws: Option<u8>,

    /// GPIO for the I2S serial data (SD/DIN)
    #[arg(long)]
    sd: Option<u8>,

    /// Sample rate in Hz (16000, 44100, 48000)
    #[arg(long)]
    sample_rate: Option<SampleRate>,

    /// Bits per sample (16, 24, 32)
    #[arg(long)]
    bit_depth: Option<BitDepth>,

    /// Channel count (1/mono, 2/stereo)
    #[arg(long)]
    channels: Option<Channels>,

    /// DMA buffer length in samples
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Extra requirements appended to the prompt
    #[arg(long)]
    notes: Option<String>,

    // ── Model ──────────────────────────────────────────────────
    /// Gemini model to use
    #[arg(long, default_value = i2s_bridge::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = i2s_bridge::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum output tokens
    #[arg(long)]
    max_output_tokens: Option<u32>,

    /// API base URL
    #[arg(long, default_value = i2s_bridge::GEMINI_BASE_URL)]
    base_url: String,

    /// Retries for rate-limit and server errors
    #[arg(long, default_value_t = 0)]
    retries: u32,

    // ── Output ─────────────────────────────────────────────────
    /// Write the firmware (with a header comment) to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write the SVG wiring diagram to this file
    #[arg(long)]
    diagram: Option<PathBuf>,

    /// Print the model's text unmodified instead of the extracted code
    #[arg(long)]
    raw: bool,

    /// Print the prompt and exit without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            base_url: self.base_url.clone(),
            retries: self.retries,
        }
    }

    /// Config file (or defaults), then flags on top.
    fn resolve_config(&self) -> Result<BridgeConfig, BridgeError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BridgeConfig::default(),
        };

        if let Some(mcu) = self.mcu
            && mcu != config.mcu
        {
            config.set_mcu(mcu);
        }
        if let Some(mic) = self.mic {
            config.mic = mic;
        }
        if let Some(pin) = self.bck {
            config.pins.bck = pin;
        }
        if let Some(pin) = self.ws {
            config.pins.ws = pin;
        }
        if let Some(pin) = self.sd {
            config.pins.sd = pin;
        }
        if let Some(rate) = self.sample_rate {
            config.audio.sample_rate = rate;
        }
        if let Some(depth) = self.bit_depth {
            config.audio.bit_depth = depth;
        }
        if let Some(channels) = self.channels {
            config.audio.channels = channels;
        }
        if let Some(size) = self.buffer_size {
            config.audio.buffer_size = size;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<BridgeConfig, BridgeError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| BridgeError::InvalidConfig(format!("{}: {e}", path.display())))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), BridgeError> {
    let config = cli.resolve_config()?;
    debug!("Resolved config: {}", config.summary());

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(path) = &cli.diagram {
        std::fs::write(path, render_wiring_diagram(&config))?;
        info!("Wrote wiring diagram to {}", path.display());
    }

    if cli.dry_run {
        println!("{}", firmware_prompt(&config, cli.notes.as_deref()));
        return Ok(());
    }

    let client = cli.settings().build_client(api_key_from_env()?)?;
    let firmware = client.generate_firmware(config, cli.notes.clone()).await?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, render_firmware_file(&firmware, &config, Utc::now()))?;
            info!("Wrote firmware to {}", path.display());
        }
        None if cli.raw => println!("{}", firmware.raw),
        None => print!("{}", firmware.code),
    }

    if let Some(usage) = firmware.usage {
        eprintln!(
            "--- {} | {} prompt + {} output = {} tokens ---",
            firmware.model,
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count
        );
    }
    eprintln!("{}", connection_note(config.mcu));

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
