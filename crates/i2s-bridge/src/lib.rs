//! Firmware generator for I2S-microphone-to-USB-audio bridges.
//!
//! An I2S MEMS microphone cannot be plugged into a PC directly. A small
//! microcontroller with native USB (ESP32-S3 or RP2040) can bridge the two by
//! presenting itself as a standard USB Audio Class microphone, which Windows,
//! macOS and Linux drive without custom drivers. `i2s-bridge` collects the
//! hardware configuration, asks a hosted model (Google Gemini) to write the
//! bridge firmware, and hands back the source it returns. It also renders a
//! wiring diagram for the chosen pins.
//!
//! Nothing is compiled or checked locally. The model's answer is passed
//! through as-is.
//!
//! # Getting started
//!
//! ```ignore
//! use i2s_bridge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BridgeError> {
//!     let client = GenerationSettings::default().build_client(api_key_from_env()?)?;
//!
//!     let config = BridgeConfig::default().with_mcu(Mcu::Rp2040);
//!     let firmware = client.generate_firmware(config, None).await?;
//!
//!     println!("{}", firmware.code);
//!     std::fs::write("wiring.svg", render_wiring_diagram(&config))?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | [`BridgeConfig`](config::BridgeConfig): MCU, microphone, pins, audio format, validation |
//! | [`prompt`] | Prompt rendering via [`PromptBuilder`](prompt::PromptBuilder) |
//! | [`api`] | [`GeminiClient`](api::GeminiClient) and opt-in retry |
//! | [`firmware`] | [`FirmwareGenerator`](firmware::FirmwareGenerator), code-block extraction, file rendering |
//! | [`diagram`] | SVG wiring diagram |
//! | [`settings`] | Model/temperature/retry settings and API key lookup |
//! | [`error`] | [`BridgeError`](error::BridgeError) |

pub mod api;
pub mod config;
pub mod diagram;
pub mod error;
pub mod firmware;
pub mod prelude;
pub mod prompt;
pub mod settings;

// ── Constants ──────────────────────────────────────────────────────

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for firmware generation.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Low temperature keeps generated code conservative.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
