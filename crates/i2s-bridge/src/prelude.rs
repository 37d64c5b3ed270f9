//! Convenience re-exports for the common `i2s-bridge` types.
//!
//! ```ignore
//! use i2s_bridge::prelude::*;
//! ```

pub use crate::api::{GeminiClient, RetryConfig};
pub use crate::config::{
    AudioConfig, BitDepth, BridgeConfig, Channels, Mcu, Microphone, PinConfig, PinRole,
    SampleRate,
};
pub use crate::diagram::{connection_note, render_wiring_diagram};
pub use crate::error::{BridgeError, GENERATION_FAILED_MESSAGE};
pub use crate::firmware::{
    FIRMWARE_FILE_NAME, FirmwareGenerator, GeneratedFirmware, extract_code_block,
    render_firmware_file,
};
pub use crate::prompt::firmware_prompt;
pub use crate::settings::{GenerationSettings, api_key_from_env};
