//! From configuration to firmware text.
//!
//! [`FirmwareGenerator`] is the seam the CLI and the web server call through.
//! [`GeminiClient`] implements it by validating the config, rendering the
//! prompt and passing the model's answer through untouched as
//! [`GeneratedFirmware::raw`]. [`GeneratedFirmware::code`] additionally holds
//! the body of the first fenced code block, which is what gets saved to disk.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::api::gemini::{GeminiClient, Generation, UsageMetadata};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::prompt::firmware_prompt;

/// Default file name for saved firmware.
pub const FIRMWARE_FILE_NAME: &str = "firmware.cpp";

/// Model output for one configuration.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeneratedFirmware {
    /// Text exactly as the model returned it.
    pub raw: String,
    /// Contents of the first fenced code block, or the trimmed raw text.
    pub code: String,
    pub model: String,
    pub usage: Option<UsageMetadata>,
}

impl GeneratedFirmware {
    pub fn from_text(raw: impl Into<String>, model: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            code: extract_code_block(&raw),
            raw,
            model: model.into(),
            usage: None,
        }
    }
}

impl From<Generation> for GeneratedFirmware {
    fn from(generation: Generation) -> Self {
        Self {
            usage: generation.usage,
            ..Self::from_text(generation.text, generation.model)
        }
    }
}

/// Return the body of the first ``` fenced block in `text`.
///
/// The opening fence may carry a language tag (` ```cpp `). An unterminated
/// block runs to the end of the text. Text without any fence is returned
/// trimmed.
pub fn extract_code_block(text: &str) -> String {
    let mut lines = text.lines();
    if !lines.any(|line| line.trim_start().starts_with("```")) {
        return text.trim().to_string();
    }

    let body: Vec<&str> = lines
        .take_while(|line| !line.trim_start().starts_with("```"))
        .collect();
    let mut code = body.join("\n");
    if !code.is_empty() {
        code.push('\n');
    }
    code
}

/// Firmware file contents: a comment header describing the build target,
/// followed by the extracted code.
pub fn render_firmware_file(
    firmware: &GeneratedFirmware,
    config: &BridgeConfig,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!(
        "// Generated by i2s-bridge ({}) at {}\n\
         // Target: {}\n\
         // Wiring: SCK -> GPIO {}, WS -> GPIO {}, SD -> GPIO {}, VDD -> 3.3V, GND -> GND\n\n",
        firmware.model,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        config.summary(),
        config.pins.bck,
        config.pins.ws,
        config.pins.sd,
    );
    out.push_str(&firmware.code);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<GeneratedFirmware>> + Send + 'a>>;

/// Something that turns a hardware configuration into firmware source.
pub trait FirmwareGenerator: Send + Sync {
    /// Generate firmware for `config`. `notes` are extra user requirements
    /// appended to the prompt.
    fn generate_firmware(&self, config: BridgeConfig, notes: Option<String>) -> GenerateFuture<'_>;
}

impl FirmwareGenerator for GeminiClient {
    fn generate_firmware(&self, config: BridgeConfig, notes: Option<String>) -> GenerateFuture<'_> {
        Box::pin(async move {
            config.validate()?;
            let prompt = firmware_prompt(&config, notes.as_deref());
            info!("Generating firmware for {}", config.summary());

            let generation = self
                .generate(&prompt)
                .await
                .inspect_err(|e| error!("Gemini API error: {e}"))?;
            Ok(GeneratedFirmware::from(generation))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn extracts_tagged_block() {
        let text = "```cpp\n#include <Arduino.h>\nvoid setup() {}\n```\n";
        assert_eq!(extract_code_block(text), "#include <Arduino.h>\nvoid setup() {}\n");
    }

    #[test]
    fn extracts_first_block_and_ignores_chatter() {
        let text = "Here you go:\n\n```\nint a;\n```\n\nAnd a test:\n```\nint b;\n```";
        assert_eq!(extract_code_block(text), "int a;\n");
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let text = "```c++\nvoid loop() {\n}";
        assert_eq!(extract_code_block(text), "void loop() {\n}\n");
    }

    #[test]
    fn text_without_fence_is_trimmed() {
        assert_eq!(extract_code_block("\n  void loop() {}  \n"), "void loop() {}");
    }

    #[test]
    fn empty_block_yields_empty_code() {
        assert_eq!(extract_code_block("```cpp\n```"), "");
    }

    #[test]
    fn raw_text_is_preserved() {
        let raw = "Sure!\n```cpp\nint x;\n```\nDone.";
        let fw = GeneratedFirmware::from_text(raw, "m");
        assert_eq!(fw.raw, raw);
        assert_eq!(fw.code, "int x;\n");
    }

    #[test]
    fn placeholder_passes_through() {
        let fw = GeneratedFirmware::from_text("// Error: No code generated.", "m");
        assert_eq!(fw.code, "// Error: No code generated.");
    }

    #[test]
    fn firmware_file_has_header_and_code() {
        let fw = GeneratedFirmware::from_text("```cpp\nvoid setup() {}\n```", "gemini-x");
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let file = render_firmware_file(&fw, &BridgeConfig::default(), at);

        assert!(file.starts_with("// Generated by i2s-bridge (gemini-x) at 2026-01-02 03:04:05 UTC\n"));
        assert!(file.contains("// Target: ESP32-S3 + INMP441"));
        assert!(file.contains("SCK -> GPIO 4, WS -> GPIO 5, SD -> GPIO 6"));
        assert!(file.ends_with("\nvoid setup() {}\n"));
    }
}
