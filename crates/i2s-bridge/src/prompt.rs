//! Firmware-generation prompt.
//!
//! [`firmware_prompt`] turns a [`BridgeConfig`] into the instruction text sent
//! to the model. Assembly goes through [`PromptBuilder`], which joins headed
//! sections with blank lines and drops empty ones.

use crate::config::{BridgeConfig, Mcu};

/// Builder for sectioned prompts.
///
/// ```
/// use i2s_bridge::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new("You write firmware.")
///     .section("Target", "RP2040")
///     .section_if(false, "Hidden", || "never rendered".into())
///     .section_opt("Notes", None::<String>)
///     .build();
///
/// assert_eq!(prompt, "You write firmware.\n\n## Target\n\nRP2040");
/// ```
pub struct PromptBuilder {
    sections: Vec<String>,
}

impl PromptBuilder {
    /// Start with a preamble that is emitted without a heading.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a `## heading` section. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.trim().is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Append a section only when `condition` holds. `content_fn` is not
    /// called otherwise.
    pub fn section_if(
        self,
        condition: bool,
        heading: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(heading, content_fn())
        } else {
            self
        }
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

const PREAMBLE: &str = "\
You are an expert Embedded Systems Engineer specializing in USB Audio Class (UAC) implementation.
Your task is to write complete, professional, and optimized C++ firmware code.";

const GOAL: &str = "\
Create a firmware that reads audio from an I2S microphone and sends it to a PC via USB as a \
standard USB Microphone.
CRITICAL: The device must appear in Windows as a standard audio input device WITHOUT \
requiring any custom drivers (Plug & Play).";

const ESP32_S3_GUIDANCE: &str = "\
Use the ESP-IDF or Arduino 'USB' library with the 'USB Audio' class features. Prefer the \
'EspTinyUSB' or native ESP32-S3 USB capabilities.";

const RP2040_GUIDANCE: &str = "\
Use the 'Adafruit TinyUSB' library and an 'I2S' PIO implementation or the 'Pico Audio' library.";

const REQUIREMENTS: &str = "\
1. The code must be production-ready, handling buffering correctly to avoid audio glitches or drift.
2. Include comments explaining how to compile (e.g., \"Select 'USB Mode: OTG/TinyUSB' in Arduino IDE\").
3. Provide ONLY the code within a C++ code block. No conversational filler before or after the code block.";

/// Board-specific library guidance.
pub fn board_guidance(mcu: Mcu) -> &'static str {
    match mcu {
        Mcu::Esp32S3 => ESP32_S3_GUIDANCE,
        Mcu::Rp2040 => RP2040_GUIDANCE,
    }
}

/// Render the generation prompt for `config`.
///
/// `notes` carries free-form extra requirements from the user and becomes its
/// own section when present.
pub fn firmware_prompt(config: &BridgeConfig, notes: Option<&str>) -> String {
    let target = format!(
        "Target Hardware: {}\nMicrophone: {}",
        config.mcu.label(),
        config.mic.label()
    );

    let pins = format!(
        "- I2S Bit Clock (BCK/SCK): GPIO {}\n\
         - I2S Word Select (WS/LRCK): GPIO {}\n\
         - I2S Serial Data (SD/DIN): GPIO {}",
        config.pins.bck, config.pins.ws, config.pins.sd
    );

    let audio = &config.audio;
    let audio_settings = format!(
        "- Sample Rate: {} Hz\n\
         - Bit Depth: {}-bit\n\
         - Channels: {}\n\
         - DMA Buffer: {} samples",
        audio.sample_rate.hz(),
        audio.bit_depth.bits(),
        audio.channels.count(),
        audio.buffer_size
    );

    PromptBuilder::new(PREAMBLE)
        .section("Goal", GOAL)
        .section("Target", target)
        .section("Pins Configuration", pins)
        .section("Audio Settings", audio_settings)
        .section(
            &format!("{} Libraries", config.mcu.short_name()),
            board_guidance(config.mcu),
        )
        .section("Requirements", REQUIREMENTS)
        .section_opt("Additional Requirements", notes.filter(|n| !n.trim().is_empty()))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Channels, Microphone, SampleRate};

    #[test]
    fn builder_skips_empty_sections() {
        let prompt = PromptBuilder::new("P")
            .section("Empty", "  ")
            .section("Present", "yes")
            .build();
        assert_eq!(prompt, "P\n\n## Present\n\nyes");
    }

    #[test]
    fn builder_section_if_is_lazy() {
        let prompt = PromptBuilder::new("P")
            .section_if(false, "Never", || panic!("must not be evaluated"))
            .section_if(true, "Shown", || "content".into())
            .build();
        assert!(prompt.contains("## Shown\n\ncontent"));
        assert!(!prompt.contains("Never"));
    }

    #[test]
    fn prompt_embeds_hardware_and_pins() {
        let prompt = firmware_prompt(&BridgeConfig::default(), None);
        assert!(prompt.starts_with("You are an expert Embedded Systems Engineer"));
        assert!(prompt.contains("Target Hardware: ESP32-S3 (Native USB)"));
        assert!(prompt.contains("Microphone: INMP441 (Omnidirectional)"));
        assert!(prompt.contains("I2S Bit Clock (BCK/SCK): GPIO 4"));
        assert!(prompt.contains("I2S Word Select (WS/LRCK): GPIO 5"));
        assert!(prompt.contains("I2S Serial Data (SD/DIN): GPIO 6"));
        assert!(prompt.contains("WITHOUT requiring any custom drivers"));
    }

    #[test]
    fn prompt_embeds_audio_settings() {
        let mut config = BridgeConfig::default();
        config.audio.sample_rate = SampleRate::Hz16000;
        config.audio.channels = Channels::Mono;
        let prompt = firmware_prompt(&config, None);
        assert!(prompt.contains("Sample Rate: 16000 Hz"));
        assert!(prompt.contains("Bit Depth: 32-bit"));
        assert!(prompt.contains("Channels: 1"));
        assert!(prompt.contains("DMA Buffer: 1024 samples"));
    }

    #[test]
    fn prompt_carries_only_the_selected_board_guidance() {
        let esp = firmware_prompt(&BridgeConfig::default(), None);
        assert!(esp.contains("## ESP32-S3 Libraries"));
        assert!(esp.contains("EspTinyUSB"));
        assert!(!esp.contains("Adafruit TinyUSB"));

        let rp = firmware_prompt(&BridgeConfig::default().with_mcu(Mcu::Rp2040), None);
        assert!(rp.contains("Target Hardware: Raspberry Pi Pico (RP2040)"));
        assert!(rp.contains("GPIO 10"));
        assert!(rp.contains("Adafruit TinyUSB"));
        assert!(!rp.contains("EspTinyUSB"));
    }

    #[test]
    fn prompt_demands_code_only_output() {
        let prompt = firmware_prompt(&BridgeConfig::default(), None);
        assert!(prompt.contains("Provide ONLY the code within a C++ code block"));
    }

    #[test]
    fn notes_become_a_section() {
        let config = BridgeConfig {
            mic: Microphone::GenericI2s,
            ..Default::default()
        };
        let prompt = firmware_prompt(&config, Some("Add a mute button on GPIO 0."));
        assert!(prompt.ends_with("## Additional Requirements\n\nAdd a mute button on GPIO 0."));

        let blank = firmware_prompt(&config, Some("   "));
        assert!(!blank.contains("Additional Requirements"));
    }
}
