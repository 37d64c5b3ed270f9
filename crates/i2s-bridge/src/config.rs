//! Hardware configuration record: target MCU, microphone, I2S pin
//! assignment and audio format.
//!
//! [`BridgeConfig`] is the flat record the form edits and the prompt is
//! rendered from. Every enum has a stable kebab-case identifier used on the
//! command line and in JSON, and a human label used in prompts and the UI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Largest buffer size accepted by [`BridgeConfig::validate`].
pub const MAX_BUFFER_SIZE: u32 = 8192;

// ── MCU ────────────────────────────────────────────────────────────

/// Target microcontroller. Both have native USB device support.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mcu {
    #[default]
    #[serde(rename = "esp32-s3")]
    Esp32S3,
    #[serde(rename = "rp2040")]
    Rp2040,
}

impl Mcu {
    pub const ALL: [Mcu; 2] = [Mcu::Esp32S3, Mcu::Rp2040];

    pub fn id(self) -> &'static str {
        match self {
            Mcu::Esp32S3 => "esp32-s3",
            Mcu::Rp2040 => "rp2040",
        }
    }

    /// Full label shown in the form and embedded in the prompt.
    pub fn label(self) -> &'static str {
        match self {
            Mcu::Esp32S3 => "ESP32-S3 (Native USB)",
            Mcu::Rp2040 => "Raspberry Pi Pico (RP2040)",
        }
    }

    /// Chip name printed on the wiring diagram.
    pub fn short_name(self) -> &'static str {
        match self {
            Mcu::Esp32S3 => "ESP32-S3",
            Mcu::Rp2040 => "RP2040",
        }
    }

    /// Highest usable GPIO number.
    pub fn max_gpio(self) -> u8 {
        match self {
            Mcu::Esp32S3 => 48,
            Mcu::Rp2040 => 29,
        }
    }
}

impl fmt::Display for Mcu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mcu {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esp32-s3" | "esp32s3" => Ok(Mcu::Esp32S3),
            "rp2040" | "pico" => Ok(Mcu::Rp2040),
            other => Err(format!(
                "unknown MCU '{other}' (expected one of: esp32-s3, rp2040)"
            )),
        }
    }
}

// ── Microphone ─────────────────────────────────────────────────────

/// I2S MEMS microphone model.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Microphone {
    #[default]
    Inmp441,
    Msm261s4030,
    GenericI2s,
}

impl Microphone {
    pub const ALL: [Microphone; 3] = [
        Microphone::Inmp441,
        Microphone::Msm261s4030,
        Microphone::GenericI2s,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Microphone::Inmp441 => "inmp441",
            Microphone::Msm261s4030 => "msm261s4030",
            Microphone::GenericI2s => "generic-i2s",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Microphone::Inmp441 => "INMP441 (Omnidirectional)",
            Microphone::Msm261s4030 => "MSM261S4030 (High Sensitivity)",
            Microphone::GenericI2s => "Generic I2S Philips Standard",
        }
    }

    /// Part name printed on the microphone board in the wiring diagram.
    pub fn short_name(self) -> &'static str {
        match self {
            Microphone::Inmp441 => "INMP441",
            Microphone::Msm261s4030 => "MSM261S4030",
            Microphone::GenericI2s => "I2S MIC",
        }
    }
}

impl fmt::Display for Microphone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Microphone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inmp441" => Ok(Microphone::Inmp441),
            "msm261s4030" => Ok(Microphone::Msm261s4030),
            "generic-i2s" | "generic" => Ok(Microphone::GenericI2s),
            other => Err(format!(
                "unknown microphone '{other}' (expected one of: inmp441, msm261s4030, generic-i2s)"
            )),
        }
    }
}

// ── Pins ───────────────────────────────────────────────────────────

/// The three I2S signals wired between microphone and MCU.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    /// Bit clock (BCK / SCK).
    Bck,
    /// Word select (WS / LRCK).
    Ws,
    /// Serial data (SD / DIN).
    Sd,
}

impl PinRole {
    pub const ALL: [PinRole; 3] = [PinRole::Bck, PinRole::Ws, PinRole::Sd];

    pub fn label(self) -> &'static str {
        match self {
            PinRole::Bck => "SCK/BCK",
            PinRole::Ws => "WS/LRCK",
            PinRole::Sd => "SD/DIN",
        }
    }
}

/// GPIO assignment for the I2S bus.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinConfig {
    pub bck: u8,
    pub ws: u8,
    pub sd: u8,
}

impl PinConfig {
    /// Known-good pins for each board.
    pub fn default_for(mcu: Mcu) -> Self {
        match mcu {
            Mcu::Esp32S3 => Self {
                bck: 4,
                ws: 5,
                sd: 6,
            },
            Mcu::Rp2040 => Self {
                bck: 10,
                ws: 11,
                sd: 12,
            },
        }
    }

    pub fn get(&self, role: PinRole) -> u8 {
        match role {
            PinRole::Bck => self.bck,
            PinRole::Ws => self.ws,
            PinRole::Sd => self.sd,
        }
    }

    /// Set a pin from user input. Input that does not parse as a GPIO number
    /// is ignored and the previous value kept. Returns whether the pin changed.
    pub fn set(&mut self, role: PinRole, input: &str) -> bool {
        let Ok(pin) = input.trim().parse::<u8>() else {
            return false;
        };
        let slot = match role {
            PinRole::Bck => &mut self.bck,
            PinRole::Ws => &mut self.ws,
            PinRole::Sd => &mut self.sd,
        };
        *slot = pin;
        true
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self::default_for(Mcu::default())
    }
}

// ── Audio format ───────────────────────────────────────────────────

/// Sample rates offered by the form.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum SampleRate {
    Hz16000,
    Hz44100,
    #[default]
    Hz48000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 3] = [SampleRate::Hz16000, SampleRate::Hz44100, SampleRate::Hz48000];

    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz16000 => 16_000,
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
        }
    }

    /// What the rate is typically used for.
    pub fn description(self) -> &'static str {
        match self {
            SampleRate::Hz16000 => "Voice",
            SampleRate::Hz44100 => "CD",
            SampleRate::Hz48000 => "DVD/Standard",
        }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = String;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            16_000 => Ok(SampleRate::Hz16000),
            44_100 => Ok(SampleRate::Hz44100),
            48_000 => Ok(SampleRate::Hz48000),
            other => Err(format!(
                "unsupported sample rate {other} Hz (expected 16000, 44100 or 48000)"
            )),
        }
    }
}

impl From<SampleRate> for u32 {
    fn from(rate: SampleRate) -> Self {
        rate.hz()
    }
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hz: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid sample rate '{s}'"))?;
        SampleRate::try_from(hz)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz ({})", self.hz(), self.description())
    }
}

/// Bits per sample.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitDepth {
    Bits16,
    Bits24,
    #[default]
    Bits32,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Bits16 => 16,
            BitDepth::Bits24 => 24,
            BitDepth::Bits32 => 32,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(BitDepth::Bits16),
            24 => Ok(BitDepth::Bits24),
            32 => Ok(BitDepth::Bits32),
            other => Err(format!("unsupported bit depth {other} (expected 16, 24 or 32)")),
        }
    }
}

impl From<BitDepth> for u8 {
    fn from(depth: BitDepth) -> Self {
        depth.bits()
    }
}

impl FromStr for BitDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid bit depth '{s}'"))?;
        BitDepth::try_from(bits)
    }
}

/// Channel count.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Channels {
    Mono,
    #[default]
    Stereo,
}

impl Channels {
    pub fn count(self) -> u8 {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }
}

impl TryFrom<u8> for Channels {
    type Error = String;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            other => Err(format!("unsupported channel count {other} (expected 1 or 2)")),
        }
    }
}

impl From<Channels> for u8 {
    fn from(channels: Channels) -> Self {
        channels.count()
    }
}

impl FromStr for Channels {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "mono" => Ok(Channels::Mono),
            "2" | "stereo" => Ok(Channels::Stereo),
            other => Err(format!("invalid channel count '{other}'")),
        }
    }
}

/// Audio stream format presented over USB.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: SampleRate,
    pub bit_depth: BitDepth,
    pub channels: Channels,
    /// DMA buffer length in samples.
    pub buffer_size: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::Hz48000,
            bit_depth: BitDepth::Bits32,
            channels: Channels::Stereo,
            buffer_size: 1024,
        }
    }
}

// ── Full record ────────────────────────────────────────────────────

/// Everything the form collects.
///
/// Deserialization accepts partial records. When `pins` is omitted the
/// selected MCU's default pins are used.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(from = "PartialBridgeConfig")]
pub struct BridgeConfig {
    pub mcu: Mcu,
    pub mic: Microphone,
    pub pins: PinConfig,
    pub audio: AudioConfig,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialBridgeConfig {
    mcu: Mcu,
    mic: Microphone,
    pins: Option<PinConfig>,
    audio: AudioConfig,
}

impl From<PartialBridgeConfig> for BridgeConfig {
    fn from(raw: PartialBridgeConfig) -> Self {
        Self {
            mcu: raw.mcu,
            mic: raw.mic,
            pins: raw.pins.unwrap_or_else(|| PinConfig::default_for(raw.mcu)),
            audio: raw.audio,
        }
    }
}

impl BridgeConfig {
    /// Builder-style MCU change. Pins are reset to the new board's defaults.
    pub fn with_mcu(mut self, mcu: Mcu) -> Self {
        self.set_mcu(mcu);
        self
    }

    /// Change the target MCU, resetting pins to its defaults.
    pub fn set_mcu(&mut self, mcu: Mcu) {
        self.mcu = mcu;
        self.pins = PinConfig::default_for(mcu);
    }

    /// Check that the pin assignment is usable on the selected board and
    /// the buffer size is sane. All problems are reported together.
    pub fn validate(&self) -> Result<(), BridgeError> {
        let mut problems = Vec::new();
        let max = self.mcu.max_gpio();

        for role in PinRole::ALL {
            let pin = self.pins.get(role);
            if pin > max {
                problems.push(format!(
                    "{} pin GPIO {pin} is out of range for {} (0..={max})",
                    role.label(),
                    self.mcu.short_name()
                ));
            }
        }

        let PinConfig { bck, ws, sd } = self.pins;
        if bck == ws || bck == sd || ws == sd {
            problems.push(format!(
                "I2S pins must be distinct (BCK={bck}, WS={ws}, SD={sd})"
            ));
        }

        let size = self.audio.buffer_size;
        if size == 0 || !size.is_power_of_two() || size > MAX_BUFFER_SIZE {
            problems.push(format!(
                "buffer size {size} must be a power of two between 1 and {MAX_BUFFER_SIZE}"
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BridgeError::InvalidConfig(problems.join("; ")))
        }
    }

    /// One-line description used in log messages and file headers.
    pub fn summary(&self) -> String {
        format!(
            "{} + {}, BCK={} WS={} SD={}, {} Hz / {}-bit / {}ch",
            self.mcu.short_name(),
            self.mic.short_name(),
            self.pins.bck,
            self.pins.ws,
            self.pins.sd,
            self.audio.sample_rate.hz(),
            self.audio.bit_depth.bits(),
            self.audio.channels.count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_initial_state() {
        let config = BridgeConfig::default();
        assert_eq!(config.mcu, Mcu::Esp32S3);
        assert_eq!(config.mic, Microphone::Inmp441);
        assert_eq!(config.pins, PinConfig { bck: 4, ws: 5, sd: 6 });
        assert_eq!(config.audio.sample_rate.hz(), 48_000);
        assert_eq!(config.audio.bit_depth.bits(), 32);
        assert_eq!(config.audio.channels.count(), 2);
        assert_eq!(config.audio.buffer_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn changing_mcu_resets_pins() {
        let mut config = BridgeConfig::default();
        config.pins.set(PinRole::Bck, "17");
        config.set_mcu(Mcu::Rp2040);
        assert_eq!(config.pins, PinConfig { bck: 10, ws: 11, sd: 12 });

        let back = config.with_mcu(Mcu::Esp32S3);
        assert_eq!(back.pins, PinConfig::default_for(Mcu::Esp32S3));
    }

    #[test]
    fn non_numeric_pin_input_is_ignored() {
        let mut pins = PinConfig::default();
        assert!(!pins.set(PinRole::Ws, "abc"));
        assert!(!pins.set(PinRole::Ws, ""));
        assert!(!pins.set(PinRole::Ws, "-3"));
        assert_eq!(pins.ws, 5);

        assert!(pins.set(PinRole::Ws, " 21 "));
        assert_eq!(pins.ws, 21);
    }

    #[test]
    fn validate_rejects_duplicate_pins() {
        let mut config = BridgeConfig::default();
        config.pins.sd = config.pins.bck;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn validate_rejects_out_of_range_gpio() {
        let mut config = BridgeConfig::default().with_mcu(Mcu::Rp2040);
        config.pins.sd = 30;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("GPIO 30"), "{err}");
        assert!(err.contains("RP2040"), "{err}");

        // The same pin is fine on the ESP32-S3.
        let mut config = BridgeConfig::default();
        config.pins.sd = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_odd_buffer_sizes() {
        for size in [0, 1000, 16384] {
            let mut config = BridgeConfig::default();
            config.audio.buffer_size = size;
            assert!(config.validate().is_err(), "buffer {size} should fail");
        }
    }

    #[test]
    fn validate_reports_all_problems() {
        let mut config = BridgeConfig::default().with_mcu(Mcu::Rp2040);
        config.pins = PinConfig { bck: 40, ws: 40, sd: 1 };
        config.audio.buffer_size = 3;
        let err = config.validate().unwrap_err().to_string();
        assert_eq!(err.matches(';').count(), 3, "{err}");
    }

    #[test]
    fn enums_parse_cli_identifiers() {
        assert_eq!("esp32-s3".parse::<Mcu>().unwrap(), Mcu::Esp32S3);
        assert_eq!("RP2040".parse::<Mcu>().unwrap(), Mcu::Rp2040);
        assert!("stm32".parse::<Mcu>().is_err());

        assert_eq!(
            "generic-i2s".parse::<Microphone>().unwrap(),
            Microphone::GenericI2s
        );
        assert_eq!("44100".parse::<SampleRate>().unwrap(), SampleRate::Hz44100);
        assert!("22050".parse::<SampleRate>().is_err());
        assert_eq!("24".parse::<BitDepth>().unwrap(), BitDepth::Bits24);
        assert_eq!("mono".parse::<Channels>().unwrap(), Channels::Mono);
    }

    #[test]
    fn json_uses_identifiers_and_plain_numbers() {
        let config = BridgeConfig::default().with_mcu(Mcu::Rp2040);
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["mcu"], "rp2040");
        assert_eq!(json["mic"], "inmp441");
        assert_eq!(json["pins"]["bck"], 10);
        assert_eq!(json["audio"]["sample_rate"], 48000);
        assert_eq!(json["audio"]["bit_depth"], 32);
        assert_eq!(json["audio"]["channels"], 2);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"mic":"msm261s4030"}"#).unwrap();
        assert_eq!(config.mic, Microphone::Msm261s4030);
        assert_eq!(config.mcu, Mcu::Esp32S3);
        assert_eq!(config.pins, PinConfig::default_for(Mcu::Esp32S3));
    }

    #[test]
    fn partial_json_without_pins_uses_board_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"mcu":"rp2040"}"#).unwrap();
        assert_eq!(config.pins, PinConfig::default_for(Mcu::Rp2040));

        let config: BridgeConfig =
            serde_json::from_str(r#"{"mcu":"rp2040","pins":{"bck":2,"ws":3,"sd":4}}"#).unwrap();
        assert_eq!(config.pins, PinConfig { bck: 2, ws: 3, sd: 4 });
    }

    #[test]
    fn json_rejects_unsupported_sample_rate() {
        let json = r#"{"audio":{"sample_rate":22050,"bit_depth":16,"channels":1,"buffer_size":512}}"#;
        assert!(serde_json::from_str::<BridgeConfig>(json).is_err());
    }

    #[test]
    fn summary_is_compact() {
        let summary = BridgeConfig::default().summary();
        assert_eq!(
            summary,
            "ESP32-S3 + INMP441, BCK=4 WS=5 SD=6, 48000 Hz / 32-bit / 2ch"
        );
    }
}
