//! Shared form state and its serializable projection.
//!
//! Handlers mutate [`FormState`] behind an `Arc<Mutex<_>>`. Responses carry a
//! [`FormSnapshot`], which flattens the generated firmware into the fields
//! the page renders.

use std::sync::{Arc, Mutex, MutexGuard};

use i2s_bridge::config::{BridgeConfig, PinConfig};
use i2s_bridge::firmware::GeneratedFirmware;
use serde::{Deserialize, Serialize};

/// Everything the configuration page shows.
#[derive(Debug, Default)]
pub struct FormState {
    pub config: BridgeConfig,
    /// Extra requirements typed by the user.
    pub notes: Option<String>,
    /// A generation request is in flight.
    pub generating: bool,
    pub firmware: Option<GeneratedFirmware>,
    /// User-facing error from the last attempt.
    pub error: Option<String>,
}

/// Lock the form state, recovering from a poisoned mutex.
pub fn lock(state: &Arc<Mutex<FormState>>) -> MutexGuard<'_, FormState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Serializable view of [`FormState`].
#[derive(Debug, Serialize)]
pub struct FormSnapshot {
    pub config: BridgeConfig,
    pub summary: String,
    pub notes: Option<String>,
    pub generating: bool,
    /// Extracted code of the last successful generation.
    pub generated_code: Option<String>,
    /// Unmodified model output of the last successful generation.
    pub raw_response: Option<String>,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl FormSnapshot {
    pub fn from_state(state: &FormState) -> Self {
        Self {
            config: state.config,
            summary: state.config.summary(),
            notes: state.notes.clone(),
            generating: state.generating,
            generated_code: state.firmware.as_ref().map(|f| f.code.clone()),
            raw_response: state.firmware.as_ref().map(|f| f.raw.clone()),
            model: state.firmware.as_ref().map(|f| f.model.clone()),
            error: state.error.clone(),
        }
    }
}

/// A pin value as submitted by the form: a number or the raw input text.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum PinInput {
    Number(i64),
    /// Truncated toward zero, so `4.5` selects GPIO 4.
    Float(f64),
    Text(String),
}

impl PinInput {
    fn as_text(&self) -> String {
        match self {
            PinInput::Number(n) => n.to_string(),
            PinInput::Float(f) => (f.trunc() as i64).to_string(),
            PinInput::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct PinInputs {
    pub bck: Option<PinInput>,
    pub ws: Option<PinInput>,
    pub sd: Option<PinInput>,
}

impl PinInputs {
    /// Apply each present input. Values that are not valid GPIO numbers are
    /// ignored, keeping the previous pin.
    pub fn apply(&self, pins: &mut PinConfig) {
        use i2s_bridge::config::PinRole;

        for (role, input) in [
            (PinRole::Bck, &self.bck),
            (PinRole::Ws, &self.ws),
            (PinRole::Sd, &self.sd),
        ] {
            if let Some(input) = input {
                pins.set(role, &input.as_text());
            }
        }
    }
}
