//! REST API endpoint handlers.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use i2s_bridge::config::{BitDepth, Channels, Mcu, Microphone, SampleRate};
use i2s_bridge::diagram::{connection_note, render_wiring_diagram};
use i2s_bridge::error::{GENERATION_FAILED_MESSAGE, Result};
use i2s_bridge::firmware::{FIRMWARE_FILE_NAME, FirmwareGenerator, GeneratedFirmware};
use i2s_bridge::prompt::firmware_prompt;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::state::{self, FormSnapshot, FormState, PinInputs};

pub const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub form: Arc<Mutex<FormState>>,
    pub generator: Arc<dyn FirmwareGenerator>,
}

impl AppState {
    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::from_state(&state::lock(&self.form))
    }
}

/// GET /: The configuration form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/state: Full state snapshot.
pub async fn get_state(State(app): State<AppState>) -> Json<FormSnapshot> {
    Json(app.snapshot())
}

#[derive(Serialize)]
pub struct OptionEntry {
    pub id: String,
    pub label: String,
}

#[derive(Serialize)]
pub struct FormOptions {
    pub mcus: Vec<OptionEntry>,
    pub microphones: Vec<OptionEntry>,
    pub sample_rates: Vec<OptionEntry>,
    pub bit_depths: Vec<u8>,
    pub channels: Vec<u8>,
}

/// GET /api/options: Choices for the form's selectors.
pub async fn get_options() -> Json<FormOptions> {
    Json(FormOptions {
        mcus: Mcu::ALL
            .iter()
            .map(|m| OptionEntry {
                id: m.id().to_string(),
                label: m.label().to_string(),
            })
            .collect(),
        microphones: Microphone::ALL
            .iter()
            .map(|m| OptionEntry {
                id: m.id().to_string(),
                label: m.label().to_string(),
            })
            .collect(),
        sample_rates: SampleRate::ALL
            .iter()
            .map(|r| OptionEntry {
                id: r.hz().to_string(),
                label: r.to_string(),
            })
            .collect(),
        bit_depths: [BitDepth::Bits16, BitDepth::Bits24, BitDepth::Bits32]
            .iter()
            .map(|d| d.bits())
            .collect(),
        channels: [Channels::Mono, Channels::Stereo]
            .iter()
            .map(|c| c.count())
            .collect(),
    })
}

/// Request body for POST /api/config. Every field is optional.
#[derive(Deserialize, Debug, Default)]
pub struct ConfigUpdate {
    pub mcu: Option<Mcu>,
    pub mic: Option<Microphone>,
    #[serde(default)]
    pub pins: PinInputs,
    pub sample_rate: Option<SampleRate>,
    pub bit_depth: Option<BitDepth>,
    pub channels: Option<Channels>,
    pub buffer_size: Option<u32>,
    pub notes: Option<String>,
}

/// POST /api/config: Apply a partial form update.
///
/// An MCU change resets the pins to that board's defaults before any pin
/// values in the same request are applied. Unparseable pin values are
/// ignored. Returns the updated snapshot.
pub async fn post_config(
    State(app): State<AppState>,
    Json(update): Json<ConfigUpdate>,
) -> Json<FormSnapshot> {
    let mut form = state::lock(&app.form);
    let config = &mut form.config;

    if let Some(mcu) = update.mcu
        && mcu != config.mcu
    {
        config.set_mcu(mcu);
    }
    if let Some(mic) = update.mic {
        config.mic = mic;
    }
    update.pins.apply(&mut config.pins);
    if let Some(rate) = update.sample_rate {
        config.audio.sample_rate = rate;
    }
    if let Some(depth) = update.bit_depth {
        config.audio.bit_depth = depth;
    }
    if let Some(channels) = update.channels {
        config.audio.channels = channels;
    }
    if let Some(size) = update.buffer_size {
        config.audio.buffer_size = size;
    }
    if let Some(notes) = update.notes {
        form.notes = Some(notes).filter(|n| !n.trim().is_empty());
    }

    Json(FormSnapshot::from_state(&form))
}

/// GET /api/diagram.svg: Wiring diagram for the current configuration.
pub async fn get_diagram(State(app): State<AppState>) -> Response {
    let config = state::lock(&app.form).config;
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_wiring_diagram(&config),
    )
        .into_response()
}

/// GET /api/note: Connection advice for the selected board.
pub async fn get_note(State(app): State<AppState>) -> &'static str {
    connection_note(state::lock(&app.form).config.mcu)
}

/// GET /api/prompt: The prompt that would be sent for the current form.
pub async fn get_prompt(State(app): State<AppState>) -> String {
    let form = state::lock(&app.form);
    firmware_prompt(&form.config, form.notes.as_deref())
}

/// POST /api/generate: Send the current configuration to the model.
///
/// - 409 if a generation is already running (the state is left untouched).
/// - 422 if the configuration does not validate.
/// - 502 if the model call fails; the snapshot carries the user-facing error.
/// - 200 with the snapshot holding the generated code otherwise.
///
/// The model call runs on its own task and writes its result into the form
/// state even if the client disconnects, so `generating` is always cleared.
pub async fn post_generate(State(app): State<AppState>) -> (StatusCode, Json<FormSnapshot>) {
    let (config, notes) = {
        let mut form = state::lock(&app.form);
        if form.generating {
            return (StatusCode::CONFLICT, Json(FormSnapshot::from_state(&form)));
        }
        if let Err(e) = form.config.validate() {
            form.error = Some(e.user_message());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(FormSnapshot::from_state(&form)),
            );
        }
        form.generating = true;
        form.error = None;
        (form.config, form.notes.clone())
    };

    info!("Generation requested: {}", config.summary());
    let task = tokio::spawn({
        let form = app.form.clone();
        let generator = app.generator.clone();
        async move {
            let result = generator.generate_firmware(config, notes).await;
            finish_generation(&mut state::lock(&form), result)
        }
    });

    let status = match task.await {
        Ok(status) => status,
        Err(e) => {
            error!("Generation task failed: {e}");
            let mut form = state::lock(&app.form);
            form.generating = false;
            form.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(app.snapshot()))
}

/// Record the outcome of a generation and clear `generating`.
fn finish_generation(form: &mut FormState, result: Result<GeneratedFirmware>) -> StatusCode {
    form.generating = false;
    match result {
        Ok(firmware) => {
            info!("Generated {} chars of firmware", firmware.code.len());
            form.firmware = Some(firmware);
            StatusCode::OK
        }
        Err(e) => {
            warn!("Generation failed: {e}");
            form.error = Some(e.user_message());
            StatusCode::BAD_GATEWAY
        }
    }
}

/// GET /api/firmware.cpp: Download the last generated code.
pub async fn get_firmware(State(app): State<AppState>) -> Response {
    let form = state::lock(&app.form);
    match &form.firmware {
        Some(firmware) => (
            [
                (header::CONTENT_TYPE, "text/x-c++src; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{FIRMWARE_FILE_NAME}\""),
                ),
            ],
            firmware.code.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_update_deserializes_partial_body() {
        let json = r#"{"mcu":"rp2040","pins":{"sd":"14"},"sample_rate":16000}"#;
        let update: ConfigUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.mcu, Some(Mcu::Rp2040));
        assert_eq!(update.sample_rate, Some(SampleRate::Hz16000));
        assert!(update.pins.sd.is_some());
        assert!(update.mic.is_none());
    }

    #[test]
    fn config_update_rejects_unknown_mcu() {
        let json = r#"{"mcu":"stm32"}"#;
        assert!(serde_json::from_str::<ConfigUpdate>(json).is_err());
    }

    #[test]
    fn index_page_has_the_form() {
        assert!(INDEX_HTML.contains("id=\"config-form\""));
        assert!(INDEX_HTML.contains("/api/generate"));
    }
}
