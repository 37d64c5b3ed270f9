//! Generation settings with defaults tuned for code output.
//!
//! [`GenerationSettings`] holds everything about *how* to call the model, as
//! opposed to [`BridgeConfig`](crate::config::BridgeConfig), which describes
//! the hardware. Both binaries fill it from their command-line flags and turn
//! it into a client via [`build_client`](GenerationSettings::build_client).

use crate::api::gemini::GeminiClient;
use crate::api::retry::RetryConfig;
use crate::error::{BridgeError, Result};
use crate::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, GEMINI_BASE_URL};

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Sampling temperature. Default: `0.2`.
    pub temperature: f32,
    /// Output token cap. Default: unset (model default).
    pub max_output_tokens: Option<u32>,
    /// API base URL. Default: the public v1beta endpoint.
    pub base_url: String,
    /// Retries for transient failures. Default: `0`.
    pub retries: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            base_url: GEMINI_BASE_URL.to_string(),
            retries: 0,
        }
    }
}

impl GenerationSettings {
    pub fn build_client(&self, api_key: impl Into<String>) -> Result<GeminiClient> {
        Ok(GeminiClient::new(api_key)?
            .with_base_url(&self.base_url)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens)
            .with_retry(RetryConfig::with_retries(self.retries)))
    }
}

/// Read the API key from the environment.
pub fn api_key_from_env() -> Result<String> {
    api_key_from(|name| std::env::var(name).ok())
}

/// First non-empty value among [`API_KEY_VARS`] according to `lookup`.
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|&name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or(BridgeError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_code_tuned() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.model, "gemini-3-pro-preview");
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.retries, 0);
        assert!(settings.max_output_tokens.is_none());
    }

    #[test]
    fn build_client_applies_model() {
        let settings = GenerationSettings {
            model: "gemini-2.5-flash".into(),
            ..Default::default()
        };
        let client = settings.build_client("k").unwrap();
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[test]
    fn api_key_prefers_gemini_var() {
        let key = api_key_from(|name| match name {
            "GEMINI_API_KEY" => Some("gemini".into()),
            "API_KEY" => Some("generic".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key, "gemini");
    }

    #[test]
    fn api_key_falls_back_and_skips_blank() {
        let key = api_key_from(|name| match name {
            "GEMINI_API_KEY" => Some("  ".into()),
            "API_KEY" => Some("generic".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key, "generic");
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = api_key_from(|_| None).unwrap_err();
        assert!(matches!(err, BridgeError::MissingApiKey));
    }
}
