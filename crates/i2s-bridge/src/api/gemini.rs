//! Google Gemini `generateContent` client.
//!
//! The request carries the prompt as a single user turn plus a generation
//! config; the response text is the concatenation of the first candidate's
//! text parts. Nothing about the text is inspected here.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::api::retry::RetryConfig;
use crate::error::{BridgeError, Result};
use crate::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, GEMINI_BASE_URL};

/// Returned in place of code when the model produced no text.
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "// Error: No code generated.";

// ── Request types ──────────────────────────────────────────────────

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

/// Token accounting reported by the API.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Result of one successful generation call.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Model output, or [`EMPTY_RESPONSE_PLACEHOLDER`] if there was none.
    pub text: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageMetadata>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
    retry: RetryConfig,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("i2s-bridge/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
            retry: RetryConfig::default(),
        })
    }

    /// Point the client at a proxy or a test server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: Option<u32>) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for `prompt`.
    pub fn request_for(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    /// Send `prompt` and return the model's text.
    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        let body = self.request_for(prompt);
        self.retry.run(|| self.send(&body)).await
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<Generation> {
        debug!(
            "Gemini request: model={}, temp={}, prompt_chars={}",
            self.model,
            self.temperature,
            body.contents
                .iter()
                .flat_map(|c| &c.parts)
                .filter_map(|p| p.text.as_ref())
                .map(|t| t.len())
                .sum::<usize>()
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(
            "Gemini response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(BridgeError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawResponse = serde_json::from_str(&text)?;
        if let Some(err) = parsed.error {
            return Err(BridgeError::ApiMessage(err.message));
        }

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            warn!("Gemini blocked the prompt: {reason}");
        }
        if let Some(usage) = parsed.usage_metadata {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        let candidate = parsed.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
        let output: String = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        debug!("Gemini output: {} chars", output.len());

        let text = if output.is_empty() {
            warn!("Gemini returned no text (finish_reason={finish_reason:?})");
            EMPTY_RESPONSE_PLACEHOLDER.to_string()
        } else {
            output
        };

        Ok(Generation {
            text,
            model: self.model.clone(),
            finish_reason,
            usage: parsed.usage_metadata,
        })
    }
}
