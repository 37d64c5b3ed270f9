//! Generation API layer: the Gemini `generateContent` client and opt-in retry.
//!
//! - [`gemini`]: [`GeminiClient`] plus the request/response wire types. One
//!   prompt in, one block of text out.
//! - [`retry`]: transient error backoff. Disabled by default, so a failed
//!   call fails immediately unless the caller asks for retries.

pub mod gemini;
pub mod retry;

pub use gemini::{GeminiClient, Generation, UsageMetadata};
pub use retry::RetryConfig;
