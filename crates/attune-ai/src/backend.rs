//! The generative-backend capability interface.
//!
//! The remote model is injected as a trait object with exactly two
//! operations, classify and complete. Tests substitute deterministic
//! doubles and never reach a real backend.

use async_trait::async_trait;
use thiserror::Error;

use attune_core::types::{Emotion, HistoryEntry};

/// Errors from a generative-backend call.
///
/// Both remote calls are attempted exactly once per turn; there is no
/// retry policy.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key not set; configure backend.api_key or GEMINI_API_KEY")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// An opaque remote generative-language capability.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Map free text to an emotion tag.
    async fn classify(&self, text: &str) -> Result<Emotion, BackendError>;

    /// Generate a reply to `message` given the prior history and an
    /// optional system instruction.
    async fn complete(
        &self,
        message: &str,
        history: &[HistoryEntry],
        system_instruction: Option<&str>,
    ) -> Result<String, BackendError>;
}

/// Deterministic in-process backend for tests and offline runs.
///
/// Returns a fixed emotion and a fixed reply regardless of input.
#[derive(Debug, Clone)]
pub struct CannedBackend {
    pub emotion: Emotion,
    pub reply: String,
}

impl CannedBackend {
    pub fn new(emotion: Emotion, reply: impl Into<String>) -> Self {
        Self {
            emotion,
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for CannedBackend {
    async fn classify(&self, _text: &str) -> Result<Emotion, BackendError> {
        Ok(self.emotion.clone())
    }

    async fn complete(
        &self,
        _message: &str,
        _history: &[HistoryEntry],
        _system_instruction: Option<&str>,
    ) -> Result<String, BackendError> {
        Ok(self.reply.clone())
    }
}

/// A backend whose every call fails, for exercising fallback paths.
#[cfg(test)]
pub(crate) struct FailingBackend;

#[cfg(test)]
#[async_trait]
impl GenerativeBackend for FailingBackend {
    async fn classify(&self, _text: &str) -> Result<Emotion, BackendError> {
        Err(BackendError::MalformedResponse("simulated failure".to_string()))
    }

    async fn complete(
        &self,
        _message: &str,
        _history: &[HistoryEntry],
        _system_instruction: Option<&str>,
    ) -> Result<String, BackendError> {
        Err(BackendError::Status {
            code: 503,
            body: "simulated outage".to_string(),
        })
    }
}
