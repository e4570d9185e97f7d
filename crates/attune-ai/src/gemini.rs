//! Google Gemini backend.
//!
//! Talks to the Generative Language API `generateContent` endpoint over
//! HTTPS. Emotion classification uses a JSON response schema; chat
//! completion sends the prior history plus an optional system instruction.
//! The API key travels as the `key` query parameter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use attune_core::config::BackendConfig;
use attune_core::types::{Emotion, HistoryEntry, Role};

use crate::backend::{BackendError, GenerativeBackend};

/// Gemini client over HTTPS.
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    chat_model: String,
    emotion_model: String,
    api_key: Option<String>,
}

impl GeminiBackend {
    /// Build a backend from configuration.
    ///
    /// A missing API key is not an error here; calls will fail and the
    /// wrappers degrade at the call site instead, so the application keeps
    /// running with neutral tags and fallback replies.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            emotion_model: config.emotion_model.clone(),
            api_key: config.resolve_api_key(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// One `generateContent` round trip, exactly one attempt.
    async fn generate(&self, model: &str, body: &Value) -> Result<Value, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey)?;

        let response = self
            .http
            .post(self.endpoint(model))
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                code: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| BackendError::MalformedResponse(format!("invalid JSON: {}", e)))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn classify(&self, text: &str) -> Result<Emotion, BackendError> {
        debug!(model = %self.emotion_model, "Classifying emotion");
        let body = emotion_request_body(text);
        let response = self.generate(&self.emotion_model, &body).await?;
        parse_emotion(&extract_text(&response)?)
    }

    async fn complete(
        &self,
        message: &str,
        history: &[HistoryEntry],
        system_instruction: Option<&str>,
    ) -> Result<String, BackendError> {
        debug!(
            model = %self.chat_model,
            history_len = history.len(),
            has_instruction = system_instruction.is_some(),
            "Requesting chat completion"
        );
        let body = chat_request_body(message, history, system_instruction);
        let response = self.generate(&self.chat_model, &body).await?;
        extract_text(&response)
    }
}

// =============================================================================
// Request construction
// =============================================================================

/// Build the request body for an emotion-classification call.
///
/// The response schema forces the backend to answer with a JSON object
/// carrying exactly an `emotion` word and an `emoji` glyph.
fn emotion_request_body(text: &str) -> Value {
    let prompt = format!(
        "Analyze the emotion of the following text. Text: \"{}\"",
        text
    );
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "emotion": {
                        "type": "STRING",
                        "description": "A single word for the dominant emotion (e.g., Joy, Sadness, Anger, Surprise, Fear, Neutral)."
                    },
                    "emoji": {
                        "type": "STRING",
                        "description": "A single emoji that best represents the emotion."
                    }
                },
                "required": ["emotion", "emoji"]
            }
        }
    })
}

/// Build the request body for a chat-completion call.
///
/// The history is sent first and the new user message last; the system
/// instruction is omitted entirely when absent rather than sent empty.
fn chat_request_body(
    message: &str,
    history: &[HistoryEntry],
    system_instruction: Option<&str>,
) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|entry| {
            json!({
                "role": role_name(entry.role),
                "parts": [{ "text": entry.content }]
            })
        })
        .collect();
    contents.push(json!({
        "role": "user",
        "parts": [{ "text": message }]
    }));

    let mut body = json!({ "contents": contents });
    if let Some(instruction) = system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }
    body
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Concatenated text parts of the first candidate.
fn extract_text(response: &Value) -> Result<String, BackendError> {
    let parts = response
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            BackendError::MalformedResponse("no candidates[0].content.parts".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    Ok(text)
}

/// Wire shape of the classifier's JSON reply.
#[derive(Debug, Deserialize)]
struct EmotionWire {
    emotion: String,
    emoji: String,
}

/// Parse the classifier's JSON payload into an `Emotion`.
///
/// A payload missing either field, or carrying an empty one, counts as a
/// classification failure.
fn parse_emotion(text: &str) -> Result<Emotion, BackendError> {
    let wire: EmotionWire = serde_json::from_str(text.trim())
        .map_err(|e| BackendError::MalformedResponse(format!("emotion payload: {}", e)))?;
    if wire.emotion.is_empty() || wire.emoji.is_empty() {
        return Err(BackendError::MalformedResponse(
            "empty emotion field".to_string(),
        ));
    }
    Ok(Emotion::new(wire.emotion, wire.emoji))
}

// =============================================================================
// Tests
// =============================================================================
