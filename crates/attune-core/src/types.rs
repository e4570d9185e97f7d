use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who authored a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// Wire role for the chat-completion backend.
///
/// The backend is stateless between calls, so the full prior history is
/// re-sent on every completion request using these roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            Sender::Assistant => Role::Model,
        }
    }
}

// =============================================================================
// Emotion
// =============================================================================

/// An emotion tag attached to a user turn: a short label plus a glyph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotion {
    /// Single-word emotion label, e.g. "Joy".
    pub label: String,
    /// A single emoji representing the emotion.
    pub glyph: String,
}

impl Emotion {
    pub fn new(label: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            glyph: glyph.into(),
        }
    }

    /// The fallback tag used whenever classification fails.
    pub fn neutral() -> Self {
        Self::new("Neutral", "\u{1f610}")
    }
}

// =============================================================================
// Turn
// =============================================================================

/// One message exchanged in a conversation.
///
/// Immutable once created. Turns are only ever constructed and appended by
/// a `ConversationSession`; they are never edited or deleted afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Present only on user turns, attached at construction time.
    pub emotion: Option<Emotion>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Construct a user turn, optionally carrying an emotion tag.
    pub fn user(text: impl Into<String>, emotion: Option<Emotion>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            emotion,
            created_at: Utc::now(),
        }
    }

    /// Construct an assistant turn. Assistant turns carry no emotion tag.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Assistant,
            emotion: None,
            created_at: Utc::now(),
        }
    }
}

/// The wire shape of one prior turn as sent to the completion backend.
///
/// Derived 1:1 from turns already held by the session; the message being
/// composed is passed separately and never appears in the history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for HistoryEntry {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.sender.into(),
            content: turn.text.clone(),
        }
    }
}

// =============================================================================
// User context records
// =============================================================================

/// A single key/value fact the user has shared about themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfoItem {
    pub id: String,
    pub key: String,
    pub value: String,
}

impl PersonalInfoItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A reference document the user uploaded for the assistant to draw on.
///
/// `content` is raw text for text-typed sources and a base64 data URI for
/// everything else; the chat core treats it as opaque either way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    /// Derived from the file name plus an ingestion timestamp.
    pub id: String,
    pub name: String,
    /// MIME type reported at ingestion time.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub content: String,
}

// =============================================================================
// Tests
// =============================================================================
