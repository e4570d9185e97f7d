//! The in-memory turn log for one conversation.

use attune_core::types::{Emotion, HistoryEntry, Turn};

use crate::error::ChatError;

/// Ordered, append-only log of the turns in the active conversation.
///
/// Held only in volatile memory and discarded when the conversation ends.
/// Turns are never edited or removed once appended.
#[derive(Debug, Default)]
pub struct ConversationSession {
    turns: Vec<Turn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The wire history derived from every turn currently held.
    ///
    /// Callers capture this before appending the in-flight user turn, so
    /// the new message is passed separately and never duplicated inside
    /// the history.
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.turns.iter().map(HistoryEntry::from).collect()
    }

    /// Append a user turn, optionally tagged with an emotion.
    ///
    /// Rejects empty or all-whitespace text without mutating the log.
    pub fn append_user(
        &mut self,
        text: &str,
        emotion: Option<Emotion>,
    ) -> Result<Turn, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let turn = Turn::user(text, emotion);
        self.turns.push(turn.clone());
        Ok(turn)
    }

    /// Append an assistant turn.
    pub fn append_assistant(&mut self, text: impl Into<String>) -> Turn {
        let turn = Turn::assistant(text);
        self.turns.push(turn.clone());
        turn
    }
}

// =============================================================================
// Tests
// =============================================================================
