//! Chat completion with a fixed apology fallback.

use std::sync::Arc;

use tracing::warn;

use attune_core::types::HistoryEntry;

use crate::backend::GenerativeBackend;

/// The reply surfaced when the completion backend fails.
///
/// Callers treat this as an ordinary assistant turn; it is intentionally
/// indistinguishable from real content.
pub const COMPLETION_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Wraps the backend's complete call and absorbs every failure.
pub struct ChatCompletion {
    backend: Arc<dyn GenerativeBackend>,
}

impl ChatCompletion {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Request a reply to `message` given the prior history and optional
    /// system instruction. On failure the apology text is returned.
    pub async fn complete(
        &self,
        message: &str,
        history: &[HistoryEntry],
        system_instruction: Option<&str>,
    ) -> String {
        match self
            .backend
            .complete(message, history, system_instruction)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat completion failed, returning fallback reply");
                COMPLETION_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CannedBackend, FailingBackend};
    use attune_core::types::Emotion;

    #[tokio::test]
    async fn test_complete_passes_through_backend_reply() {
        let completion = ChatCompletion::new(Arc::new(CannedBackend::new(
            Emotion::neutral(),
            "Congratulations!",
        )));
        let reply = completion.complete("I got the job!", &[], None).await;
        assert_eq!(reply, "Congratulations!");
    }

    #[tokio::test]
    async fn test_complete_failure_yields_fallback_text() {
        let completion = ChatCompletion::new(Arc::new(FailingBackend));
        let reply = completion.complete("hello", &[], None).await;
        assert_eq!(reply, COMPLETION_FALLBACK);
    }
}
