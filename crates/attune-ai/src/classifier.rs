//! Emotion classification that never fails.

use std::sync::Arc;

use tracing::warn;

use attune_core::types::Emotion;

use crate::backend::GenerativeBackend;

/// Wraps the backend's classify call and absorbs every failure.
///
/// Emotion tagging is cosmetic: a transport or parse error is logged and
/// replaced with the neutral fallback so it can never block a turn.
pub struct EmotionClassifier {
    backend: Arc<dyn GenerativeBackend>,
}

impl EmotionClassifier {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Classify `text`, falling back to neutral on any failure.
    pub async fn classify(&self, text: &str) -> Emotion {
        match self.backend.classify(text).await {
            Ok(emotion) => emotion,
            Err(e) => {
                warn!(error = %e, "Emotion classification failed, using neutral fallback");
                Emotion::neutral()
            }
        }
    }
}
