//! Chat orchestrator: coordinates one user turn end to end.
//!
//! Classifies the user's emotion, aggregates stored context into a system
//! instruction, requests a completion, and appends both turns to the
//! session in order. The phase flag enforces at most one in-flight turn.

use std::sync::{Arc, Mutex};

use tracing::warn;

use attune_ai::{ChatCompletion, EmotionClassifier, GenerativeBackend};
use attune_core::types::Turn;
use attune_storage::ContextStore;

use crate::context::ContextAggregator;
use crate::error::ChatError;
use crate::session::ConversationSession;

/// Progress of the in-flight turn.
///
/// The phase flag is the sole concurrency guard: re-entrant calls while a
/// turn is in flight are rejected, not queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Classifying,
    AwaitingCompletion,
}

/// The two turns appended by one successful exchange.
#[derive(Clone, Debug)]
pub struct Exchange {
    pub user: Turn,
    pub assistant: Turn,
}

/// Coordinates classification, context aggregation, and completion for one
/// conversation session.
pub struct ChatOrchestrator {
    classifier: EmotionClassifier,
    completion: ChatCompletion,
    store: Arc<ContextStore>,
    session: Mutex<ConversationSession>,
    phase: Mutex<Phase>,
}

impl ChatOrchestrator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, store: Arc<ContextStore>) -> Self {
        Self {
            classifier: EmotionClassifier::new(Arc::clone(&backend)),
            completion: ChatCompletion::new(backend),
            store,
            session: Mutex::new(ConversationSession::new()),
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Handle one user input end to end.
    ///
    /// Empty input and re-entrant calls are rejected before any remote
    /// call or session mutation. On success exactly one user turn and one
    /// assistant turn have been appended, in that order; backend failures
    /// have already degraded to the neutral tag or the fallback reply by
    /// the time they reach the session.
    pub async fn handle_user_input(&self, raw_text: &str) -> Result<Exchange, ChatError> {
        if raw_text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let _guard = self.begin_turn()?;

        // Captured before any mutation: the in-flight message must never
        // appear inside the history sent to completion.
        let history = self.with_session(|s| s.history_snapshot());

        let emotion = self.classifier.classify(raw_text).await;
        let user_turn = self.with_session(|s| s.append_user(raw_text, Some(emotion)))?;

        let instruction = self.build_instruction();

        self.set_phase(Phase::AwaitingCompletion);
        let reply = self
            .completion
            .complete(raw_text, &history, instruction.as_deref())
            .await;

        let assistant_turn = self.with_session(|s| s.append_assistant(reply));

        Ok(Exchange {
            user: user_turn,
            assistant: assistant_turn,
        })
    }

    /// A copy of the session's turns, in order.
    pub fn turns(&self) -> Vec<Turn> {
        self.with_session(|s| s.turns().to_vec())
    }

    // -- Internals --

    /// Read both context collections, degrading to empty on storage errors.
    fn build_instruction(&self) -> Option<String> {
        let personal_info = self.store.personal_info().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read personal info, continuing without it");
            Vec::new()
        });
        let documents = self.store.documents().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read documents, continuing without them");
            Vec::new()
        });
        ContextAggregator::build(&personal_info, &documents)
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut ConversationSession) -> T) -> T {
        // A poisoned lock only means a prior panic; the turn log is still valid.
        let mut session = self.session.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut session)
    }

    /// Claim the orchestrator for one turn, or reject if one is in flight.
    fn begin_turn(&self) -> Result<PhaseGuard<'_>, ChatError> {
        let mut phase = self.phase.lock().unwrap_or_else(|p| p.into_inner());
        if *phase != Phase::Idle {
            return Err(ChatError::Busy);
        }
        *phase = Phase::Classifying;
        Ok(PhaseGuard { orchestrator: self })
    }

    fn set_phase(&self, next: Phase) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = next;
    }
}

/// Resets the phase to idle when the turn ends, however it ends.
struct PhaseGuard<'a> {
    orchestrator: &'a ChatOrchestrator,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.set_phase(Phase::Idle);
    }
}

// =============================================================================
// Tests
// =============================================================================
