//! Error types for the conversation core.

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("a turn is already in flight")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(ChatError::Busy.to_string(), "a turn is already in flight");
    }

    #[test]
    fn test_chat_error_debug() {
        let dbg = format!("{:?}", ChatError::Busy);
        assert!(dbg.contains("Busy"));
    }
}
