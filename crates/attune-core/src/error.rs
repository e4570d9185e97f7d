use thiserror::Error;

/// Top-level error type for the Attune system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and convert into `AttuneError` so that the `?`
/// operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttuneError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AttuneError {
    fn from(err: toml::de::Error) -> Self {
        AttuneError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AttuneError {
    fn from(err: toml::ser::Error) -> Self {
        AttuneError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AttuneError {
    fn from(err: serde_json::Error) -> Self {
        AttuneError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Attune operations.
pub type Result<T> = std::result::Result<T, AttuneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AttuneError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = AttuneError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");

        let err = AttuneError::Backend("rate limited".to_string());
        assert_eq!(err.to_string(), "Backend error: rate limited");

        let err = AttuneError::Serialization("invalid json".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AttuneError = io_err.into();
        assert!(matches!(err, AttuneError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: AttuneError = parsed.unwrap_err().into();
        assert!(matches!(err, AttuneError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: AttuneError = parsed.unwrap_err().into();
        assert!(matches!(err, AttuneError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = AttuneError::Backend("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Backend"));
        assert!(debug_str.contains("test debug"));
    }
}
