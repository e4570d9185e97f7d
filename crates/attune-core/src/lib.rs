//! Shared types, configuration, and error taxonomy for Attune.
//!
//! Attune is an emotion-aware chat companion: every user turn is tagged
//! with an inferred emotion, and replies are personalized from the user's
//! stored facts and uploaded reference documents.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AttuneConfig, BackendConfig, GeneralConfig};
pub use error::{AttuneError, Result};
pub use types::*;
