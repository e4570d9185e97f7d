//! Attune storage crate - SQLite-backed user context.
//!
//! Provides a WAL-mode SQLite database with migrations, the `ContextStore`
//! key-value blob store holding the personal-info and uploaded-document
//! collections, and filesystem document ingestion.

pub mod db;
pub mod ingest;
pub mod migrations;
pub mod store;

pub use db::Database;
pub use ingest::read_document;
pub use store::{ContextStore, DOCUMENTS_KEY, PERSONAL_INFO_KEY};
