//! The user-context key-value store.
//!
//! Holds two named collections as JSON blobs: personal-info facts under
//! `personalInfo` and uploaded documents under `uploadedFiles`. Reads are
//! resilient: a missing key or a malformed blob yields an empty list,
//! never an error, so a corrupted store degrades to "no context" instead
//! of breaking the conversation.

use std::sync::Arc;

use rusqlite::OptionalExtension;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use attune_core::error::AttuneError;
use attune_core::types::{PersonalInfoItem, UploadedDocument};

use crate::db::Database;

/// Blob key for the personal-info collection.
pub const PERSONAL_INFO_KEY: &str = "personalInfo";

/// Blob key for the uploaded-document collection.
pub const DOCUMENTS_KEY: &str = "uploadedFiles";

/// Read/write handle over the two named context collections.
///
/// Constructed once at startup and passed explicitly to whoever needs it;
/// nothing reaches the store through ambient global state.
pub struct ContextStore {
    db: Arc<Database>,
}

impl ContextStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // -- Collection reads --

    /// The personal-info collection, in insertion order.
    pub fn personal_info(&self) -> Result<Vec<PersonalInfoItem>, AttuneError> {
        self.read_list(PERSONAL_INFO_KEY)
    }

    /// The uploaded-document collection, in insertion order.
    pub fn documents(&self) -> Result<Vec<UploadedDocument>, AttuneError> {
        self.read_list(DOCUMENTS_KEY)
    }

    // -- Collection writes --

    /// Replace the personal-info collection.
    pub fn set_personal_info(&self, items: &[PersonalInfoItem]) -> Result<(), AttuneError> {
        self.write_list(PERSONAL_INFO_KEY, items)
    }

    /// Replace the uploaded-document collection.
    pub fn set_documents(&self, docs: &[UploadedDocument]) -> Result<(), AttuneError> {
        self.write_list(DOCUMENTS_KEY, docs)
    }

    /// Append a new fact and return it.
    pub fn add_personal_info(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<PersonalInfoItem, AttuneError> {
        let item = PersonalInfoItem::new(key, value);
        let mut items = self.personal_info()?;
        items.push(item.clone());
        self.set_personal_info(&items)?;
        Ok(item)
    }

    /// Update a fact in place. Returns false when the id is unknown.
    pub fn update_personal_info(
        &self,
        id: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<bool, AttuneError> {
        let mut items = self.personal_info()?;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        item.key = key.into();
        item.value = value.into();
        self.set_personal_info(&items)?;
        Ok(true)
    }

    /// Remove a fact by id. Returns false when the id is unknown.
    pub fn remove_personal_info(&self, id: &str) -> Result<bool, AttuneError> {
        let mut items = self.personal_info()?;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.set_personal_info(&items)?;
        Ok(true)
    }

    /// Append an uploaded document.
    pub fn add_document(&self, doc: UploadedDocument) -> Result<(), AttuneError> {
        let mut docs = self.documents()?;
        docs.push(doc);
        self.set_documents(&docs)
    }

    /// Remove a document by id. Returns false when the id is unknown.
    pub fn remove_document(&self, id: &str) -> Result<bool, AttuneError> {
        let mut docs = self.documents()?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Ok(false);
        }
        self.set_documents(&docs)?;
        Ok(true)
    }

    // -- Blob plumbing --

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AttuneError> {
        let Some(raw) = self.read_blob(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(key, error = %e, "Malformed context blob, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<(), AttuneError> {
        let raw = serde_json::to_string(list)?;
        self.write_blob(key, &raw)
    }

    fn read_blob(&self, key: &str) -> Result<Option<String>, AttuneError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM context_blobs WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AttuneError::Storage(format!("Failed to read blob {}: {}", key, e)))
        })
    }

    fn write_blob(&self, key: &str, value: &str) -> Result<(), AttuneError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO context_blobs (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .map_err(|e| AttuneError::Storage(format!("Failed to write blob {}: {}", key, e)))?;
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> ContextStore {
        ContextStore::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn make_doc(name: &str) -> UploadedDocument {
        UploadedDocument {
            id: format!("{}-1700000000000", name),
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            content: "body".to_string(),
        }
    }

    // ---- Empty store ----

    #[test]
    fn test_absent_keys_read_as_empty() {
        let store = make_store();
        assert!(store.personal_info().unwrap().is_empty());
        assert!(store.documents().unwrap().is_empty());
    }

    // ---- Round trips ----

    #[test]
    fn test_personal_info_roundtrip_identity() {
        let store = make_store();
        let items = vec![
            PersonalInfoItem::new("Name", "Alex"),
            PersonalInfoItem::new("Hobby", "hiking"),
        ];
        store.set_personal_info(&items).unwrap();
        assert_eq!(store.personal_info().unwrap(), items);
    }

    #[test]
    fn test_documents_roundtrip_identity() {
        let store = make_store();
        let docs = vec![make_doc("a.txt"), make_doc("b.txt")];
        store.set_documents(&docs).unwrap();
        assert_eq!(store.documents().unwrap(), docs);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let store = make_store();
        for name in ["first", "second", "third"] {
            store.add_personal_info(name, "v").unwrap();
        }
        let keys: Vec<String> = store
            .personal_info()
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    // ---- Malformed blobs ----

    #[test]
    fn test_malformed_blob_reads_as_empty() {
        let store = make_store();
        store.write_blob(PERSONAL_INFO_KEY, "not json at all").unwrap();
        assert!(store.personal_info().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_blob_reads_as_empty() {
        let store = make_store();
        store.write_blob(DOCUMENTS_KEY, "{\"an\": \"object\"}").unwrap();
        assert!(store.documents().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_blob_is_recoverable_by_write() {
        let store = make_store();
        store.write_blob(PERSONAL_INFO_KEY, "garbage").unwrap();
        store.add_personal_info("Name", "Alex").unwrap();
        let items = store.personal_info().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "Name");
    }

    // ---- Fact mutations ----

    #[test]
    fn test_add_personal_info_returns_item() {
        let store = make_store();
        let item = store.add_personal_info("Name", "Alex").unwrap();
        assert_eq!(item.key, "Name");
        assert_eq!(item.value, "Alex");
        assert!(!item.id.is_empty());
    }

    #[test]
    fn test_update_personal_info() {
        let store = make_store();
        let item = store.add_personal_info("Name", "Alex").unwrap();
        assert!(store.update_personal_info(&item.id, "Name", "Sam").unwrap());
        assert_eq!(store.personal_info().unwrap()[0].value, "Sam");
    }

    #[test]
    fn test_update_unknown_id_is_false() {
        let store = make_store();
        assert!(!store.update_personal_info("nope", "k", "v").unwrap());
    }

    #[test]
    fn test_remove_personal_info() {
        let store = make_store();
        let a = store.add_personal_info("A", "1").unwrap();
        store.add_personal_info("B", "2").unwrap();
        assert!(store.remove_personal_info(&a.id).unwrap());
        let items = store.personal_info().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "B");
    }

    #[test]
    fn test_remove_unknown_id_is_false() {
        let store = make_store();
        assert!(!store.remove_personal_info("nope").unwrap());
    }

    // ---- Document mutations ----

    #[test]
    fn test_add_and_remove_document() {
        let store = make_store();
        let doc = make_doc("notes.txt");
        store.add_document(doc.clone()).unwrap();
        assert_eq!(store.documents().unwrap().len(), 1);

        assert!(store.remove_document(&doc.id).unwrap());
        assert!(store.documents().unwrap().is_empty());
        assert!(!store.remove_document(&doc.id).unwrap());
    }

    // ---- Persistence across handles ----

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attune.db");

        {
            let store = ContextStore::new(Arc::new(Database::new(&path).unwrap()));
            store.add_personal_info("Name", "Alex").unwrap();
        }

        let store = ContextStore::new(Arc::new(Database::new(&path).unwrap()));
        let items = store.personal_info().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value, "Alex");
    }
}
