//! Local record registry with optional file persistence.
//!
//! Thread-safe in-memory maps standing in for the relational store:
//! templates, issuance logs keyed by transaction hash, and the indexer's
//! block cursor. The cursor is snapshotted in the same file write as the
//! logs, so a crash between an event insert and a cursor advance cannot
//! leave the cursor ahead of unpersisted rows.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::store::records::{CredentialTemplate, IssuanceLog};

/// Errors raised by record insertion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Template declares the same field name twice.
    #[error("Duplicate field name in template: {0}")]
    DuplicateFieldName(String),

    /// Template with this id already exists.
    #[error("Template {0} already exists")]
    TemplateExists(u64),
}

#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
    templates: HashMap<u64, CredentialTemplate>,
    issuances: HashMap<String, IssuanceLog>,
    cursor: Option<u64>,
}

/// Shared handle to the record store. Cheap to clone.
#[derive(Clone, Default)]
pub struct Registry {
    templates: Arc<DashMap<u64, CredentialTemplate>>,
    issuances: Arc<DashMap<String, IssuanceLog>>,
    cursor: Arc<Mutex<Option<u64>>>,
    next_template_id: Arc<AtomicU64>,
    persistence_path: Option<PathBuf>,
}

impl Registry {
    /// Create an empty registry, snapshotting to `path` when given.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            next_template_id: Arc::new(AtomicU64::new(1)),
            persistence_path,
            ..Self::default()
        }
    }

    /// Load a registry from a snapshot file, or start empty if the file does
    /// not exist yet.
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let registry = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;

            let mut max_id = 0;
            for (id, template) in snapshot.templates {
                max_id = max_id.max(id);
                registry.templates.insert(id, template);
            }
            registry
                .next_template_id
                .store(max_id + 1, Ordering::SeqCst);
            for (hash, log) in snapshot.issuances {
                registry.issuances.insert(hash, log);
            }
            *registry.cursor.lock().unwrap_or_else(|e| e.into_inner()) = snapshot.cursor;

            tracing::info!(
                templates = registry.templates.len(),
                issuances = registry.issuances.len(),
                cursor = ?snapshot.cursor,
                "Loaded registry snapshot"
            );
        }
        Ok(registry)
    }

    fn save(&self) {
        let Some(path) = &self.persistence_path else {
            return;
        };
        let snapshot = Snapshot {
            templates: self
                .templates
                .iter()
                .map(|e| (*e.key(), e.value().clone()))
                .collect(),
            issuances: self
                .issuances
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            cursor: *self.cursor.lock().unwrap_or_else(|e| e.into_inner()),
        };

        let result = File::create(path)
            .map(BufWriter::new)
            .map_err(|e| e.to_string())
            .and_then(|w| serde_json::to_writer(w, &snapshot).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to persist registry snapshot");
        }
    }

    /// Insert a new template, assigning its id. Field names must be unique
    /// within the template.
    pub fn create_template(
        &self,
        institution_id: u64,
        name: String,
        description: Option<String>,
        background_cid: String,
        dynamic_fields: Vec<crate::store::records::DynamicField>,
    ) -> Result<CredentialTemplate, StoreError> {
        let mut seen = std::collections::HashSet::new();
        for field in &dynamic_fields {
            if !seen.insert(field.name.as_str()) {
                return Err(StoreError::DuplicateFieldName(field.name.clone()));
            }
        }

        let id = self.next_template_id.fetch_add(1, Ordering::SeqCst);
        let template = CredentialTemplate {
            id,
            institution_id,
            name,
            description,
            background_cid,
            dynamic_fields,
        };
        self.templates.insert(id, template.clone());
        self.save();
        Ok(template)
    }

    /// Insert a template with a caller-chosen id. Used for seeding and tests.
    pub fn insert_template(&self, template: CredentialTemplate) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for field in &template.dynamic_fields {
            if !seen.insert(field.name.as_str()) {
                return Err(StoreError::DuplicateFieldName(field.name.clone()));
            }
        }
        if self.templates.contains_key(&template.id) {
            return Err(StoreError::TemplateExists(template.id));
        }
        let id = template.id;
        self.templates.insert(id, template);
        let next = self.next_template_id.load(Ordering::SeqCst).max(id + 1);
        self.next_template_id.store(next, Ordering::SeqCst);
        self.save();
        Ok(())
    }

    /// Look up a template by id.
    pub fn template(&self, id: u64) -> Option<CredentialTemplate> {
        self.templates.get(&id).map(|e| e.value().clone())
    }

    /// All templates, unordered.
    pub fn templates(&self) -> Vec<CredentialTemplate> {
        self.templates.iter().map(|e| e.value().clone()).collect()
    }

    /// Record an issuance if none exists for its transaction hash.
    ///
    /// Returns `true` if the row was inserted, `false` if one was already
    /// present. The insert-if-absent is atomic, so concurrent callers cannot
    /// both insert for the same hash.
    pub fn record_issuance(&self, log: IssuanceLog) -> bool {
        let key = log.transaction_hash.to_lowercase();
        let inserted = match self.issuances.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(log);
                true
            }
        };
        if inserted {
            self.save();
        }
        inserted
    }

    /// Look up an issuance by transaction hash.
    pub fn issuance_by_tx(&self, transaction_hash: &str) -> Option<IssuanceLog> {
        self.issuances
            .get(&transaction_hash.to_lowercase())
            .map(|e| e.value().clone())
    }

    /// All issuance logs, unordered.
    pub fn issuances(&self) -> Vec<IssuanceLog> {
        self.issuances.iter().map(|e| e.value().clone()).collect()
    }

    /// Number of issuance logs.
    pub fn issuance_count(&self) -> usize {
        self.issuances.len()
    }

    /// Last fully scanned block, if the indexer has established one.
    pub fn cursor(&self) -> Option<u64> {
        *self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance the indexer cursor. The cursor is monotonic: attempts to move
    /// it backwards are ignored.
    pub fn set_cursor(&self, block: u64) {
        {
            let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
            match *cursor {
                Some(current) if block < current => return,
                _ => *cursor = Some(block),
            }
        }
        self.save();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("templates", &self.templates.len())
            .field("issuances", &self.issuances.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::records::{DynamicField, IssuanceStatus};

    fn log(tx: &str) -> IssuanceLog {
        IssuanceLog {
            credential_id: "1".to_string(),
            recipient_address: "0xabc".to_string(),
            transaction_hash: tx.to_string(),
            status: IssuanceStatus::Confirmed,
            template_id: None,
        }
    }

    #[test]
    fn record_issuance_deduplicates_by_hash() {
        let registry = Registry::new(None);
        assert!(registry.record_issuance(log("0x123")));
        assert!(!registry.record_issuance(log("0x123")));
        // Case differences in the hash do not defeat the uniqueness key.
        assert!(!registry.record_issuance(log("0X123")));
        assert_eq!(registry.issuance_count(), 1);
    }

    #[test]
    fn duplicate_field_names_rejected() {
        let registry = Registry::new(None);
        let result = registry.create_template(
            1,
            "T".to_string(),
            None,
            "Qbg".to_string(),
            vec![
                DynamicField {
                    name: "Name".to_string(),
                    x: 0,
                    y: 0,
                },
                DynamicField {
                    name: "Name".to_string(),
                    x: 10,
                    y: 10,
                },
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            StoreError::DuplicateFieldName("Name".to_string())
        );
    }

    #[test]
    fn template_ids_are_sequential() {
        let registry = Registry::new(None);
        let a = registry
            .create_template(1, "A".to_string(), None, "Qa".to_string(), vec![])
            .unwrap();
        let b = registry
            .create_template(1, "B".to_string(), None, "Qb".to_string(), vec![])
            .unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[test]
    fn cursor_is_monotonic() {
        let registry = Registry::new(None);
        assert_eq!(registry.cursor(), None);
        registry.set_cursor(10);
        registry.set_cursor(5);
        assert_eq!(registry.cursor(), Some(10));
        registry.set_cursor(10);
        assert_eq!(registry.cursor(), Some(10));
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let registry = Registry::new(Some(path.clone()));
        registry.record_issuance(log("0xAA"));
        registry.set_cursor(42);
        registry
            .create_template(1, "T".to_string(), None, "Qbg".to_string(), vec![])
            .unwrap();

        let reloaded = Registry::load_from_file(&path).unwrap();
        assert_eq!(reloaded.issuance_count(), 1);
        assert_eq!(reloaded.cursor(), Some(42));
        assert_eq!(reloaded.templates().len(), 1);
        // Ids keep counting past reloaded templates.
        let next = reloaded
            .create_template(1, "U".to_string(), None, "Qx".to_string(), vec![])
            .unwrap();
        assert_eq!(next.id, 2);
    }
}
