//! In-memory document store with copy-on-write snapshots.
//!
//! Readers take an `Arc` to the current document list and keep it for as long
//! as they need it. Writers clone the list, apply their change and swap the
//! new list in, so an in-flight scoring pass never sees a half-updated
//! document.

use chrono::{DateTime, Utc};
use handbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::corpus;
use crate::types::{Document, Topic};

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// On-disk layout of the store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    documents: Vec<Document>,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    snapshot: RwLock<Arc<Vec<Document>>>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a document list. Ids must be unique.
    pub fn with_documents(documents: Vec<Document>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(AppError::Knowledge(format!(
                    "Duplicate document id '{}'",
                    doc.id
                )));
            }
        }

        Ok(Self {
            snapshot: RwLock::new(Arc::new(documents)),
        })
    }

    /// Current snapshot. Later upserts do not affect it.
    pub fn snapshot(&self) -> Arc<Vec<Document>> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// All documents in the current snapshot.
    pub fn get_all(&self) -> Vec<Document> {
        (*self.snapshot()).clone()
    }

    pub fn get_by_topic(&self, topic: Topic) -> Vec<Document> {
        self.snapshot()
            .iter()
            .filter(|doc| doc.topic == topic)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.snapshot().iter().find(|doc| doc.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Insert or replace a document by id, stamping it with the current time.
    pub fn upsert(&self, document: Document) -> UpsertOutcome {
        self.upsert_at(document, Utc::now())
    }

    /// Insert or replace a document by id, stamping it with `now`.
    pub fn upsert_at(&self, mut document: Document, now: DateTime<Utc>) -> UpsertOutcome {
        document.last_updated = now;

        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = (**guard).clone();

        let outcome = match next.iter_mut().find(|doc| doc.id == document.id) {
            Some(existing) => {
                *existing = document;
                UpsertOutcome::Replaced
            }
            None => {
                next.push(document);
                UpsertOutcome::Inserted
            }
        };

        *guard = Arc::new(next);
        outcome
    }

    /// Load a store from a JSON file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read store {}: {}", path.display(), e))
        })?;

        let file: StoreFile = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} documents from {}",
            file.documents.len(),
            path.display()
        );

        Self::with_documents(file.documents)
    }

    /// Load a store, or fall back to the curated corpus when no file exists.
    pub fn load_or_default(path: &Path) -> AppResult<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::info!(
            "No document store at {}, using curated corpus",
            path.display()
        );
        Self::with_documents(corpus::default_documents(Utc::now()))
    }

    /// Write the current snapshot to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = StoreFile {
            documents: self.get_all(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)?;

        tracing::debug!(
            "Saved {} documents to {}",
            file.documents.len(),
            path.display()
        );
        Ok(())
    }
}
