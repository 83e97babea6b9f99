//! In-memory resource store
//!
//! Backing store for tests, dry runs, and local development. Documents live
//! in a `BTreeMap` so query results come back in a stable order.

use crate::adapters::store::traits::{QueryFilter, ResourceKind, ResourceStore, StoreOp};
use crate::domain::{BeaconError, Result, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory store keyed by (kind, id)
pub struct MemoryStore {
    documents: RwLock<BTreeMap<(ResourceKind, String), serde_json::Value>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of documents currently held
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true when the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn read(&self, kind: ResourceKind, id: &str) -> Result<Option<serde_json::Value>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(kind, id.to_string())).cloned())
    }

    async fn write(
        &self,
        kind: ResourceKind,
        id: &str,
        document: &serde_json::Value,
    ) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert((kind, id.to_string()), document.clone());
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.remove(&(kind, id.to_string()));
        Ok(())
    }

    async fn query(
        &self,
        kind: ResourceKind,
        filter: &QueryFilter,
    ) -> Result<Vec<serde_json::Value>> {
        let documents = self.documents.read().await;
        let matches = documents
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .filter(|(_, document)| filter.matches(document))
            .map(|(_, document)| document.clone())
            .collect();
        Ok(matches)
    }

    async fn transaction(&self, operations: Vec<StoreOp>) -> Result<()> {
        // One write guard across the batch keeps it atomic with respect to
        // other callers. Creates are checked before anything is applied, so
        // a duplicate leaves the batch entirely unapplied.
        let mut documents = self.documents.write().await;
        for operation in &operations {
            if let StoreOp::Create { kind, id, .. } = operation {
                if documents.contains_key(&(*kind, id.clone())) {
                    return Err(BeaconError::Store(StoreError::DocumentExists(format!(
                        "{kind}/{id}"
                    ))));
                }
            }
        }
        for operation in operations {
            match operation {
                StoreOp::Put { kind, id, document }
                | StoreOp::Create { kind, id, document } => {
                    documents.insert((kind, id), document);
                }
                StoreOp::Delete { kind, id } => {
                    documents.remove(&(kind, id));
                }
            }
        }
        Ok(())
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
