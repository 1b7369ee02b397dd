//! In-Memory Store Implementation
//!
//! This module implements the [`TimeSeriesStore`] trait with plain in-process
//! state, for fast isolated tests and local development without a running
//! database.
//!
//! ## What Does This Do?
//!
//! MemoryStore keeps full bookkeeping per collection:
//! - The [`TimeSeriesOptions`] it was created with
//! - Every [`IndexSpec`] declared on it
//! - Every document inserted, in insertion order
//!
//! Integration tests assert against that bookkeeping through the inherent
//! accessors ([`MemoryStore::documents`], [`MemoryStore::indexes`]).
//!
//! ## What It Does NOT Do
//!
//! - No TTL enforcement (retention is recorded, never applied)
//! - No index maintenance (indexes are recorded, never consulted)
//! - No durability
//!
//! ## Thread Safety
//!
//! State lives behind a `tokio::sync::Mutex`; the store is `Send + Sync` and
//! safe to share via `Arc`.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{CollectionInfo, Document, IndexSpec, InsertReport, TimeSeriesOptions};
use crate::TimeSeriesStore;

use async_trait::async_trait;

/// One collection's full state.
#[derive(Debug, Clone)]
struct Collection {
    info: CollectionInfo,
    indexes: Vec<IndexSpec>,
    documents: Vec<Document>,
}

/// In-process [`TimeSeriesStore`] backend.
///
/// # Examples
///
/// ```ignore
/// use logship_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents of a collection, in insertion order.
    ///
    /// Returns an empty vec for an unknown collection. Intended for test
    /// assertions.
    pub async fn documents(&self, name: &str) -> Vec<Document> {
        let collections = self.collections.lock().await;
        collections
            .get(name)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    /// All indexes declared on a collection, in declaration order.
    pub async fn indexes(&self, name: &str) -> Vec<IndexSpec> {
        let collections = self.collections.lock().await;
        collections
            .get(name)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn describe_collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let collections = self.collections.lock().await;
        Ok(collections.get(name).map(|c| c.info.clone()))
    }

    async fn create_timeseries_collection(
        &self,
        name: &str,
        options: TimeSeriesOptions,
    ) -> Result<()> {
        if options.time_field.is_empty() || options.meta_field.is_empty() {
            return Err(StoreError::InvalidOptions(
                "time_field and meta_field must be non-empty".to_string(),
            ));
        }

        let mut collections = self.collections.lock().await;
        if collections.contains_key(name) {
            return Err(StoreError::CollectionAlreadyExists(name.to_string()));
        }

        debug!(collection = name, granularity = options.granularity.as_str(), "Created time-series collection");
        collections.insert(
            name.to_string(),
            Collection {
                info: CollectionInfo {
                    name: name.to_string(),
                    options: Some(options),
                    created_at: Self::now_ms(),
                },
                indexes: Vec::new(),
                documents: Vec::new(),
            },
        );
        Ok(())
    }

    async fn create_indexes(&self, name: &str, indexes: &[IndexSpec]) -> Result<()> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;

        for index in indexes {
            if !collection.indexes.contains(index) {
                collection.indexes.push(index.clone());
            }
        }
        Ok(())
    }

    async fn insert_many(&self, name: &str, documents: Vec<Document>) -> Result<InsertReport> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;

        let inserted_count = documents.len();
        collection.documents.extend(documents);
        debug!(collection = name, inserted_count, "Bulk insert");
        Ok(InsertReport { inserted_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Granularity, IndexOrder};
    use serde_json::json;

    fn options() -> TimeSeriesOptions {
        TimeSeriesOptions {
            time_field: "ts".to_string(),
            meta_field: "metadata".to_string(),
            granularity: Granularity::Minutes,
            expire_after_seconds: 2_592_000,
        }
    }

    #[tokio::test]
    async fn test_describe_missing_collection() {
        let store = MemoryStore::new();
        assert!(store.describe_collection("logs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_and_describe() {
        let store = MemoryStore::new();
        store
            .create_timeseries_collection("logs", options())
            .await
            .unwrap();

        let info = store
            .describe_collection("logs")
            .await
            .unwrap()
            .expect("collection should exist");
        assert_eq!(info.name, "logs");
        assert_eq!(info.options, Some(options()));
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let store = MemoryStore::new();
        store
            .create_timeseries_collection("logs", options())
            .await
            .unwrap();

        let err = store
            .create_timeseries_collection("logs", options())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_invalid_options_rejected() {
        let store = MemoryStore::new();
        let bad = TimeSeriesOptions {
            time_field: String::new(),
            ..options()
        };
        let err = store
            .create_timeseries_collection("logs", bad)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOptions(_)));
    }

    #[tokio::test]
    async fn test_insert_requires_collection() {
        let store = MemoryStore::new();
        let err = store
            .insert_many("logs", vec![json!({"ts": 1})])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_preserves_order() {
        let store = MemoryStore::new();
        store
            .create_timeseries_collection("logs", options())
            .await
            .unwrap();

        let report = store
            .insert_many("logs", vec![json!({"ts": 1}), json!({"ts": 2})])
            .await
            .unwrap();
        assert_eq!(report.inserted_count, 2);

        store
            .insert_many("logs", vec![json!({"ts": 3})])
            .await
            .unwrap();

        let docs = store.documents("logs").await;
        let ts: Vec<i64> = docs.iter().map(|d| d["ts"].as_i64().unwrap()).collect();
        assert_eq!(ts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_create_indexes_dedupes() {
        let store = MemoryStore::new();
        store
            .create_timeseries_collection("logs", options())
            .await
            .unwrap();

        let ts_desc = IndexSpec::new([("ts", IndexOrder::Descending)]);
        store.create_indexes("logs", &[ts_desc.clone()]).await.unwrap();
        store.create_indexes("logs", &[ts_desc.clone()]).await.unwrap();

        assert_eq!(store.indexes("logs").await, vec![ts_desc]);
    }

    #[tokio::test]
    async fn test_create_indexes_requires_collection() {
        let store = MemoryStore::new();
        let err = store
            .create_indexes("logs", &[IndexSpec::new([("ts", IndexOrder::Descending)])])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound(_)));
    }
}
