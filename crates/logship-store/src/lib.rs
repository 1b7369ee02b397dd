//! LogShip Store - Time-Series Destination Abstraction
//!
//! This crate defines the destination side of LogShip: a document-oriented
//! time-series store reached through a connection handle supplied by the
//! caller.
//!
//! ## Purpose
//!
//! The transport engine (see `logship-transport`) only ever needs four
//! operations from its destination:
//! - Describe a named collection (does it exist, and how was it created?)
//! - Create a time-series-typed collection with a declared time field,
//!   label/meta field, granularity hint, and retention TTL
//! - Create secondary indexes on that collection
//! - Bulk-insert an ordered list of documents
//!
//! Everything else about the destination (query language, replication,
//! compression) is out of scope, so the seam is a small trait rather than a
//! concrete driver.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ logship-transport│ buffers rows, flushes batches
//! └────────┬─────────┘
//!          │ Arc<dyn TimeSeriesStore>
//!          ▼
//! ┌──────────────────┐     ┌──────────────────────────┐
//! │ TimeSeriesStore  │ ◄───│ MemoryStore (tests/dev)  │
//! │     (trait)      │     │ <your driver adapter>    │
//! └──────────────────┘     └──────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use logship_store::{
//!     Granularity, IndexOrder, IndexSpec, MemoryStore, TimeSeriesOptions, TimeSeriesStore,
//! };
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//!
//! store.create_timeseries_collection("logs", TimeSeriesOptions {
//!     time_field: "ts".to_string(),
//!     meta_field: "metadata".to_string(),
//!     granularity: Granularity::Minutes,
//!     expire_after_seconds: 2_592_000, // 30 days
//! }).await?;
//!
//! store.create_indexes("logs", &[
//!     IndexSpec::new([("ts", IndexOrder::Descending)]),
//! ]).await?;
//!
//! let report = store.insert_many("logs", vec![json!({"ts": 0, "metadata": {}})]).await?;
//! assert_eq!(report.inserted_count, 1);
//! ```
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync`; the transport shares the handle
//! across async tasks via `Arc<dyn TimeSeriesStore>`.

pub mod error;
pub mod memory;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use types::{
    CollectionInfo, Document, Granularity, IndexOrder, IndexSpec, InsertReport, TimeSeriesOptions,
};

use async_trait::async_trait;

/// Destination store trait - abstracts over time-series document backends.
///
/// This is the only contract the transport engine holds against its
/// destination. It can be implemented by an in-process store (see
/// [`MemoryStore`]) or by an adapter over a real database driver.
///
/// ## Semantics implementations must honor
///
/// - `insert_many` appends documents in the order given; partial-insert
///   behavior on failure is the backend's concern and is surfaced only as a
///   pass/fail result.
/// - `describe_collection` returning `Ok(None)` means "definitely absent";
///   lookup failures must be errors, not `None`.
/// - `create_timeseries_collection` on an existing name fails with
///   [`StoreError::CollectionAlreadyExists`].
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Look up a collection by name.
    ///
    /// # Returns
    ///
    /// `Some(info)` if the collection exists, `None` if it does not.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if the lookup itself failed (the caller must
    /// not treat this as "absent").
    async fn describe_collection(&self, name: &str) -> Result<Option<CollectionInfo>>;

    /// Create a time-series-typed collection.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CollectionAlreadyExists`] if the name is taken
    /// - [`StoreError::InvalidOptions`] if the backend rejects the options
    async fn create_timeseries_collection(
        &self,
        name: &str,
        options: TimeSeriesOptions,
    ) -> Result<()>;

    /// Create secondary indexes on an existing collection.
    ///
    /// Creating an index that already exists with the same keys is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::CollectionNotFound`] if the collection is absent.
    async fn create_indexes(&self, name: &str, indexes: &[IndexSpec]) -> Result<()>;

    /// Bulk-insert documents, preserving the given order.
    ///
    /// # Errors
    ///
    /// [`StoreError::CollectionNotFound`] if the collection is absent.
    async fn insert_many(&self, name: &str, documents: Vec<Document>) -> Result<InsertReport>;
}
