//! Transporter Configuration
//!
//! This module defines the configuration surface of the transport engine:
//! an immutable-after-construction [`TransporterConfig`] produced by the
//! fluent [`TransporterBuilder`].
//!
//! ## Configuration Fields
//!
//! - `store`: Required. Destination handle (`Arc<dyn TimeSeriesStore>`).
//! - `collection_name`: Destination collection (default: "logs")
//! - `granularity`: Time-series bucketing hint (default: minutes)
//! - `batch_size`: Rows to accumulate before a size-triggered flush (default: 5000)
//! - `update_interval`: Rolling idle timer (default: 1s)
//! - `log_ttl_seconds`: Retention TTL on the created collection (default: 30 days)
//! - `shutdown_grace`: Bound on the close-time drain (default: 5s)
//! - Four lifecycle callbacks, all defaulting to no-ops
//!
//! ## Callbacks
//!
//! Persistence is asynchronous; the callbacks are the caller's only window
//! into flush outcomes:
//!
//! - `on_before_write(buffer_len)` - a flush is starting; `buffer_len` is the
//!   buffer length after the batch was removed
//! - `on_after_write(report, buffer_len)` - the bulk insert succeeded
//! - `on_error(error)` - provisioning or a flush failed (a failed flush's
//!   batch is dropped; wiring this callback is the only way to notice)
//! - `on_finally_write(buffer_len)` - a flush finished, success or not
//!
//! ## Example
//!
//! ```ignore
//! use logship_transport::Transporter;
//! use logship_store::{Granularity, MemoryStore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let transporter = Transporter::builder()
//!     .store(Arc::new(MemoryStore::new()))
//!     .collection_name("app_logs")
//!     .granularity(Granularity::Seconds)
//!     .batch_size(1000)
//!     .update_interval(Duration::from_secs(2))
//!     .on_error(|err| eprintln!("logship: {err}"))
//!     .build()?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use logship_store::{Granularity, InsertReport, TimeSeriesStore};

use crate::error::{Result, TransportError};
use crate::transporter::Transporter;

/// Called before each bulk insert with the post-removal buffer length.
pub type BeforeWriteCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Called after a successful bulk insert with the insert report and the
/// current buffer length.
pub type AfterWriteCallback = Arc<dyn Fn(&InsertReport, usize) + Send + Sync>;

/// Called when provisioning or a flush fails.
pub type ErrorCallback = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Called after each flush attempt, regardless of outcome, with the current
/// buffer length.
pub type FinallyWriteCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Resolved transporter configuration (immutable after `build()`).
///
/// Users should not construct this directly; use [`Transporter::builder`].
#[derive(Clone)]
pub struct TransporterConfig {
    /// Destination store handle.
    pub store: Arc<dyn TimeSeriesStore>,

    /// Name of the destination collection.
    pub collection_name: String,

    /// Granularity hint used if the collection has to be created.
    pub granularity: Granularity,

    /// Size threshold: a flush of exactly this many rows is triggered when
    /// the buffer grows past it.
    pub batch_size: usize,

    /// Rolling idle interval: a full-buffer flush fires this long after the
    /// most recent ingest.
    pub update_interval: Duration,

    /// Retention TTL (seconds) declared on a newly created collection.
    pub log_ttl_seconds: u64,

    /// Upper bound on the close-time drain.
    pub shutdown_grace: Duration,

    /// Lifecycle callback: flush starting.
    pub on_before_write: BeforeWriteCallback,

    /// Lifecycle callback: flush succeeded.
    pub on_after_write: AfterWriteCallback,

    /// Lifecycle callback: provisioning or flush failed.
    pub on_error: ErrorCallback,

    /// Lifecycle callback: flush finished (success or failure).
    pub on_finally_write: FinallyWriteCallback,
}

impl std::fmt::Debug for TransporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransporterConfig")
            .field("collection_name", &self.collection_name)
            .field("granularity", &self.granularity)
            .field("batch_size", &self.batch_size)
            .field("update_interval", &self.update_interval)
            .field("log_ttl_seconds", &self.log_ttl_seconds)
            .field("shutdown_grace", &self.shutdown_grace)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`Transporter`].
///
/// Every field except `store` has a default; `build()` fails with
/// [`TransportError::Config`] when the store handle is missing.
pub struct TransporterBuilder {
    store: Option<Arc<dyn TimeSeriesStore>>,
    collection_name: String,
    granularity: Granularity,
    batch_size: usize,
    update_interval: Duration,
    log_ttl_seconds: u64,
    shutdown_grace: Duration,
    on_before_write: BeforeWriteCallback,
    on_after_write: AfterWriteCallback,
    on_error: ErrorCallback,
    on_finally_write: FinallyWriteCallback,
}

impl TransporterBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            store: None,
            collection_name: "logs".to_string(),
            granularity: Granularity::Minutes,
            batch_size: 5000,
            update_interval: Duration::from_secs(1),
            log_ttl_seconds: 2_592_000, // 30 days
            shutdown_grace: Duration::from_secs(5),
            on_before_write: Arc::new(|_| {}),
            on_after_write: Arc::new(|_, _| {}),
            on_error: Arc::new(|_| {}),
            on_finally_write: Arc::new(|_| {}),
        }
    }

    /// Destination store handle (required).
    pub fn store(mut self, store: Arc<dyn TimeSeriesStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Destination collection name. Default: `"logs"`.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    /// Time-series granularity used when the collection is created.
    /// Default: [`Granularity::Minutes`].
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Size-trigger threshold. Default: 5000 rows.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Rolling idle interval. Default: 1 second.
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Retention TTL in seconds, measured from the time field.
    /// Default: 2,592,000 (30 days).
    pub fn log_ttl_seconds(mut self, seconds: u64) -> Self {
        self.log_ttl_seconds = seconds;
        self
    }

    /// Upper bound on the close-time drain. Default: 5 seconds.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Callback invoked before each bulk insert.
    pub fn on_before_write(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_before_write = Arc::new(f);
        self
    }

    /// Callback invoked after each successful bulk insert.
    pub fn on_after_write(
        mut self,
        f: impl Fn(&InsertReport, usize) + Send + Sync + 'static,
    ) -> Self {
        self.on_after_write = Arc::new(f);
        self
    }

    /// Callback invoked when provisioning or a flush fails.
    ///
    /// Without this callback, a failed flush is silent data loss.
    pub fn on_error(mut self, f: impl Fn(&TransportError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(f);
        self
    }

    /// Callback invoked after each flush attempt, regardless of outcome.
    pub fn on_finally_write(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_finally_write = Arc::new(f);
        self
    }

    /// Resolve the configuration and construct the [`Transporter`].
    ///
    /// # Errors
    ///
    /// [`TransportError::Config`] if no store handle was supplied.
    pub fn build(self) -> Result<Transporter> {
        let store = self
            .store
            .ok_or_else(|| TransportError::Config("store is required".to_string()))?;

        Ok(Transporter::from_config(TransporterConfig {
            store,
            collection_name: self.collection_name,
            granularity: self.granularity,
            batch_size: self.batch_size,
            update_interval: self.update_interval,
            log_ttl_seconds: self.log_ttl_seconds,
            shutdown_grace: self.shutdown_grace,
            on_before_write: self.on_before_write,
            on_after_write: self.on_after_write,
            on_error: self.on_error,
            on_finally_write: self.on_finally_write,
        }))
    }
}

impl Default for TransporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logship_store::MemoryStore;

    #[test]
    fn test_build_requires_store() {
        let err = TransporterBuilder::new().build().unwrap_err();
        assert!(matches!(err, TransportError::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let builder = TransporterBuilder::new();
        assert_eq!(builder.collection_name, "logs");
        assert_eq!(builder.granularity, Granularity::Minutes);
        assert_eq!(builder.batch_size, 5000);
        assert_eq!(builder.update_interval, Duration::from_secs(1));
        assert_eq!(builder.log_ttl_seconds, 2_592_000);
        assert_eq!(builder.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_overrides() {
        let transporter = TransporterBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .collection_name("app_logs")
            .granularity(Granularity::Seconds)
            .batch_size(10)
            .update_interval(Duration::from_millis(50))
            .log_ttl_seconds(60)
            .build()
            .unwrap();

        let config = transporter.config();
        assert_eq!(config.collection_name, "app_logs");
        assert_eq!(config.granularity, Granularity::Seconds);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.update_interval, Duration::from_millis(50));
        assert_eq!(config.log_ttl_seconds, 60);
    }
}
