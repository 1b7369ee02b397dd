//! Error types for LogShip transport operations.
//!
//! This module defines all possible errors that can occur while buffering
//! and flushing log rows. Errors are categorized by where they happen in the
//! pipeline to make debugging easier.
//!
//! ## Error Handling Strategy
//!
//! - **Provisioning errors** (`CollectionLookup`, `CollectionCreate`): reported
//!   to the `on_error` callback AND returned from the `ingest` call that
//!   triggered provisioning. Readiness is never set, so a later ingest retries.
//! - **Write errors** (`WriteFailed`, `Serialize`): reported only via the
//!   `on_error` callback; the batch is dropped, not retried or re-queued.
//! - **Shutdown** (`ShutdownTimeout`): the bounded close-time drain ran out of
//!   its grace period.
//!
//! No error kind is fatal to the process; the `on_error` callback is the
//! caller's sole recovery hook.

use logship_store::StoreError;
use thiserror::Error;

/// Convenience type alias for `Result<T, TransportError>`.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Builder misconfiguration (e.g. no store handle supplied).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The destination could not be queried for the collection's existence.
    ///
    /// Provisioning aborts; the next ingest call retries it.
    #[error("Cannot check if collection exists: {0}")]
    CollectionLookup(#[source] StoreError),

    /// The destination rejected creation of the time-series collection or
    /// its indexes.
    ///
    /// Provisioning aborts; the next ingest call retries it.
    #[error("Cannot create time-series collection: {0}")]
    CollectionCreate(#[source] StoreError),

    /// A buffered row could not be serialized into a store document.
    ///
    /// The batch containing it is dropped after reporting.
    #[error("Cannot serialize row: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The destination rejected a bulk insert.
    ///
    /// The batch is dropped after reporting; it is never re-queued.
    #[error("Bulk insert failed: {0}")]
    WriteFailed(#[source] StoreError),

    /// The close-time drain did not finish within the configured grace period.
    #[error("Shutdown drain exceeded grace period")]
    ShutdownTimeout,
}
