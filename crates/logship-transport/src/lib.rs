//! LogShip Transport - Buffered Batch Shipping of Structured Logs
//!
//! This crate receives discrete log records from a producer, accumulates
//! them in memory, and flushes them in ordered batches to an append-only
//! time-series collection — trading per-record write latency for throughput
//! and storage efficiency.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Producer   │ one structured record at a time
//! └──────┬───────┘
//!        │ ingest()
//!        ▼
//! ┌──────────────────────────────┐
//! │ Transporter                  │ shaping → buffer → triggers
//! │  - size trigger (batch_size) │
//! │  - idle trigger (interval)   │
//! │  - single-writer guard       │
//! │  - lazy provisioning         │
//! └──────┬───────────────────────┘
//!        │ insert_many (ordered batches)
//!        ▼
//! ┌──────────────────────────────┐
//! │ TimeSeriesStore              │ time-series collection + indexes
//! └──────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use logship_store::MemoryStore;
//! use logship_transport::{LogRecord, Transporter};
//! use std::sync::Arc;
//!
//! let transporter = Transporter::builder()
//!     .store(Arc::new(MemoryStore::new()))
//!     .batch_size(1000)
//!     .on_error(|err| eprintln!("logship: {err}"))
//!     .build()?;
//!
//! transporter.ingest(record).await?;
//! // ...
//! transporter.close().await?;
//! ```
//!
//! ## What this is not
//!
//! Not a message queue (no consumer side, no redelivery), not a schema
//! validator, and not responsible for retrying failed writes — a failed
//! flush drops its batch after reporting through `on_error`.

pub mod config;
pub mod error;
pub mod record;
pub mod transporter;

pub use config::{TransporterBuilder, TransporterConfig};
pub use error::{Result, TransportError};
pub use record::{CallSite, LogRecord, LogRow, RowMetadata};
pub use transporter::Transporter;
