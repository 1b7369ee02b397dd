//! Record Shaping
//!
//! This module converts the producer-facing [`LogRecord`] into the
//! fixed-shape [`LogRow`] held in the buffer and persisted to the store.
//!
//! ## Why a separate shape?
//!
//! The producer's record layout and the destination's document layout are
//! different contracts. Shaping decouples them and, more importantly, pins
//! the persisted field order: time-series backends key their columnar layout
//! by first-seen field order within the metadata payload, so every row this
//! process ever writes must present its fields in the same order.
//!
//! Two things guarantee that here:
//! 1. [`RowMetadata`] declares its fields in the persisted order, and serde
//!    serializes struct fields in declaration order.
//! 2. `serde_json` is built with `preserve_order`, so converting a row to a
//!    [`Document`](logship_store::Document) keeps that order in the JSON map.
//!
//! Shaping is a pure copy: no validation, no defaulting, no side effects.
//!
//! ## Persisted document shape
//!
//! ```text
//! {
//!   ts:       <timestamp>,
//!   severity: <integer level>,
//!   metadata: {
//!     runtime, runtime_version, hostname, severity_name,
//!     arguments, source, parent_sources, call_site
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call-site descriptor attached to a record by the producer.
///
/// All fields are copied verbatim; the transport never inspects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Absolute path of the emitting source file.
    pub full_file_path: String,
    /// File name only.
    pub file_name: String,
    /// File name with the line appended (producer formatting).
    pub file_name_with_line: String,
    /// Column within the line.
    pub file_column: String,
    /// Line number.
    pub file_line: String,
    /// Path relative to the project root.
    pub file_path: String,
    /// Relative path with the line appended.
    pub file_path_with_line: String,
    /// Emitting method or function name.
    pub method: String,
}

/// One structured log event as handed to [`Transporter::ingest`].
///
/// This is the producer's contract: a timestamp, a numeric severity, the
/// original argument list, and source metadata. The transport copies fields
/// as-is; their semantics belong to the producer.
///
/// [`Transporter::ingest`]: crate::Transporter::ingest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Event time.
    pub timestamp: DateTime<Utc>,
    /// Numeric severity level.
    pub severity: i64,
    /// Human-readable severity name (e.g. "INFO").
    pub severity_name: String,
    /// The original argument list of the log call.
    pub arguments: Vec<serde_json::Value>,
    /// Runtime identity (e.g. process/runtime name).
    pub runtime: String,
    /// Runtime version.
    pub runtime_version: String,
    /// Host the event was emitted on.
    pub hostname: String,
    /// Logical source (logger) name, if the producer sets one.
    pub source: Option<String>,
    /// Parent source chain, if the producer nests loggers.
    pub parent_sources: Option<String>,
    /// Call-site descriptor, if captured.
    pub call_site: Option<CallSite>,
}

/// Label/metadata payload of a persisted row.
///
/// Field declaration order here IS the persisted field order. Do not reorder
/// fields: the destination's storage layout is keyed by first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowMetadata {
    pub runtime: String,
    pub runtime_version: String,
    pub hostname: String,
    pub severity_name: String,
    pub arguments: Vec<serde_json::Value>,
    pub source: Option<String>,
    pub parent_sources: Option<String>,
    pub call_site: Option<CallSite>,
}

/// The shaped row held in the buffer and bulk-inserted into the destination.
///
/// `ts` is the collection's time field and `metadata` its meta field (see
/// the provisioning options in [`Transporter`](crate::Transporter)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    /// Timestamp (the collection's declared time field).
    pub ts: DateTime<Utc>,
    /// Numeric severity level.
    pub severity: i64,
    /// Label payload (the collection's declared meta field).
    pub metadata: RowMetadata,
}

impl From<LogRecord> for LogRow {
    fn from(record: LogRecord) -> Self {
        LogRow {
            ts: record.timestamp,
            severity: record.severity,
            metadata: RowMetadata {
                runtime: record.runtime,
                runtime_version: record.runtime_version,
                hostname: record.hostname,
                severity_name: record.severity_name,
                arguments: record.arguments,
                source: record.source,
                parent_sources: record.parent_sources,
                call_site: record.call_site,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            severity: 3,
            severity_name: "INFO".to_string(),
            arguments: vec![json!("hello"), json!(42)],
            runtime: "rust".to_string(),
            runtime_version: "1.75.0".to_string(),
            hostname: "host-a".to_string(),
            source: Some("api".to_string()),
            parent_sources: None,
            call_site: None,
        }
    }

    #[test]
    fn test_shaping_copies_fields() {
        let input = record();
        let row = LogRow::from(input.clone());

        assert_eq!(row.ts, input.timestamp);
        assert_eq!(row.severity, 3);
        assert_eq!(row.metadata.severity_name, "INFO");
        assert_eq!(row.metadata.hostname, "host-a");
        assert_eq!(row.metadata.arguments, vec![json!("hello"), json!(42)]);
        assert_eq!(row.metadata.source.as_deref(), Some("api"));
        assert!(row.metadata.parent_sources.is_none());
    }

    #[test]
    fn test_document_field_order_is_stable() {
        let row = LogRow::from(record());
        let doc = serde_json::to_value(&row).unwrap();

        let top: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(top, ["ts", "severity", "metadata"]);

        let meta: Vec<&String> = doc["metadata"].as_object().unwrap().keys().collect();
        assert_eq!(
            meta,
            [
                "runtime",
                "runtime_version",
                "hostname",
                "severity_name",
                "arguments",
                "source",
                "parent_sources",
                "call_site",
            ]
        );
    }
}
