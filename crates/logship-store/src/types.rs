//! Store Type Definitions
//!
//! This module defines the data structures exchanged with a
//! [`TimeSeriesStore`](crate::TimeSeriesStore) backend.
//!
//! ## Types Overview
//!
//! ### TimeSeriesOptions
//! Declares the shape of a time-series collection at creation time: which
//! document field carries the timestamp, which carries the label/metadata
//! payload, the bucketing granularity, and the retention TTL.
//!
//! ### Granularity
//! A hint to the backend about the expected spacing between timestamps,
//! used for internal storage bucketing.
//!
//! ### IndexSpec
//! An ordered list of `(field path, order)` pairs describing one secondary
//! index. Field paths use dotted notation to reach into the metadata payload
//! (e.g. `metadata.hostname`).
//!
//! ### CollectionInfo
//! What `describe_collection` reports about an existing collection.
//!
//! ### InsertReport
//! Result of a bulk insert: how many documents the backend accepted.
//!
//! ## Design Decisions
//!
//! - All types are Serialize/Deserialize for storage and API responses
//! - Documents are `serde_json::Value` objects; the backend stores them
//!   verbatim, keyed by first-seen field order within the metadata payload
//! - Timestamps are i64 (milliseconds since epoch) for simplicity

use serde::{Deserialize, Serialize};

/// A document as handed to the store: an object-shaped JSON value.
///
/// The store does not interpret documents beyond the declared time and meta
/// fields; callers are responsible for keeping field order stable across
/// inserts (the backend's columnar layout is keyed by first-seen order).
pub type Document = serde_json::Value;

/// Expected spacing between timestamps in a time-series collection.
///
/// This is a storage-bucketing hint only; it does not constrain what
/// timestamps may be inserted.
///
/// # Examples
///
/// ```ignore
/// use logship_store::Granularity;
///
/// let g = Granularity::default();
/// assert_eq!(g, Granularity::Minutes);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Sub-minute spacing between consecutive data points.
    Seconds,
    /// Roughly minute-level spacing (default).
    #[default]
    Minutes,
    /// Roughly hour-level spacing.
    Hours,
}

impl Granularity {
    /// The lowercase name the backend expects (`"seconds"`, `"minutes"`,
    /// `"hours"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Seconds => "seconds",
            Granularity::Minutes => "minutes",
            Granularity::Hours => "hours",
        }
    }
}

/// Options declared when creating a time-series collection.
///
/// # Fields
///
/// * `time_field` - Name of the document field holding the timestamp
/// * `meta_field` - Name of the document field holding the label/metadata payload
/// * `granularity` - Storage bucketing hint
/// * `expire_after_seconds` - Retention TTL: documents age out automatically
///   once older than this many seconds, measured from `time_field`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesOptions {
    /// Name of the document field holding the timestamp.
    pub time_field: String,

    /// Name of the document field holding the label/metadata payload.
    pub meta_field: String,

    /// Expected spacing between timestamps.
    pub granularity: Granularity,

    /// Seconds after which a document is eligible for automatic deletion,
    /// measured from its time field.
    pub expire_after_seconds: u64,
}

/// Sort order of one field within an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexOrder {
    Ascending,
    Descending,
}

/// One secondary index: an ordered list of `(field path, order)` pairs.
///
/// # Examples
///
/// ```ignore
/// use logship_store::{IndexOrder, IndexSpec};
///
/// // Compound index: newest-first by time, then severity name, then host.
/// let index = IndexSpec::new([
///     ("ts", IndexOrder::Descending),
///     ("metadata.severity_name", IndexOrder::Ascending),
///     ("metadata.hostname", IndexOrder::Ascending),
/// ]);
/// assert_eq!(index.keys.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// Indexed fields in significance order.
    pub keys: Vec<(String, IndexOrder)>,
}

impl IndexSpec {
    /// Build an index spec from `(path, order)` pairs.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = (S, IndexOrder)>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|(path, order)| (path.into(), order))
                .collect(),
        }
    }
}

/// Description of an existing collection, as returned by
/// `describe_collection`.
///
/// `options` is `None` for plain (non-time-series) collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,

    /// Time-series options the collection was created with, if any.
    pub options: Option<TimeSeriesOptions>,

    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Result of a bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReport {
    /// Number of documents the backend accepted.
    pub inserted_count: usize,
}
