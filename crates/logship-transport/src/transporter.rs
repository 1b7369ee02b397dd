//! Buffer & Flush Scheduler
//!
//! This module is the core of LogShip: the in-memory bucket of shaped rows,
//! the two flush triggers, the single-writer guard, and the lazy one-shot
//! provisioning of the destination collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ ingest(rec)  │ Transporter API (one record per call)
//! └──────┬───────┘
//!        │
//!        ├─→ provision destination (first call only, guarded by `checking`)
//!        ├─→ size trigger: len > batch_size → flush exactly batch_size rows
//!        ├─→ append shaped row (always, even before readiness)
//!        └─→ reset rolling timer (cancel pending, schedule anew)
//!
//!            rolling timer due, ready && !writing
//!        ──→ flush the entire buffer
//!            (otherwise: retry after another interval)
//! ```
//!
//! ## Flush Triggers
//!
//! - **Size**: bounds memory and write latency under high load. Fires inside
//!   `ingest` when the buffer has grown past `batch_size`, removing exactly
//!   `batch_size` rows from the front.
//! - **Idle timer**: bounds staleness under low load. A single pending timer
//!   is rescheduled by every ingest; when it fires with the engine ready and
//!   idle it drains the whole buffer.
//!
//! Both triggers share one single-writer guard (`writing`), so at most one
//! bulk insert is in flight at any moment and batches never interleave. The
//! destination relies on append order and field-order stability for its
//! storage layout; overlapping writes would break that.
//!
//! ## Concurrency Model
//!
//! All mutable state (buffer, three flags, timer handle) lives in one
//! `State` struct behind a `tokio::sync::Mutex`. Store calls (provisioning
//! lookups, bulk inserts) always run with the lock released, so concurrent
//! ingestion appends freely while a write or provisioning attempt is in
//! flight. Rows appended during a flush are never part of the snapshot the
//! flush already took.
//!
//! No timeout wraps a bulk insert: a hung destination call keeps `writing`
//! set and stalls every later flush until it resolves. Only `close()` bounds
//! its wait.
//!
//! ## Ordering Guarantees
//!
//! Rows are appended in ingestion-call order and flushed in that same
//! relative order; every flush removes a prefix (or the whole buffer). The
//! set of rows ever flushed is a prefix-partition of the ingestion order —
//! no reordering, no duplication, no loss except a reported write failure
//! (whose batch is dropped, not re-queued).

use std::sync::Arc;
use std::time::Duration;

use logship_store::{IndexOrder, IndexSpec, InsertReport, TimeSeriesOptions};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::config::{TransporterBuilder, TransporterConfig};
use crate::error::{Result, TransportError};
use crate::record::{LogRecord, LogRow};

/// Document field holding the timestamp (the collection's time field).
const TIME_FIELD: &str = "ts";

/// Document field holding the label payload (the collection's meta field).
const META_FIELD: &str = "metadata";

/// Mutable scheduler state, owned exclusively through `Inner::state`.
struct State {
    /// Ordered queue of shaped rows awaiting a flush.
    bucket: Vec<LogRow>,

    /// The destination collection is confirmed to exist.
    ready: bool,

    /// A provisioning attempt is in flight (suppresses concurrent attempts).
    checking: bool,

    /// A flush is in flight (single-writer guard).
    writing: bool,

    /// The one pending rolling timer; every ingest replaces it.
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    config: TransporterConfig,
    state: Mutex<State>,
}

/// Buffered batch transport into a time-series collection.
///
/// Accepts one structured [`LogRecord`] per [`ingest`](Self::ingest) call,
/// accumulates shaped rows in memory, and flushes them in ordered batches to
/// the configured [`TimeSeriesStore`](logship_store::TimeSeriesStore) —
/// trading per-record write latency for throughput.
///
/// ## Lifecycle
///
/// 1. **Creation**: [`Transporter::builder()`] — the store handle is the only
///    required setting.
/// 2. **Usage**: call `ingest()` once per record. The first call lazily
///    resolves or creates the destination collection.
/// 3. **Shutdown**: call [`close()`](Self::close) to drain the buffer within
///    a bounded grace period.
///
/// ## Thread Safety
///
/// `Transporter` is `Send + Sync`; share it across tasks via `Arc` (or
/// clone it — clones share the same buffer and scheduler state).
///
/// ## Persistence reporting
///
/// `ingest` returns once shaping, any triggered provisioning, and the buffer
/// append have completed. It does NOT report eventual persistence; flush
/// outcomes are visible only through the configured callbacks. Without an
/// `on_error` callback, a failed flush is silent data loss.
///
/// ## Example
///
/// ```ignore
/// use logship_transport::{LogRecord, Transporter};
/// use logship_store::MemoryStore;
/// use std::sync::Arc;
///
/// let transporter = Transporter::builder()
///     .store(Arc::new(MemoryStore::new()))
///     .build()?;
///
/// transporter.ingest(record).await?;
/// // ... later ...
/// transporter.close().await?;
/// ```
#[derive(Clone)]
pub struct Transporter {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Transporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transporter").finish_non_exhaustive()
    }
}

impl Transporter {
    /// Create a new [`TransporterBuilder`] with default settings.
    pub fn builder() -> TransporterBuilder {
        TransporterBuilder::new()
    }

    pub(crate) fn from_config(config: TransporterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State {
                    bucket: Vec::new(),
                    ready: false,
                    checking: false,
                    writing: false,
                    timer: None,
                }),
            }),
        }
    }

    /// The resolved configuration.
    pub fn config(&self) -> &TransporterConfig {
        &self.inner.config
    }

    /// Number of rows currently buffered.
    pub async fn buffer_len(&self) -> usize {
        self.inner.state.lock().await.bucket.len()
    }

    /// Ingest one structured log record.
    ///
    /// The record is shaped into its fixed row layout and appended to the
    /// buffer unconditionally — even while the destination is still being
    /// provisioned, rows accumulate and are flushed once readiness is
    /// established.
    ///
    /// # Behavior
    ///
    /// 1. If the destination is not yet resolved and no provisioning attempt
    ///    is in flight, this call runs provisioning (resolve-or-create the
    ///    collection and its indexes).
    /// 2. If the buffer has grown past `batch_size` and the engine is ready
    ///    and idle, exactly `batch_size` rows are removed from the front and
    ///    flushed in the background.
    /// 3. The shaped row is appended.
    /// 4. The rolling idle timer is reset to fire `update_interval` from now.
    ///
    /// # Errors
    ///
    /// Only the call that runs a failing provisioning attempt returns an
    /// error ([`TransportError::CollectionLookup`] or
    /// [`TransportError::CollectionCreate`], also reported to `on_error`).
    /// The row is appended regardless, and the next ingest retries
    /// provisioning. Flush failures never surface here; they go to
    /// `on_error` only.
    pub async fn ingest(&self, record: LogRecord) -> Result<()> {
        let row = LogRow::from(record);
        let inner = &self.inner;

        // Lazy provisioning. The check-and-set of `checking` is atomic under
        // the state lock, so at most one attempt runs at a time; the store
        // calls themselves happen with the lock released.
        let should_check = {
            let mut state = inner.state.lock().await;
            if !state.ready && !state.checking {
                state.checking = true;
                true
            } else {
                false
            }
        };

        let mut provision_result = Ok(());
        if should_check {
            match provision(inner).await {
                Ok(()) => {
                    let mut state = inner.state.lock().await;
                    state.ready = true;
                    state.checking = false;
                }
                Err(err) => {
                    inner.state.lock().await.checking = false;
                    (inner.config.on_error)(&err);
                    provision_result = Err(err);
                }
            }
        }

        let mut state = inner.state.lock().await;

        // Size trigger, evaluated before the append: exactly batch_size rows
        // off the front.
        if state.bucket.len() > inner.config.batch_size && state.ready && !state.writing {
            let batch: Vec<LogRow> = state.bucket.drain(..inner.config.batch_size).collect();
            state.writing = true;
            let buffer_len = state.bucket.len();
            trace!(
                batch_len = batch.len(),
                buffer_len,
                "Size-triggered flush"
            );
            let task_inner = Arc::clone(inner);
            tokio::spawn(async move {
                let _ = write_batch(task_inner, batch, buffer_len).await;
            });
        }

        state.bucket.push(row);

        // Reset the rolling timer: at most one pending timer exists and
        // every new record replaces it.
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.timer = Some(spawn_rolling_timer(Arc::clone(inner)));

        provision_result
    }

    /// Flush the entire buffer now.
    ///
    /// A no-op (returning `Ok`) when the destination is not yet ready, a
    /// flush is already in flight, or the buffer is empty. Unlike the
    /// scheduler-triggered paths, the write is awaited and its failure is
    /// returned (after the usual callbacks have fired).
    pub async fn flush(&self) -> Result<()> {
        let batch = {
            let mut state = self.inner.state.lock().await;
            if !state.ready || state.writing || state.bucket.is_empty() {
                return Ok(());
            }
            state.writing = true;
            std::mem::take(&mut state.bucket)
        };
        write_batch(Arc::clone(&self.inner), batch, 0).await
    }

    /// Drain the buffer and shut down, bounded by `shutdown_grace`.
    ///
    /// Cancels the rolling timer, waits for any in-flight write to finish,
    /// then runs one final awaited flush of everything left in the buffer.
    /// The whole drain is capped by the configured grace period; on timeout
    /// [`TransportError::ShutdownTimeout`] is reported to `on_error` and
    /// returned, and whatever did not make it out is lost.
    ///
    /// Records ingested by other clones after `close` begins are outside the
    /// drain — this bounds the data-loss window, it does not remove it. If
    /// the destination was never provisioned there is nowhere to write and
    /// the buffer is discarded.
    pub async fn close(self) -> Result<()> {
        let inner = self.inner;

        {
            let mut state = inner.state.lock().await;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }

        match tokio::time::timeout(inner.config.shutdown_grace, drain_all(Arc::clone(&inner)))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                let err = TransportError::ShutdownTimeout;
                (inner.config.on_error)(&err);
                Err(err)
            }
        }
    }
}

/// Close-time drain: wait out any in-flight write, then flush everything.
async fn drain_all(inner: Arc<Inner>) -> Result<()> {
    loop {
        let batch = {
            let mut state = inner.state.lock().await;
            if state.writing {
                None
            } else if !state.ready {
                let dropped = state.bucket.len();
                if dropped > 0 {
                    warn!(dropped, "Discarding buffered rows: destination was never provisioned");
                }
                state.bucket.clear();
                return Ok(());
            } else if state.bucket.is_empty() {
                return Ok(());
            } else {
                state.writing = true;
                Some(std::mem::take(&mut state.bucket))
            }
        };

        match batch {
            Some(batch) => return write_batch(inner, batch, 0).await,
            None => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }
}

/// Spawn the rolling idle timer.
///
/// The timer fires `update_interval` after the most recent ingest. If the
/// engine is ready and idle it drains the whole buffer; otherwise it keeps
/// the idle-flush obligation and retries after another full interval (a
/// loop, so an in-flight write or pending provisioning defers the flush
/// rather than dropping it).
fn spawn_rolling_timer(inner: Arc<Inner>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = inner.config.update_interval;
        loop {
            tokio::time::sleep(interval).await;

            let mut state = inner.state.lock().await;
            if state.ready && !state.writing {
                let batch = std::mem::take(&mut state.bucket);
                if batch.is_empty() {
                    return;
                }
                state.writing = true;
                let buffer_len = state.bucket.len();
                drop(state);

                trace!(batch_len = batch.len(), "Idle-timer flush");
                // Spawned, not awaited: aborting the timer (every ingest does)
                // must never cancel an insert already underway.
                let task_inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    let _ = write_batch(task_inner, batch, buffer_len).await;
                });
                return;
            }
            // Not ready, or a write is in flight: retry next interval.
        }
    })
}

/// Write one batch to the destination and run the lifecycle callbacks.
///
/// Preconditions: the caller removed `batch` from the buffer and set
/// `writing`. An empty batch is a no-op (no callbacks fire). On failure the
/// batch is dropped after reporting — never retried, never re-queued. The
/// `writing` guard is cleared in all cases.
async fn write_batch(inner: Arc<Inner>, batch: Vec<LogRow>, buffer_len: usize) -> Result<()> {
    let config = &inner.config;

    if batch.is_empty() {
        inner.state.lock().await.writing = false;
        return Ok(());
    }

    let batch_len = batch.len();
    (config.on_before_write)(buffer_len);

    let outcome = match insert_rows(config, batch).await {
        Ok(report) => {
            debug!(
                collection = %config.collection_name,
                batch_len,
                inserted = report.inserted_count,
                "Flushed batch"
            );
            let len = inner.state.lock().await.bucket.len();
            (config.on_after_write)(&report, len);
            Ok(())
        }
        Err(err) => {
            error!(
                collection = %config.collection_name,
                batch_len,
                error = %err,
                "Flush failed; batch dropped"
            );
            (config.on_error)(&err);
            Err(err)
        }
    };

    let len = inner.state.lock().await.bucket.len();
    (config.on_finally_write)(len);
    inner.state.lock().await.writing = false;

    outcome
}

/// Serialize rows into documents (in order) and bulk-insert them.
async fn insert_rows(config: &TransporterConfig, batch: Vec<LogRow>) -> Result<InsertReport> {
    let mut documents = Vec::with_capacity(batch.len());
    for row in &batch {
        documents.push(serde_json::to_value(row).map_err(TransportError::Serialize)?);
    }

    config
        .store
        .insert_many(&config.collection_name, documents)
        .await
        .map_err(TransportError::WriteFailed)
}

/// Resolve the destination collection, creating it if absent.
///
/// Runs at most once to success per process (gated by `ready`/`checking` in
/// `ingest`). An existing collection is bound as-is — its granularity and
/// TTL are NOT re-validated against the configuration; a mismatch is
/// silently ignored. A fresh collection is created time-series-typed with
/// the configured granularity and TTL, plus two indexes chosen for the
/// common query "most recent events of level L from host H":
/// `{ts: desc}` and `{ts: desc, metadata.severity_name: asc,
/// metadata.hostname: asc}`.
async fn provision(inner: &Arc<Inner>) -> Result<()> {
    let config = &inner.config;
    let name = &config.collection_name;

    let existing = config
        .store
        .describe_collection(name)
        .await
        .map_err(TransportError::CollectionLookup)?;

    if existing.is_some() {
        debug!(collection = %name, "Bound to existing collection");
        return Ok(());
    }

    config
        .store
        .create_timeseries_collection(
            name,
            TimeSeriesOptions {
                time_field: TIME_FIELD.to_string(),
                meta_field: META_FIELD.to_string(),
                granularity: config.granularity,
                expire_after_seconds: config.log_ttl_seconds,
            },
        )
        .await
        .map_err(TransportError::CollectionCreate)?;

    config
        .store
        .create_indexes(
            name,
            &[
                IndexSpec::new([(TIME_FIELD, IndexOrder::Descending)]),
                IndexSpec::new([
                    (TIME_FIELD, IndexOrder::Descending),
                    ("metadata.severity_name", IndexOrder::Ascending),
                    ("metadata.hostname", IndexOrder::Ascending),
                ]),
            ],
        )
        .await
        .map_err(TransportError::CollectionCreate)?;

    info!(
        collection = %name,
        granularity = config.granularity.as_str(),
        ttl_seconds = config.log_ttl_seconds,
        "Created time-series collection"
    );
    Ok(())
}
