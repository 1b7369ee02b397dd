//! Store Error Types
//!
//! This module defines all error types that can occur during destination
//! store operations.
//!
//! ## Error Categories
//!
//! ### Collection Errors
//! - `CollectionNotFound`: Requested collection doesn't exist
//! - `CollectionAlreadyExists`: Trying to create a collection that already exists
//!
//! ### Request Errors
//! - `InvalidOptions`: Time-series options rejected by the backend
//!
//! ### Backend Errors
//! - `Backend`: The underlying storage engine failed (connection, query, etc.)
//!
//! ## Usage
//!
//! All store operations return `Result<T>` which is aliased to
//! `Result<T, StoreError>`. This allows clean error propagation with `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),

    #[error("Invalid time-series options: {0}")]
    InvalidOptions(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
