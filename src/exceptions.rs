//! ## Custom Errors for Report Factory
//!
//! This module defines custom error types for the Report Factory library.
//! It uses the `thiserror` crate to derive the `Error` trait for custom error types.
//! The `ReportFactoryError` enum includes variants representing different error scenarios
//! encountered throughout the library, making error handling straightforward and clear.
//!
//! The `ReportFactoryResult` type alias simplifies error handling by providing a convenient
//! alias for results returned by the library.
//!
//! ### Example
//!
//! ```rust
//! use report_factory::exceptions::{ReportFactoryError, ReportFactoryResult};
//!
//! fn read_endpoint() -> ReportFactoryResult<()> {
//!     Err(ReportFactoryError::MissingConfig("SUPABASE_URL".into()))
//! }
//! ```

use thiserror::Error;

/// Errors specific to the Report Factory library.
#[derive(Debug, Error)]
pub enum ReportFactoryError {
    /// Wraps underlying I/O errors.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Wraps errors from DataFusion.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    /// Wraps errors from Arrow.
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Wraps errors from the HTTP client.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Wraps JSON serialization and deserialization errors.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Indicates that a required configuration value (endpoint or credential) is absent or empty.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Indicates that the remote table service could not be reached or answered with a failure status.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Indicates that the named remote table does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Indicates that fetched records do not share a common column set.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Indicates that the designated index column is absent or contains duplicate values.
    #[error("Invalid key column: {0}")]
    InvalidKey(String),

    /// Indicates that a timestamp or numeric field could not be parsed during loading or aggregation.
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Indicates that an invalid parameter was provided (e.g., unsupported value or incorrect data type).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Indicates that the specified column does not exist in the DataFrame.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

/// A convenient result type for Report Factory operations.
pub type ReportFactoryResult<T> = std::result::Result<T, ReportFactoryError>;
