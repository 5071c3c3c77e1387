//! Error types for the table extraction pipeline.
//!
//! Failures local to one table or one page are absorbed by the
//! orchestrator and recorded in the run summary; only document-level
//! failures surface through these types.

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during table extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed page selector input (e.g. `"1,x-5"`); fatal to the call
    #[error("Invalid page specification '{spec}': {reason}")]
    InvalidPageSpecification {
        /// The page specification as supplied by the caller
        spec: String,
        /// Reason the specification was rejected
        reason: String,
    },

    /// A detection capability is not installed or reachable; non-fatal,
    /// the orchestrator degrades to single-mode operation
    #[error("Detection capability unavailable: {0}")]
    DetectionUnavailable(String),

    /// Raw document region access failed during coordinate re-extraction
    #[error("Region access failed on page {page}: {reason}")]
    Region {
        /// 1-based page number of the failed region
        page: u32,
        /// Reason reported by the raw document accessor
        reason: String,
    },

    /// Invalid corruption signature pattern
    #[error("Invalid corruption signature: {0}")]
    Signature(#[from] regex::Error),

    /// IO error while persisting sidecar files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Construct an `InvalidPageSpecification` error.
    pub fn invalid_page_spec(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPageSpecification {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}
