use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for regionkit operations.
#[derive(Debug, Error)]
pub enum RegionKitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse results JSON from {path}: {source}")]
    ResultsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write results JSON to {path}: {source}")]
    ResultsWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed result '{id}': {message}")]
    MalformedResult { id: String, message: String },

    #[error("Relation references unknown region result id '{id}'")]
    UnknownRegion { id: String },

    #[error("Configuration references unregistered control '{name}'")]
    UnregisteredControl { name: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
