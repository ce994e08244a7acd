//! Error types for THREDDS catalog access.

use thiserror::Error;

/// Result type alias using ThreddsError.
pub type ThreddsResult<T> = Result<T, ThreddsError>;

/// Failures while talking to or parsing a THREDDS catalog.
///
/// Inside the resolver these are non-fatal: they map to an absent
/// resolution result plus a log entry.
#[derive(Debug, Error)]
pub enum ThreddsError {
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned HTTP {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("Invalid catalog XML: {0}")]
    Xml(#[from] quick_xml::Error),
}
