//! Error types surfaced to callers of a scan.

use thiserror::Error;

/// Errors a scan can report to its caller.
///
/// Classifier failures and empty segmentations never reach this type: the
/// pipeline recovers from both locally.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Missing or malformed image payload.
    #[error("{0}")]
    InvalidInput(String),

    /// Any other internal fault.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ScanError {
    #[must_use]
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput(details.into())
    }

    /// HTTP status code this error maps to
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ScanError::InvalidInput(_) => 400,
            ScanError::Internal(_) => 500,
        }
    }
}
