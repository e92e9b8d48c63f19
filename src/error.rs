//! Error types for the extraction pipeline.

use thiserror::Error;

use crate::session::ProcessingStatus;

/// Rejections of a document before the pipeline starts.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("unsupported document type `{0}`, expected PDF, PNG, JPEG or WEBP")]
    UnsupportedType(String),

    #[error("document is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// Failures of the outbound inference call. Extraction is all-or-nothing,
/// so every variant aborts the whole document.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference response contained no text payload")]
    EmptyResponse,

    #[error("inference response did not match the expected shape: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Rejected session transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("an extraction is already in flight")]
    Busy,

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },
}
