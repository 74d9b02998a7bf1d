use kyc_core::{ErrorKind, KycError};
use thiserror::Error;

/// Result type for upload operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while storing a captured image
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Upload response had no secure_url")]
    MissingUrl,

    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a rejection error from a provider response
    pub fn rejected<S: Into<String>>(status: u16, reason: S) -> Self {
        Self::Rejected {
            status,
            reason: reason.into(),
        }
    }
}

impl From<BlobError> for KycError {
    /// Every upload failure is recoverable by recapturing, so the user sees the
    /// generic retry message; the detail stays in the source chain.
    fn from(err: BlobError) -> Self {
        KycError::from_kind(ErrorKind::UploadFailure).with_source(err)
    }
}
