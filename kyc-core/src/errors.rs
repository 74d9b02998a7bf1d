//! # Errors
//!
//! Every failure the capture flow can surface is a [`KycError`]:
//! - a stable [`ErrorKind`] (name + kebab-cased class name)
//! - the message to show the user (server-provided text when the backend sent one)
//! - an optional `anyhow` source kept for logs, never rendered
//!
//! Adapter crates keep their own `thiserror` enums internally and convert at the
//! trait boundary, so the wizard only ever matches on [`ErrorKind`].

use std::fmt;

use anyhow::Error as AnyError;

/// Result type used across the capture flow.
pub type KycResult<T> = std::result::Result<T, KycError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No token present in the link
    InvalidAccess,
    /// Token unknown or expired
    InvalidSession,
    /// Request could not complete (transport, timeout, unreadable response)
    ConnectivityFailure,
    /// Camera permission declined or hardware unavailable
    PermissionDenied,
    /// Storage provider rejected the image or could not be reached
    UploadFailure,
    /// Backend rejected the final record
    SubmissionFailure,
    /// Ancillary form is missing mandatory fields
    IncompleteForm,
    /// Operation not allowed in the current stage
    InvalidState,
    /// User abandoned the flow
    Cancelled,
    /// Missing or malformed settings
    Configuration,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAccess => "InvalidAccess",
            ErrorKind::InvalidSession => "InvalidSession",
            ErrorKind::ConnectivityFailure => "ConnectivityFailure",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::UploadFailure => "UploadFailure",
            ErrorKind::SubmissionFailure => "SubmissionFailure",
            ErrorKind::IncompleteForm => "IncompleteForm",
            ErrorKind::InvalidState => "InvalidState",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Configuration => "Configuration",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAccess => "invalid-access",
            ErrorKind::InvalidSession => "invalid-session",
            ErrorKind::ConnectivityFailure => "connectivity-failure",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::UploadFailure => "upload-failure",
            ErrorKind::SubmissionFailure => "submission-failure",
            ErrorKind::IncompleteForm => "incomplete-form",
            ErrorKind::InvalidState => "invalid-state",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Configuration => "configuration",
        }
    }

    /// Message shown when no more specific text is available.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAccess => {
                "No KYC token provided. Please use the link sent to your email/SMS."
            }
            ErrorKind::InvalidSession => "Invalid or Expired Link",
            ErrorKind::ConnectivityFailure => "Connection failed. Check your internet.",
            ErrorKind::PermissionDenied => "Camera access denied. Please enable permissions.",
            ErrorKind::UploadFailure => "Upload failed. Try again.",
            ErrorKind::SubmissionFailure => "Submission failed. Contact support.",
            ErrorKind::IncompleteForm => "Please fill in all required fields.",
            ErrorKind::InvalidState => "This action is not available right now.",
            ErrorKind::Cancelled => "Verification was cancelled.",
            ErrorKind::Configuration => "Verification is not configured correctly.",
        }
    }

    /// Terminal kinds end the session; the user needs a new link or support.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidAccess
                | ErrorKind::InvalidSession
                | ErrorKind::SubmissionFailure
                | ErrorKind::Cancelled
                | ErrorKind::Configuration
        )
    }
}

#[derive(Debug)]
pub struct KycError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl KycError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Error carrying the generic message for its kind.
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    pub fn with_source(mut self, source: impl Into<AnyError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Text for the user: the carried message, or the kind's generic text when blank.
    pub fn user_message(&self) -> &str {
        if self.message.trim().is_empty() {
            self.kind.default_message()
        } else {
            &self.message
        }
    }

    /// Copy without the inner source, suitable for handing to a view.
    pub fn sanitize(&self) -> KycError {
        KycError::new(self.kind, self.message.clone())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "className": self.class_name(),
            "message": self.user_message(),
        })
    }

    // ---- Constructors ----

    pub fn invalid_access(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAccess, msg)
    }
    pub fn invalid_session(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSession, msg)
    }
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectivityFailure, msg)
    }
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, msg)
    }
    pub fn upload_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UploadFailure, msg)
    }
    pub fn submission_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::SubmissionFailure, msg)
    }
    pub fn incomplete_form(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompleteForm, msg)
    }
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, msg)
    }
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, msg)
    }
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg)
    }
}

impl Clone for KycError {
    fn clone(&self) -> Self {
        self.sanitize()
    }
}

impl PartialEq for KycError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl fmt::Display for KycError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.user_message())
    }
}

impl std::error::Error for KycError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Convenience helper for "bail with KycError".
#[macro_export]
macro_rules! bail_kyc {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::KycError::$ctor($msg))
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::KycError::$ctor(format!($fmt, $($arg)*)))
    };
}
