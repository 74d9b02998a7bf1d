//! Collaborator traits the wizard is driven through.
//!
//! Network collaborators are implemented in `kyc-http` and `kyc-blob`; camera and
//! geolocation are platform-specific and implemented by the embedding host.

use async_trait::async_trait;
use bytes::Bytes;

use crate::capture::{Geotag, StillImage};
use crate::errors::KycResult;
use crate::payload::SubmissionPayload;
use crate::session::Session;

/// Resolves an access token to a verified session.
///
/// One round trip, no retry. Fails with `InvalidSession` or `ConnectivityFailure`.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> KycResult<Session>;
}

/// Stores one image and returns its durable reference URL.
///
/// Single attempt; any failure is `UploadFailure`. Retrying is the caller's call.
#[async_trait]
pub trait UploadClient: Send + Sync {
    async fn upload(&self, still: &StillImage) -> KycResult<String>;
}

/// Posts the consolidated record for a session.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, session: &Session, payload: &SubmissionPayload) -> KycResult<()>;
}

/// Preferred camera direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera
    Environment,
    /// Front camera
    User,
}

/// Camera hardware.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Request permission and start a live stream.
    ///
    /// Fails with `PermissionDenied` when the user declines or no device exists.
    async fn acquire(&self, facing: FacingMode) -> KycResult<Box<dyn VideoStream>>;
}

/// A live camera stream. Dropping it must also release the device.
#[async_trait]
pub trait VideoStream: Send {
    /// Encode the current frame as JPEG at `quality` in `(0, 1]`.
    async fn grab_frame(&mut self, quality: f32) -> KycResult<Bytes>;

    /// Stop every track and release the hardware. Idempotent.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Device position lookup.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// `None` when permission is denied or no fix is available.
    async fn current_position(&self) -> Option<Geotag>;
}
