//! kyc-core: shared model for the KYC capture flow.
//!
//! Holds everything the adapter crates and the wizard agree on: the step plan,
//! sessions, captured results, the submission payload, the error taxonomy,
//! settings, and the collaborator traits.

pub mod ancillary;
pub mod capture;
pub mod config;
pub mod errors;
pub mod payload;
pub mod service;
pub mod session;
pub mod steps;
pub mod token;

pub use ancillary::{AncillaryData, AncillaryForm, BankDetails};
pub use capture::{CaptureEntry, CaptureResult, CaptureResults, Geotag, StillImage};
pub use config::{
    load_env_config, ApiSettings, CaptureSettings, KycConfig, KycConfigSnapshot, KycSettings,
    UploadSettings,
};
pub use errors::{ErrorKind, KycError, KycResult};
pub use payload::SubmissionPayload;
pub use service::{
    Camera, FacingMode, GeoLocator, SessionVerifier, SubmissionClient, UploadClient, VideoStream,
};
pub use session::{token_hint, Session, SessionStatus};
pub use steps::{StepDefinition, StepKind, StepPlan, KYC_STEPS};
pub use token::AccessToken;
