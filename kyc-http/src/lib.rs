//! # kyc-http: verification backend clients
//!
//! Two calls against the KYC backend, both keyed by the access token:
//!
//! | Call | Route | Failure kind |
//! |------|-------|--------------|
//! | [`HttpSessionVerifier`] | `GET {api}/kyc/verify/{token}` | `InvalidSession` / `ConnectivityFailure` |
//! | [`HttpSubmissionClient`] | `POST {api}/kyc/submit/{token}` | `SubmissionFailure` / `ConnectivityFailure` |
//!
//! The token is placed in the path as one percent-encoded segment. A JSON
//! body of the form `{"error": "..."}` on a non-2xx response becomes the
//! user-facing message; otherwise the kind's default message is used.
//!
//! ```rust,no_run
//! use kyc_core::{KycSettings, SessionVerifier};
//! use kyc_http::{ApiClient, HttpSessionVerifier};
//!
//! # async fn run(settings: KycSettings) -> kyc_core::KycResult<()> {
//! let verifier = HttpSessionVerifier::new(ApiClient::new(&settings.api)?);
//! let session = verifier.verify("abc123").await?;
//! println!("case {}", session.case_id());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod memory;
mod submit;
mod verify;

pub use client::ApiClient;
pub use memory::{MemorySubmitter, MemoryVerifier};
pub use submit::HttpSubmissionClient;
pub use verify::HttpSessionVerifier;
