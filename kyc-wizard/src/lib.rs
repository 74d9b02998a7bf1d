//! # kyc-wizard: the capture flow
//!
//! [`CaptureWizard`] walks one applicant through a fixed list of photos:
//!
//! ```text
//! AwaitingSession ─start─► (AncillaryForm) ─► StepActive(0)
//!                                                 │ shutter / retake
//!                                                 ▼ confirm
//!                    ┌──── upload failed ──── StepUploading(i)
//!                    ▼                            │ uploaded
//!              StepActive(i)      StepActive(i+1) ◄┤
//!                                                 ▼ last step
//!                                            Submitting ─► Succeeded | Failed
//! ```
//!
//! Verification and submission failures are terminal. Upload failures and
//! camera denial stay on the current step and are reported through
//! [`CaptureWizard::inline_error`]. Transitions are also published as
//! [`WizardEvent`]s.
//!
//! ```rust,no_run
//! use kyc_wizard::{CaptureWizard, WizardConfig, WizardServices};
//!
//! # async fn run(services: WizardServices) -> kyc_core::KycResult<()> {
//! let mut wizard = CaptureWizard::new(WizardConfig::default(), services)?;
//! wizard.start_from_link("https://kyc.openscore.in/form/abc123").await?;
//! while wizard.current_step_index().is_some() {
//!     wizard.shutter().await?;
//!     wizard.confirm().await?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod stage;
pub mod view;
mod wizard;

pub use config::WizardConfig;
pub use events::WizardEvent;
pub use stage::{WizardPhase, WizardStage};
pub use view::{CaptureView, WizardView};
pub use wizard::{CaptureWizard, WizardServices};
