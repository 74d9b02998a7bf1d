//! What the front end should draw for the current stage.

use kyc_core::{AncillaryForm, Geotag};
use serde::Serialize;

pub const UNAVAILABLE_TITLE: &str = "Link Unavailable";
pub const COMPLETE_TITLE: &str = "Verification Complete";
pub const COMPLETE_MESSAGE: &str =
    "Your documents have been submitted securely. You can close this window now.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum WizardView {
    /// Verifying the link or submitting the record
    Loading,
    Unavailable {
        title: &'static str,
        message: String,
    },
    AncillaryForm {
        form: &'static str,
        case_id: String,
        error: Option<String>,
    },
    Capture(CaptureView),
    Complete {
        title: &'static str,
        message: &'static str,
    },
}

/// One capture step, as shown in the header and camera panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureView {
    /// 1-based, for "KYC Step n"
    pub step_number: usize,
    pub total_steps: usize,
    pub step_id: String,
    pub label: String,
    pub case_id: String,
    pub progress_percent: u8,
    pub camera_ready: bool,
    pub has_still: bool,
    pub geotag: Option<Geotag>,
    /// An upload is in flight for this step
    pub busy: bool,
    pub inline_error: Option<String>,
}

pub(crate) fn form_name(form: AncillaryForm) -> &'static str {
    match form {
        AncillaryForm::BankDetails => "bank_details",
    }
}
