use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transition notifications published by a wizard.
///
/// Errors are carried as their kind name; the user-facing message lives on
/// the wizard itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    /// Token resolved to a verified session
    SessionVerified {
        case_id: String,
        at: DateTime<Utc>,
    },

    /// Ancillary form passed its completeness check
    AncillaryAccepted { at: DateTime<Utc> },

    /// Camera requested for a step
    StepStarted {
        index: usize,
        step_id: String,
        at: DateTime<Utc>,
    },

    /// Camera could not be opened for the step
    CameraUnavailable {
        index: usize,
        error: String,
        at: DateTime<Utc>,
    },

    /// A still is held for review
    StillCaptured {
        index: usize,
        geotagged: bool,
        at: DateTime<Utc>,
    },

    /// The held still was discarded and the preview resumed
    StillDiscarded { index: usize, at: DateTime<Utc> },

    UploadStarted { index: usize, at: DateTime<Utc> },

    /// Upload succeeded and the result was recorded
    StepCompleted {
        index: usize,
        step_id: String,
        reference_url: String,
        at: DateTime<Utc>,
    },

    /// Upload failed; the step restarts
    UploadFailed {
        index: usize,
        error: String,
        at: DateTime<Utc>,
    },

    SubmissionStarted { steps: usize, at: DateTime<Utc> },

    Succeeded { at: DateTime<Utc> },

    /// The wizard reached a terminal failure
    Failed { error: String, at: DateTime<Utc> },
}

impl WizardEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            WizardEvent::SessionVerified { at, .. }
            | WizardEvent::AncillaryAccepted { at }
            | WizardEvent::StepStarted { at, .. }
            | WizardEvent::CameraUnavailable { at, .. }
            | WizardEvent::StillCaptured { at, .. }
            | WizardEvent::StillDiscarded { at, .. }
            | WizardEvent::UploadStarted { at, .. }
            | WizardEvent::StepCompleted { at, .. }
            | WizardEvent::UploadFailed { at, .. }
            | WizardEvent::SubmissionStarted { at, .. }
            | WizardEvent::Succeeded { at }
            | WizardEvent::Failed { at, .. } => *at,
        }
    }

    /// Step the event refers to, if any.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            WizardEvent::StepStarted { index, .. }
            | WizardEvent::CameraUnavailable { index, .. }
            | WizardEvent::StillCaptured { index, .. }
            | WizardEvent::StillDiscarded { index, .. }
            | WizardEvent::UploadStarted { index, .. }
            | WizardEvent::StepCompleted { index, .. }
            | WizardEvent::UploadFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}
