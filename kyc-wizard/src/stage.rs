use std::fmt;

use kyc_core::KycError;

/// Where a [`CaptureWizard`](crate::CaptureWizard) is in the flow.
///
/// `Succeeded` and `Failed` are terminal. `StepUploading` and `Submitting` are
/// only observable while the corresponding call is in flight (through
/// [`WizardEvent`](crate::WizardEvent)s or if the future is dropped early).
#[derive(Debug, Clone, PartialEq)]
pub enum WizardStage {
    AwaitingSession,
    AncillaryForm,
    StepActive { index: usize },
    StepUploading { index: usize },
    Submitting,
    Succeeded,
    Failed { error: KycError },
}

/// Coarse status for callers that only need to pick a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardPhase {
    Idle,
    CapturingStep,
    Uploading,
    Submitting,
    Succeeded,
    Failed,
}

impl WizardStage {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStage::AwaitingSession => "awaiting-session",
            WizardStage::AncillaryForm => "ancillary-form",
            WizardStage::StepActive { .. } => "step-active",
            WizardStage::StepUploading { .. } => "step-uploading",
            WizardStage::Submitting => "submitting",
            WizardStage::Succeeded => "succeeded",
            WizardStage::Failed { .. } => "failed",
        }
    }

    pub fn phase(&self) -> WizardPhase {
        match self {
            WizardStage::AwaitingSession | WizardStage::AncillaryForm => WizardPhase::Idle,
            WizardStage::StepActive { .. } => WizardPhase::CapturingStep,
            WizardStage::StepUploading { .. } => WizardPhase::Uploading,
            WizardStage::Submitting => WizardPhase::Submitting,
            WizardStage::Succeeded => WizardPhase::Succeeded,
            WizardStage::Failed { .. } => WizardPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStage::Succeeded | WizardStage::Failed { .. })
    }

    /// Index of the step being captured or uploaded.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            WizardStage::StepActive { index } | WizardStage::StepUploading { index } => {
                Some(*index)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&KycError> {
        match self {
            WizardStage::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_index() {
            Some(index) => write!(f, "{}({})", self.name(), index),
            None => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::ErrorKind;

    #[test]
    fn terminal_stages() {
        assert!(WizardStage::Succeeded.is_terminal());
        assert!(WizardStage::Failed {
            error: KycError::from_kind(ErrorKind::Cancelled)
        }
        .is_terminal());
        assert!(!WizardStage::StepActive { index: 2 }.is_terminal());
        assert!(!WizardStage::Submitting.is_terminal());
    }

    #[test]
    fn display_includes_step_index() {
        assert_eq!(WizardStage::StepUploading { index: 3 }.to_string(), "step-uploading(3)");
        assert_eq!(WizardStage::AncillaryForm.to_string(), "ancillary-form");
        assert_eq!(WizardStage::StepActive { index: 0 }.phase(), WizardPhase::CapturingStep);
    }
}
