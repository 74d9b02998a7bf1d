use kyc_core::{
    AncillaryForm, BankDetails, CaptureSettings, KycError, KycResult, KycSettings, StepPlan,
};

/// Immutable wizard configuration, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct WizardConfig {
    pub plan: StepPlan,
    /// Form shown between verification and the first step.
    pub ancillary_form: Option<AncillaryForm>,
    pub capture: CaptureSettings,
}

impl WizardConfig {
    pub fn new(plan: StepPlan) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &KycSettings) -> Self {
        Self {
            plan: StepPlan::kyc_default(),
            ancillary_form: settings
                .bank_details_form
                .then_some(AncillaryForm::BankDetails),
            capture: settings.capture.clone(),
        }
    }

    pub fn with_ancillary_form(mut self, form: AncillaryForm) -> Self {
        self.ancillary_form = Some(form);
        self
    }

    pub fn with_capture(mut self, capture: CaptureSettings) -> Self {
        self.capture = capture;
        self
    }

    /// Form fields and step ids share one flat namespace in the submission.
    pub fn validate(&self) -> KycResult<()> {
        let fields: &[&str] = match self.ancillary_form {
            Some(AncillaryForm::BankDetails) => &BankDetails::FIELDS,
            None => &[],
        };
        match fields.iter().find(|f| self.plan.contains(f)) {
            Some(field) => Err(KycError::configuration(format!(
                "Form field {field} collides with a capture step"
            ))),
            None => Ok(()),
        }
    }
}
