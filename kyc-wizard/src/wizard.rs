use std::sync::Arc;

use chrono::Utc;
use kyc_capture::{DeviceHandle, MediaCapture};
use kyc_core::{
    AccessToken, AncillaryData, Camera, CaptureResult, CaptureResults, ErrorKind, GeoLocator,
    KycError, KycResult, Session, SessionVerifier, StillImage, StepPlan, SubmissionClient,
    SubmissionPayload, UploadClient,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::config::WizardConfig;
use crate::events::WizardEvent;
use crate::stage::{WizardPhase, WizardStage};
use crate::view::{
    form_name, CaptureView, WizardView, COMPLETE_MESSAGE, COMPLETE_TITLE, UNAVAILABLE_TITLE,
};

const EVENT_CAPACITY: usize = 256;

/// Everything the wizard talks to.
#[derive(Clone)]
pub struct WizardServices {
    pub verifier: Arc<dyn SessionVerifier>,
    pub uploader: Arc<dyn UploadClient>,
    pub submitter: Arc<dyn SubmissionClient>,
    pub camera: Arc<dyn Camera>,
    pub locator: Arc<dyn GeoLocator>,
}

/// Drives one KYC session from token to submission.
///
/// Every transition takes `&mut self`, so at most one camera, upload or
/// backend call is in flight. The camera is released whenever a step is left,
/// on terminal failure, and when the wizard is dropped.
pub struct CaptureWizard {
    config: WizardConfig,
    verifier: Arc<dyn SessionVerifier>,
    uploader: Arc<dyn UploadClient>,
    submitter: Arc<dyn SubmissionClient>,
    media: MediaCapture,
    stage: WizardStage,
    session: Option<Session>,
    ancillary: Option<AncillaryData>,
    handle: Option<DeviceHandle>,
    still: Option<StillImage>,
    results: CaptureResults,
    inline_error: Option<KycError>,
    events: broadcast::Sender<WizardEvent>,
}

impl CaptureWizard {
    pub fn new(config: WizardConfig, services: WizardServices) -> KycResult<Self> {
        config.validate()?;
        let media =
            MediaCapture::from_arcs(services.camera, services.locator, config.capture.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            results: CaptureResults::new(config.plan.clone()),
            config,
            verifier: services.verifier,
            uploader: services.uploader,
            submitter: services.submitter,
            media,
            stage: WizardStage::AwaitingSession,
            session: None,
            ancillary: None,
            handle: None,
            still: None,
            inline_error: None,
            events,
        })
    }

    /// Pull the token out of the link the user opened, then [`start`](Self::start).
    pub async fn start_from_link(&mut self, link: &str) -> KycResult<()> {
        self.expect_stage(WizardStage::AwaitingSession, "start")?;
        match AccessToken::from_link(link) {
            Ok(token) => self.start(token.as_str()).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Verify the token and move on to the form or the first step.
    #[instrument(skip_all, fields(token = %kyc_core::token_hint(token)))]
    pub async fn start(&mut self, token: &str) -> KycResult<()> {
        self.expect_stage(WizardStage::AwaitingSession, "start")?;
        let token = match AccessToken::new(token) {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e)),
        };

        match self.verifier.verify(token.as_str()).await {
            Ok(session) => self.enter(session).await,
            Err(e) => {
                warn!(kind = e.name(), "session could not be verified");
                Err(self.fail(e))
            }
        }
    }

    /// Enter with a session resolved elsewhere.
    pub async fn enter(&mut self, session: Session) -> KycResult<()> {
        self.expect_stage(WizardStage::AwaitingSession, "enter")?;
        if !session.is_verified() {
            return Err(self.fail(KycError::from_kind(ErrorKind::InvalidSession)));
        }

        info!(case_id = %session.case_id(), token = %session.token_hint(), "session verified");
        self.emit(WizardEvent::SessionVerified {
            case_id: session.case_id().to_string(),
            at: Utc::now(),
        });
        self.session = Some(session);

        if self.config.ancillary_form.is_some() {
            self.stage = WizardStage::AncillaryForm;
        } else {
            self.begin_step(0).await;
        }
        Ok(())
    }

    /// Accept the pre-capture form. Incomplete data keeps the wizard on the form.
    pub async fn submit_ancillary(&mut self, data: AncillaryData) -> KycResult<()> {
        self.expect_stage(WizardStage::AncillaryForm, "submit the form")?;
        if self.config.ancillary_form != Some(data.form()) {
            return Err(KycError::invalid_state("This form is not part of the verification"));
        }
        if let Err(e) = data.validate() {
            debug!(missing = ?data.missing_fields(), "ancillary form incomplete");
            self.inline_error = Some(e.clone());
            return Err(e);
        }

        self.inline_error = None;
        self.ancillary = Some(data);
        self.emit(WizardEvent::AncillaryAccepted { at: Utc::now() });
        self.begin_step(0).await;
        Ok(())
    }

    /// Capture a still for the active step and hold it for review.
    pub async fn shutter(&mut self) -> KycResult<()> {
        let index = self.active_step("take a photo")?;
        if self.still.is_some() {
            return Err(KycError::invalid_state(
                "A photo is already waiting; retake or confirm it",
            ));
        }
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| KycError::invalid_state("The camera is not open"))?;

        match self.media.shutter(handle).await {
            Ok(still) => {
                self.emit(WizardEvent::StillCaptured {
                    index,
                    geotagged: still.geotag.is_some(),
                    at: Utc::now(),
                });
                self.still = Some(still);
                self.inline_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "capture failed");
                self.inline_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Drop the held still and go back to the live preview.
    pub async fn retake(&mut self) -> KycResult<()> {
        let index = self.active_step("retake")?;
        let handle = match (&self.still, &self.handle) {
            (Some(_), Some(handle)) => handle,
            _ => return Err(KycError::invalid_state("There is no photo to retake")),
        };

        let resumed = self.media.retake(handle).await;
        self.still = None;
        match resumed {
            Ok(()) => {
                self.emit(WizardEvent::StillDiscarded {
                    index,
                    at: Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                self.handle = None;
                self.camera_unavailable(index, e.clone());
                Err(e)
            }
        }
    }

    /// Upload the held still, then advance, submit, or restart the step.
    ///
    /// An upload failure is returned and also kept as the inline error; the
    /// step restarts with a fresh camera session and earlier results stay.
    pub async fn confirm(&mut self) -> KycResult<()> {
        let index = self.active_step("confirm")?;
        let still = self
            .still
            .take()
            .ok_or_else(|| KycError::invalid_state("Take a photo first"))?;
        if let Some(handle) = self.handle.take() {
            self.media.close(handle);
        }

        self.stage = WizardStage::StepUploading { index };
        self.emit(WizardEvent::UploadStarted {
            index,
            at: Utc::now(),
        });

        let step_id = self.config.plan.step(index)?.id.clone();
        match self.uploader.upload(&still).await {
            Ok(reference_url) => {
                info!(index, step_id = %step_id, "step uploaded");
                self.results.push(CaptureResult {
                    step_id: step_id.clone(),
                    reference_url: reference_url.clone(),
                    geotag: still.geotag,
                })?;
                self.emit(WizardEvent::StepCompleted {
                    index,
                    step_id,
                    reference_url,
                    at: Utc::now(),
                });

                if self.config.plan.is_last(index) {
                    self.submit_all().await
                } else {
                    self.begin_step(index + 1).await;
                    Ok(())
                }
            }
            Err(e) => {
                warn!(index, step_id = %step_id, error = %e, "upload failed, restarting step");
                self.emit(WizardEvent::UploadFailed {
                    index,
                    error: e.name().to_string(),
                    at: Utc::now(),
                });
                self.stage = WizardStage::StepActive { index };
                self.inline_error = Some(e.clone());
                self.open_camera(index).await;
                Err(e)
            }
        }
    }

    /// Try the camera again after it could not be opened.
    pub async fn reopen_camera(&mut self) -> KycResult<()> {
        let index = self.active_step("reopen the camera")?;
        if self.handle.is_some() {
            return Err(KycError::invalid_state("The camera is already open"));
        }

        self.inline_error = None;
        self.open_camera(index).await;
        match &self.inline_error {
            Some(e) if self.handle.is_none() => Err(e.clone()),
            _ => Ok(()),
        }
    }

    /// Give up on the session. Camera and location are released immediately.
    pub fn abandon(&mut self) -> KycResult<()> {
        if self.stage.is_terminal() {
            return Err(self.wrong_stage("abandon"));
        }
        info!(stage = %self.stage, "verification abandoned");
        self.fail(KycError::from_kind(ErrorKind::Cancelled));
        Ok(())
    }

    pub fn stage(&self) -> &WizardStage {
        &self.stage
    }

    pub fn phase(&self) -> WizardPhase {
        self.stage.phase()
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.stage.step_index()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn results(&self) -> &CaptureResults {
        &self.results
    }

    pub fn plan(&self) -> &StepPlan {
        &self.config.plan
    }

    /// The still waiting for confirm or retake.
    pub fn still(&self) -> Option<&StillImage> {
        self.still.as_ref()
    }

    /// Recoverable error shown on the current screen.
    pub fn inline_error(&self) -> Option<&KycError> {
        self.inline_error.as_ref()
    }

    pub fn is_camera_open(&self) -> bool {
        self.media.is_open()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub fn view(&self) -> WizardView {
        let case_id = || {
            self.session
                .as_ref()
                .map(|s| s.case_id().to_string())
                .unwrap_or_default()
        };
        let inline = || self.inline_error.as_ref().map(|e| e.user_message().to_string());

        match &self.stage {
            WizardStage::AwaitingSession | WizardStage::Submitting => WizardView::Loading,
            WizardStage::Failed { error } => WizardView::Unavailable {
                title: UNAVAILABLE_TITLE,
                message: error.user_message().to_string(),
            },
            WizardStage::AncillaryForm => match self.config.ancillary_form {
                Some(form) => WizardView::AncillaryForm {
                    form: form_name(form),
                    case_id: case_id(),
                    error: inline(),
                },
                None => WizardView::Loading,
            },
            WizardStage::StepActive { index } | WizardStage::StepUploading { index } => {
                let plan = &self.config.plan;
                let (step_id, label) = plan
                    .get(*index)
                    .map(|s| (s.id.clone(), s.label.clone()))
                    .unwrap_or_default();
                let geotag = match (&self.still, &self.handle) {
                    (Some(still), _) => still.geotag,
                    (None, Some(handle)) => self.media.current_geotag(handle),
                    (None, None) => None,
                };
                WizardView::Capture(CaptureView {
                    step_number: index + 1,
                    total_steps: plan.len(),
                    step_id,
                    label,
                    case_id: case_id(),
                    progress_percent: plan.progress_percent(*index),
                    camera_ready: self.handle.is_some(),
                    has_still: self.still.is_some(),
                    geotag,
                    busy: matches!(self.stage, WizardStage::StepUploading { .. }),
                    inline_error: inline(),
                })
            }
            WizardStage::Succeeded => WizardView::Complete {
                title: COMPLETE_TITLE,
                message: COMPLETE_MESSAGE,
            },
        }
    }

    async fn begin_step(&mut self, index: usize) {
        self.stage = WizardStage::StepActive { index };
        self.still = None;
        let step_id = self
            .config
            .plan
            .get(index)
            .map(|s| s.id.clone())
            .unwrap_or_default();
        debug!(index, step_id = %step_id, "step started");
        self.emit(WizardEvent::StepStarted {
            index,
            step_id,
            at: Utc::now(),
        });
        self.inline_error = None;
        self.open_camera(index).await;
    }

    /// Open a fresh camera session. Failure is recorded inline, not returned.
    async fn open_camera(&mut self, index: usize) {
        match self.media.open().await {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => {
                self.handle = None;
                self.camera_unavailable(index, e);
            }
        }
    }

    fn camera_unavailable(&mut self, index: usize, error: KycError) {
        warn!(index, kind = error.name(), "camera unavailable");
        self.emit(WizardEvent::CameraUnavailable {
            index,
            error: error.name().to_string(),
            at: Utc::now(),
        });
        self.inline_error = Some(error);
    }

    async fn submit_all(&mut self) -> KycResult<()> {
        self.stage = WizardStage::Submitting;
        self.emit(WizardEvent::SubmissionStarted {
            steps: self.results.len(),
            at: Utc::now(),
        });

        let payload =
            match SubmissionPayload::combine(self.results.clone(), self.ancillary.clone()) {
                Ok(payload) => payload,
                Err(e) => return Err(self.fail(e)),
            };
        let session = match self.session.clone() {
            Some(session) => session,
            None => return Err(self.fail(KycError::invalid_state("No verified session"))),
        };

        match self.submitter.submit(&session, &payload).await {
            Ok(()) => {
                info!(case_id = %session.case_id(), steps = self.results.len(), "verification submitted");
                self.stage = WizardStage::Succeeded;
                self.emit(WizardEvent::Succeeded { at: Utc::now() });
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Move to `Failed`, releasing the camera. Returns the error for `Err(..)`.
    fn fail(&mut self, error: KycError) -> KycError {
        warn!(kind = error.name(), stage = %self.stage, "verification failed");
        self.handle = None;
        self.still = None;
        self.media.release();
        self.emit(WizardEvent::Failed {
            error: error.name().to_string(),
            at: Utc::now(),
        });
        self.stage = WizardStage::Failed {
            error: error.clone(),
        };
        error
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn expect_stage(&self, expected: WizardStage, op: &str) -> KycResult<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(self.wrong_stage(op))
        }
    }

    fn active_step(&self, op: &str) -> KycResult<usize> {
        match self.stage {
            WizardStage::StepActive { index } => Ok(index),
            _ => Err(self.wrong_stage(op)),
        }
    }

    fn wrong_stage(&self, op: &str) -> KycError {
        KycError::invalid_state(format!("Cannot {op} while {}", self.stage))
    }
}

impl std::fmt::Debug for CaptureWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureWizard")
            .field("stage", &self.stage)
            .field("results", &self.results.len())
            .field("media", &self.media)
            .finish()
    }
}
