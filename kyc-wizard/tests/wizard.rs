use std::sync::Arc;
use std::time::Duration;

use kyc_blob::MemoryUploader;
use kyc_capture::{FixedLocator, MemoryCamera};
use kyc_core::{
    AncillaryData, AncillaryForm, BankDetails, ErrorKind, KycError, Session, StepPlan,
};
use kyc_http::{MemorySubmitter, MemoryVerifier};
use kyc_wizard::{
    CaptureWizard, WizardConfig, WizardEvent, WizardPhase, WizardServices, WizardStage, WizardView,
};
use serde_json::json;

struct Harness {
    verifier: MemoryVerifier,
    uploader: MemoryUploader,
    submitter: MemorySubmitter,
    camera: MemoryCamera,
    locator: FixedLocator,
}

impl Harness {
    fn new() -> Self {
        Self {
            verifier: MemoryVerifier::new().with_session("tok-abc", "LN-204"),
            uploader: MemoryUploader::new(),
            submitter: MemorySubmitter::new(),
            camera: MemoryCamera::new(),
            locator: FixedLocator::at(12.97, 77.59),
        }
    }

    fn wizard(&self, config: WizardConfig) -> CaptureWizard {
        CaptureWizard::new(
            config,
            WizardServices {
                verifier: Arc::new(self.verifier.clone()),
                uploader: Arc::new(self.uploader.clone()),
                submitter: Arc::new(self.submitter.clone()),
                camera: Arc::new(self.camera.clone()),
                locator: Arc::new(self.locator.clone()),
            },
        )
        .unwrap()
    }
}

fn abc() -> WizardConfig {
    WizardConfig::new(StepPlan::new([("a", "Side A"), ("b", "Side B"), ("c", "Side C")]).unwrap())
}

fn bank_details() -> BankDetails {
    BankDetails {
        account_holder_name: "R. Rao".into(),
        account_number: "000123456789".into(),
        ifsc_code: "SBIN0000123".into(),
        bank_name: "State Bank".into(),
    }
}

async fn capture_step(wizard: &mut CaptureWizard) {
    wizard.shutter().await.unwrap();
    wizard.confirm().await.unwrap();
}

#[tokio::test]
async fn three_steps_submit_flat_payload() {
    let h = Harness::new();
    h.uploader.succeed_with("u1").succeed_with("u2").succeed_with("u3");
    let mut wizard = h.wizard(abc());

    wizard.start("tok-abc").await.unwrap();
    for _ in 0..3 {
        capture_step(&mut wizard).await;
    }

    assert_eq!(wizard.stage(), &WizardStage::Succeeded);
    assert_eq!(wizard.results().len(), 3);
    assert!(wizard.results().is_complete());

    let submitted = h.submitter.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, "tok-abc");
    let geo = json!({"lat": 12.97, "lng": 77.59});
    assert_eq!(
        submitted[0].1,
        json!({
            "a": {"url": "u1", "geo": geo},
            "b": {"url": "u2", "geo": geo},
            "c": {"url": "u3", "geo": geo},
        })
    );
    assert_eq!(h.camera.live_streams(), 0);
    assert!(!wizard.is_camera_open());
}

#[tokio::test]
async fn upload_failure_restarts_the_same_step() {
    let h = Harness::new();
    h.uploader.succeed_with("u1").fail_with("provider down");
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();

    capture_step(&mut wizard).await;
    wizard.shutter().await.unwrap();
    let err = wizard.confirm().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::UploadFailure);
    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 1 });
    assert_eq!(wizard.results().len(), 1);
    assert!(wizard.results().get("a").is_some());
    assert!(wizard.still().is_none());
    assert!(wizard.is_camera_open());
    assert_eq!(h.uploader.attempts(), 2);

    match wizard.view() {
        WizardView::Capture(view) => {
            assert_eq!(view.step_number, 2);
            assert_eq!(view.inline_error.as_deref(), Some("Upload failed. Try again."));
            assert!(view.camera_ready);
        }
        other => panic!("unexpected view {other:?}"),
    }

    // The user tries again; the error clears and the flow continues.
    capture_step(&mut wizard).await;
    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 2 });
    assert!(wizard.inline_error().is_none());
    assert_eq!(wizard.results().len(), 2);
}

#[tokio::test]
async fn retake_neither_records_nor_advances() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();

    wizard.shutter().await.unwrap();
    assert!(wizard.still().is_some());
    wizard.retake().await.unwrap();

    assert!(wizard.still().is_none());
    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 0 });
    assert!(wizard.results().is_empty());
    assert_eq!(h.uploader.attempts(), 0);
    assert_eq!(h.camera.live_streams(), 1);

    capture_step(&mut wizard).await;
    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 1 });
    assert_eq!(h.uploader.attempts(), 1);
}

#[tokio::test]
async fn missing_location_still_succeeds() {
    let mut h = Harness::new();
    h.locator = FixedLocator::denied();
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();
    for _ in 0..3 {
        capture_step(&mut wizard).await;
    }

    assert_eq!(wizard.stage(), &WizardStage::Succeeded);
    assert!(wizard.results().iter().all(|r| r.geotag.is_none()));
    assert_eq!(h.submitter.submitted()[0].1["b"]["geo"], serde_json::Value::Null);
}

#[tokio::test]
async fn slow_location_does_not_hold_the_shutter() {
    let mut h = Harness::new();
    h.locator = FixedLocator::at(1.0, 2.0).with_delay(Duration::from_secs(3600));
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), wizard.shutter())
        .await
        .expect("shutter waited for location")
        .unwrap();
    assert_eq!(wizard.still().unwrap().geotag, None);
}

#[tokio::test]
async fn expired_token_offers_no_capture_step() {
    let mut h = Harness::new();
    h.verifier = MemoryVerifier::new().with_error(
        "expired-123",
        KycError::invalid_session("Invalid or Expired Link"),
    );
    let mut wizard = h.wizard(abc());

    let err = wizard.start("expired-123").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidSession);
    assert_eq!(wizard.phase(), WizardPhase::Failed);
    assert_eq!(wizard.current_step_index(), None);
    assert_eq!(h.camera.acquisitions(), 0);
    assert_eq!(
        wizard.view(),
        WizardView::Unavailable {
            title: "Link Unavailable",
            message: "Invalid or Expired Link".to_string(),
        }
    );

    assert_eq!(wizard.shutter().await.unwrap_err().kind, ErrorKind::InvalidState);
    assert_eq!(wizard.abandon().unwrap_err().kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn link_without_token_is_invalid_access() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());

    let err = wizard
        .start_from_link("https://kyc.openscore.in/form")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidAccess);
    assert_eq!(h.verifier.calls(), 0);
    assert!(wizard.stage().is_terminal());
}

#[tokio::test]
async fn link_token_is_verified() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());
    wizard
        .start_from_link("https://kyc.openscore.in/form/tok-abc")
        .await
        .unwrap();
    assert_eq!(wizard.session().unwrap().case_id(), "LN-204");
    assert_eq!(wizard.current_step_index(), Some(0));
}

#[tokio::test]
async fn encoded_link_token_is_verified_decoded() {
    let mut h = Harness::new();
    h.verifier = MemoryVerifier::new().with_session("abc==", "LN-311");
    let mut wizard = h.wizard(abc());
    wizard
        .start_from_link("https://kyc.openscore.in/form?token=abc%3D%3D")
        .await
        .unwrap();
    assert_eq!(wizard.session().unwrap().token(), "abc==");
    assert_eq!(wizard.session().unwrap().case_id(), "LN-311");
}

#[tokio::test]
async fn unverified_session_is_unavailable() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());
    let err = wizard.enter(Session::invalid("tok-abc")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidSession);
    assert!(matches!(wizard.view(), WizardView::Unavailable { .. }));
    assert_eq!(h.camera.acquisitions(), 0);
}

#[tokio::test]
async fn incomplete_bank_details_stay_on_the_form() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc().with_ancillary_form(AncillaryForm::BankDetails));
    wizard.start("tok-abc").await.unwrap();
    assert_eq!(wizard.stage(), &WizardStage::AncillaryForm);
    assert_eq!(h.camera.acquisitions(), 0);

    let mut partial = bank_details();
    partial.ifsc_code = "  ".into();
    let err = wizard
        .submit_ancillary(AncillaryData::BankDetails(partial))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::IncompleteForm);
    assert_eq!(wizard.stage(), &WizardStage::AncillaryForm);
    assert_eq!(h.camera.acquisitions(), 0);
    match wizard.view() {
        WizardView::AncillaryForm { form, error, .. } => {
            assert_eq!(form, "bank_details");
            assert!(error.unwrap().contains("ifsc_code"));
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[tokio::test]
async fn bank_details_are_merged_into_submission() {
    let h = Harness::new();
    h.uploader.succeed_with("u1").succeed_with("u2").succeed_with("u3");
    let mut wizard = h.wizard(abc().with_ancillary_form(AncillaryForm::BankDetails));
    wizard.start("tok-abc").await.unwrap();
    wizard
        .submit_ancillary(AncillaryData::BankDetails(bank_details()))
        .await
        .unwrap();
    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 0 });

    for _ in 0..3 {
        capture_step(&mut wizard).await;
    }

    let body = &h.submitter.submitted()[0].1;
    assert_eq!(body["a"]["url"], "u1");
    assert_eq!(body["ifsc_code"], "SBIN0000123");
    assert_eq!(body["account_holder_name"], "R. Rao");
}

#[tokio::test]
async fn step_index_only_moves_forward_by_one() {
    let h = Harness::new();
    h.uploader.succeed_with("u1").fail_with("flaky");
    let mut wizard = h.wizard(abc());
    let mut events = wizard.subscribe();
    wizard.start("tok-abc").await.unwrap();

    capture_step(&mut wizard).await;
    wizard.shutter().await.unwrap();
    let _ = wizard.confirm().await;
    capture_step(&mut wizard).await;
    capture_step(&mut wizard).await;
    assert_eq!(wizard.stage(), &WizardStage::Succeeded);

    let mut started = Vec::new();
    let mut upload_failures = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            WizardEvent::StepStarted { index, .. } => started.push(index),
            WizardEvent::UploadFailed { index, .. } => upload_failures.push(index),
            _ => {}
        }
    }
    // A failed upload reopens the camera without starting the step again.
    assert_eq!(upload_failures, [1]);
    assert_eq!(started, [0, 1, 2]);
    for pair in started.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[tokio::test]
async fn submission_failure_is_terminal() {
    let h = Harness::new();
    h.submitter
        .fail_with(KycError::from_kind(ErrorKind::SubmissionFailure));
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();
    capture_step(&mut wizard).await;
    capture_step(&mut wizard).await;

    wizard.shutter().await.unwrap();
    let err = wizard.confirm().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SubmissionFailure);
    assert_eq!(wizard.phase(), WizardPhase::Failed);
    assert_eq!(wizard.results().len(), 3);
    assert_eq!(
        wizard.stage().error().map(|e| e.user_message()),
        Some("Submission failed. Contact support.")
    );
    assert_eq!(wizard.shutter().await.unwrap_err().kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn camera_denial_is_inline_and_recoverable() {
    let h = Harness::new();
    h.camera.deny_permission(true);
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();

    assert_eq!(wizard.stage(), &WizardStage::StepActive { index: 0 });
    assert_eq!(
        wizard.inline_error().map(|e| e.kind),
        Some(ErrorKind::PermissionDenied)
    );
    assert_eq!(wizard.shutter().await.unwrap_err().kind, ErrorKind::InvalidState);
    match wizard.view() {
        WizardView::Capture(view) => {
            assert!(!view.camera_ready);
            assert_eq!(
                view.inline_error.as_deref(),
                Some("Camera access denied. Please enable permissions.")
            );
        }
        other => panic!("unexpected view {other:?}"),
    }

    assert_eq!(
        wizard.reopen_camera().await.unwrap_err().kind,
        ErrorKind::PermissionDenied
    );

    h.camera.deny_permission(false);
    wizard.reopen_camera().await.unwrap();
    assert!(wizard.inline_error().is_none());
    capture_step(&mut wizard).await;
    assert_eq!(wizard.current_step_index(), Some(1));
}

#[tokio::test]
async fn abandon_releases_the_camera() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();
    assert_eq!(h.camera.live_streams(), 1);

    wizard.abandon().unwrap();
    assert_eq!(h.camera.live_streams(), 0);
    assert!(!wizard.is_camera_open());
    assert_eq!(
        wizard.stage().error().map(|e| e.kind),
        Some(ErrorKind::Cancelled)
    );
    assert_eq!(wizard.confirm().await.unwrap_err().kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn dropping_the_wizard_releases_the_camera() {
    let h = Harness::new();
    let mut wizard = h.wizard(abc());
    wizard.start("tok-abc").await.unwrap();
    wizard.shutter().await.unwrap();
    wizard.retake().await.unwrap();
    assert_eq!(h.camera.live_streams(), 1);

    drop(wizard);
    assert_eq!(h.camera.live_streams(), 0);
}

#[tokio::test]
async fn capture_view_tracks_progress() {
    let h = Harness::new();
    let mut wizard = h.wizard(WizardConfig::default());
    wizard.start("tok-abc").await.unwrap();
    capture_step(&mut wizard).await;
    wizard.shutter().await.unwrap();

    match wizard.view() {
        WizardView::Capture(view) => {
            assert_eq!(view.step_number, 2);
            assert_eq!(view.total_steps, 7);
            assert_eq!(view.step_id, "aadhar_back");
            assert_eq!(view.label, "Aadhaar Card (Back)");
            assert_eq!(view.case_id, "LN-204");
            assert_eq!(view.progress_percent, 28);
            assert!(view.has_still);
            assert!(view.geotag.is_some());
        }
        other => panic!("unexpected view {other:?}"),
    }
}
