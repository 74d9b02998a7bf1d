use std::time::Duration;

use kyc_capture::{FixedLocator, MediaCapture, MemoryCamera};
use kyc_core::{CaptureSettings, ErrorKind, FacingMode, Geotag};

fn capture_with(camera: &MemoryCamera, locator: &FixedLocator) -> MediaCapture {
    MediaCapture::new(camera.clone(), locator.clone(), CaptureSettings::default())
}

#[tokio::test]
async fn shutter_returns_jpeg_with_latest_geotag() {
    let camera = MemoryCamera::new();
    let locator = FixedLocator::at(12.9716, 77.5946);
    let mut capture = capture_with(&camera, &locator);

    let handle = capture.open().await.unwrap();
    assert_eq!(camera.last_facing(), Some(FacingMode::Environment));
    assert_eq!(camera.live_streams(), 1);

    let still = capture.shutter(&handle).await.unwrap();
    assert_eq!(still.content_type, "image/jpeg");
    assert_eq!(&still.bytes[..], b"frame-1@0.8");
    assert_eq!(still.geotag, Some(Geotag::new(12.9716, 77.5946)));

    // Preview stops once the still is taken.
    assert_eq!(camera.live_streams(), 0);
    assert!(capture.is_open());
}

#[tokio::test]
async fn denied_location_does_not_block_capture() {
    let camera = MemoryCamera::new();
    let locator = FixedLocator::denied();
    let mut capture = capture_with(&camera, &locator);

    let handle = capture.open().await.unwrap();
    let still = capture.shutter(&handle).await.unwrap();
    assert_eq!(still.geotag, None);
    assert!(!still.is_empty());
}

#[tokio::test]
async fn slow_location_is_read_not_awaited() {
    let camera = MemoryCamera::new();
    let locator = FixedLocator::at(1.0, 2.0).with_delay(Duration::from_secs(3600));
    let mut capture = capture_with(&camera, &locator);

    let handle = capture.open().await.unwrap();
    let still = tokio::time::timeout(Duration::from_secs(1), capture.shutter(&handle))
        .await
        .expect("shutter must not wait for location")
        .unwrap();
    assert_eq!(still.geotag, None);
}

#[tokio::test]
async fn permission_denied_holds_no_hardware() {
    let camera = MemoryCamera::new();
    camera.deny_permission(true);
    let mut capture = capture_with(&camera, &FixedLocator::denied());

    let err = capture.open().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert_eq!(err.user_message(), "Camera access denied. Please enable permissions.");
    assert_eq!(camera.live_streams(), 0);
    assert!(!capture.is_open());
}

#[tokio::test]
async fn opening_again_closes_the_prior_session() {
    let camera = MemoryCamera::new();
    let mut capture = capture_with(&camera, &FixedLocator::denied());

    let first = capture.open().await.unwrap();
    let second = capture.open().await.unwrap();
    assert_eq!(camera.acquisitions(), 2);
    assert_eq!(camera.live_streams(), 1);

    let err = capture.shutter(&first).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(capture.shutter(&second).await.is_ok());
}

#[tokio::test]
async fn retake_restarts_preview_and_wipes_location() {
    let camera = MemoryCamera::new();
    let locator = FixedLocator::at(10.0, 20.0);
    let mut capture = capture_with(&camera, &locator);

    let handle = capture.open().await.unwrap();
    let first = capture.shutter(&handle).await.unwrap();
    assert!(first.geotag.is_some());

    locator.set_position(None);
    capture.retake(&handle).await.unwrap();
    assert_eq!(camera.live_streams(), 1);

    let second = capture.shutter(&handle).await.unwrap();
    assert_ne!(first.bytes, second.bytes);
    assert_eq!(second.geotag, None);
    assert_eq!(locator.requests(), 2);
}

#[tokio::test]
async fn shutter_twice_requires_retake() {
    let camera = MemoryCamera::new();
    let mut capture = capture_with(&camera, &FixedLocator::denied());

    let handle = capture.open().await.unwrap();
    capture.shutter(&handle).await.unwrap();
    let err = capture.shutter(&handle).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let err = {
        let fresh = capture.open().await.unwrap();
        capture.retake(&fresh).await.unwrap_err()
    };
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn close_and_drop_release_the_camera() {
    let camera = MemoryCamera::new();
    let mut capture = capture_with(&camera, &FixedLocator::denied());

    let handle = capture.open().await.unwrap();
    capture.close(handle);
    assert_eq!(camera.live_streams(), 0);
    assert!(!capture.is_open());

    let _handle = capture.open().await.unwrap();
    assert_eq!(camera.live_streams(), 1);
    drop(capture);
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn camera_lost_during_retake_releases_session() {
    let camera = MemoryCamera::new();
    let mut capture = capture_with(&camera, &FixedLocator::denied());

    let handle = capture.open().await.unwrap();
    capture.shutter(&handle).await.unwrap();
    camera.deny_permission(true);

    let err = capture.retake(&handle).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert!(!capture.is_open());
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn failed_retake_issues_no_location_request() {
    let camera = MemoryCamera::new();
    let locator = FixedLocator::at(12.97, 77.59);
    let mut capture = capture_with(&camera, &locator);

    let handle = capture.open().await.unwrap();
    capture.shutter(&handle).await.unwrap();
    assert_eq!(locator.requests(), 1);

    camera.deny_permission(true);
    capture.retake(&handle).await.unwrap_err();
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    assert_eq!(locator.requests(), 1);
}
