//! In-memory camera and locator for tests and headless development.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use kyc_core::{
    Camera, ErrorKind, FacingMode, GeoLocator, Geotag, KycError, KycResult, VideoStream,
};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct CameraState {
    denied: AtomicBool,
    live: AtomicUsize,
    acquisitions: AtomicUsize,
    frames: AtomicUsize,
    last_facing: Mutex<Option<FacingMode>>,
}

/// Camera that hands out synthetic frames and counts live streams.
///
/// Each grabbed frame is unique (`frame-<n>@<quality>`), so retakes produce
/// distinguishable stills.
#[derive(Debug, Clone, Default)]
pub struct MemoryCamera {
    state: Arc<CameraState>,
}

impl MemoryCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user declining (or later granting) camera permission.
    pub fn deny_permission(&self, denied: bool) {
        self.state.denied.store(denied, Ordering::SeqCst);
    }

    /// Streams currently holding the device.
    pub fn live_streams(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    pub fn frames_grabbed(&self) -> usize {
        self.state.frames.load(Ordering::SeqCst)
    }

    pub fn last_facing(&self) -> Option<FacingMode> {
        *self.state.last_facing.lock()
    }
}

#[async_trait]
impl Camera for MemoryCamera {
    async fn acquire(&self, facing: FacingMode) -> KycResult<Box<dyn VideoStream>> {
        *self.state.last_facing.lock() = Some(facing);
        if self.state.denied.load(Ordering::SeqCst) {
            return Err(KycError::from_kind(ErrorKind::PermissionDenied));
        }

        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryStream {
            state: self.state.clone(),
            live: true,
        }))
    }
}

struct MemoryStream {
    state: Arc<CameraState>,
    live: bool,
}

#[async_trait]
impl VideoStream for MemoryStream {
    async fn grab_frame(&mut self, quality: f32) -> KycResult<Bytes> {
        if !self.live {
            return Err(KycError::invalid_state("Camera stream is stopped"));
        }
        // Frame encoding is asynchronous on real devices.
        tokio::task::yield_now().await;
        let n = self.state.frames.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Bytes::from(format!("frame-{n}@{quality}")))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for MemoryStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Locator returning a configurable position, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    position: Arc<Mutex<Option<Geotag>>>,
    delay: Option<Duration>,
    requests: Arc<AtomicUsize>,
}

impl FixedLocator {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Arc::new(Mutex::new(Some(Geotag::new(latitude, longitude)))),
            ..Self::default()
        }
    }

    /// Permission denied: every request resolves to `None`.
    pub fn denied() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_position(&self, position: Option<Geotag>) {
        *self.position.lock() = position;
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoLocator for FixedLocator {
    async fn current_position(&self) -> Option<Geotag> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        *self.position.lock()
    }
}
