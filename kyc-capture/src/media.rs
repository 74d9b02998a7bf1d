use std::sync::Arc;
use std::time::Duration;

use kyc_core::{
    Camera, CaptureSettings, FacingMode, GeoLocator, Geotag, KycError, KycResult, StillImage,
    VideoStream,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Proof that a camera session is open. Only the most recent handle is valid.
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceHandle {
    id: u64,
}

impl DeviceHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Owns the camera for one capture surface.
///
/// At most one stream is live at a time: `open` releases any prior session
/// before acquiring a new one, and dropping the `MediaCapture` releases
/// whatever is still held.
pub struct MediaCapture {
    camera: Arc<dyn Camera>,
    locator: Arc<dyn GeoLocator>,
    settings: CaptureSettings,
    facing: FacingMode,
    active: Option<ActiveCapture>,
    next_id: u64,
}

impl MediaCapture {
    pub fn new<C, G>(camera: C, locator: G, settings: CaptureSettings) -> Self
    where
        C: Camera + 'static,
        G: GeoLocator + 'static,
    {
        Self::from_arcs(Arc::new(camera), Arc::new(locator), settings)
    }

    pub fn from_arcs(
        camera: Arc<dyn Camera>,
        locator: Arc<dyn GeoLocator>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            camera,
            locator,
            settings,
            facing: FacingMode::Environment,
            active: None,
            next_id: 1,
        }
    }

    /// Prefer a different camera (defaults to the rear one).
    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    /// Start a live preview and a background location request.
    pub async fn open(&mut self) -> KycResult<DeviceHandle> {
        if let Some(prior) = self.active.take() {
            debug!(handle = prior.id, "closing prior camera session before reopening");
            drop(prior);
        }

        let stream = self.camera.acquire(self.facing).await.map_err(|e| {
            warn!(error = %e, "camera acquisition failed");
            e
        })?;

        let id = self.next_id;
        self.next_id += 1;

        let location = LocationWatch::spawn(self.locator.clone(), self.settings.geolocation_timeout);
        self.active = Some(ActiveCapture {
            id,
            stream,
            location,
            still_taken: false,
        });

        info!(handle = id, facing = ?self.facing, "camera session opened");
        Ok(DeviceHandle { id })
    }

    /// Encode the current frame and stop the preview.
    ///
    /// The geotag is whatever the location request has produced so far.
    pub async fn shutter(&mut self, handle: &DeviceHandle) -> KycResult<StillImage> {
        let quality = self.settings.jpeg_quality;
        let active = self.active_mut(handle)?;
        if active.still_taken {
            return Err(KycError::invalid_state(
                "A photo is already waiting; retake or confirm it",
            ));
        }

        let bytes = active.stream.grab_frame(quality).await?;
        let geotag = active.location.latest();
        active.stream.stop();
        active.still_taken = true;

        debug!(
            handle = handle.id,
            bytes = bytes.len(),
            geotagged = geotag.is_some(),
            "still captured"
        );
        Ok(StillImage::jpeg(bytes, geotag))
    }

    /// Discard the still, restart the preview and ask for the location again.
    ///
    /// Once the preview is back the previous location is wiped, even if the
    /// new request never resolves. If the camera can no longer be acquired the
    /// session is released and the handle becomes stale.
    pub async fn retake(&mut self, handle: &DeviceHandle) -> KycResult<()> {
        let camera = self.camera.clone();
        let locator = self.locator.clone();
        let facing = self.facing;
        let timeout = self.settings.geolocation_timeout;

        let active = self.active_mut(handle)?;
        if !active.still_taken {
            return Err(KycError::invalid_state("There is no photo to retake"));
        }

        match camera.acquire(facing).await {
            Ok(stream) => {
                active.stream = stream;
                active.location = LocationWatch::spawn(locator, timeout);
                active.still_taken = false;
                debug!(handle = handle.id, "preview resumed for retake");
                Ok(())
            }
            Err(e) => {
                warn!(handle = handle.id, error = %e, "camera lost during retake");
                self.active = None;
                Err(e)
            }
        }
    }

    /// Release the camera and cancel the location request.
    pub fn close(&mut self, handle: DeviceHandle) {
        match &self.active {
            Some(active) if active.id == handle.id => {
                self.active = None;
                info!(handle = handle.id, "camera session closed");
            }
            _ => debug!(handle = handle.id, "close on a stale handle ignored"),
        }
    }

    /// Release whatever is held, regardless of handle.
    pub fn release(&mut self) {
        if let Some(active) = self.active.take() {
            info!(handle = active.id, "camera session released");
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Location known right now for the open session.
    pub fn current_geotag(&self, handle: &DeviceHandle) -> Option<Geotag> {
        self.active
            .as_ref()
            .filter(|a| a.id == handle.id)
            .and_then(|a| a.location.latest())
    }

    fn active_mut(&mut self, handle: &DeviceHandle) -> KycResult<&mut ActiveCapture> {
        match self.active.as_mut() {
            Some(active) if active.id == handle.id => Ok(active),
            _ => Err(KycError::invalid_state("Camera session is no longer open")),
        }
    }
}

impl std::fmt::Debug for MediaCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCapture")
            .field("facing", &self.facing)
            .field("open", &self.active.as_ref().map(|a| a.id))
            .finish()
    }
}

struct ActiveCapture {
    id: u64,
    stream: Box<dyn VideoStream>,
    location: LocationWatch,
    still_taken: bool,
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.stream.stop();
    }
}

/// Background location request whose latest value is read, never awaited.
struct LocationWatch {
    rx: watch::Receiver<Option<Geotag>>,
    task: JoinHandle<()>,
}

impl LocationWatch {
    fn spawn(locator: Arc<dyn GeoLocator>, timeout: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            match tokio::time::timeout(timeout, locator.current_position()).await {
                Ok(Some(position)) => {
                    debug!(%position, "location resolved");
                    let _ = tx.send(Some(position));
                }
                Ok(None) => warn!("location unavailable, continuing without geotag"),
                Err(_) => warn!(?timeout, "location request timed out"),
            }
        });
        Self { rx, task }
    }

    fn latest(&self) -> Option<Geotag> {
        *self.rx.borrow()
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
