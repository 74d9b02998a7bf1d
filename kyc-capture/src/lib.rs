//! # kyc-capture: scoped camera sessions
//!
//! [`MediaCapture`] owns the camera for one capture surface. It pairs every
//! `open` with a release (explicit `close`, a later `open`, or drop) and runs a
//! best-effort geolocation request beside the live preview:
//!
//! ```text
//! open ──► live preview ──shutter──► still (+ latest geotag)
//!   │            ▲                      │
//!   │            └──────retake──────────┘
//!   └─ location request (background, read-at-use, never awaited)
//! ```
//!
//! Hardware access goes through the `Camera`/`GeoLocator` traits from
//! `kyc-core`; [`memory`] has in-process implementations.

mod media;
pub mod memory;

pub use media::{DeviceHandle, MediaCapture};
pub use memory::{FixedLocator, MemoryCamera};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{DeviceHandle, MediaCapture};
    pub use kyc_core::{Camera, CaptureSettings, FacingMode, GeoLocator, Geotag, StillImage};
}
