//! # kyc-blob: captured-image storage
//!
//! Stores one still per call and hands back the durable URL the verification
//! backend will reference. There is no retry and no multipart chunking: a
//! capture is a single small JPEG, and a failed upload is retried by the user
//! recapturing the step.
//!
//! ```text
//! ┌─────────────────┐
//! │  CaptureWizard  │  ← decides when to retry (by recapturing)
//! ├─────────────────┤
//! │  UploadClient   │  ← one attempt, one URL
//! ├─────────────────┤
//! │  HttpUploader   │  ← multipart POST with an unsigned preset
//! └─────────────────┘
//! ```
//!
//! ```rust,no_run
//! use kyc_blob::{HttpUploader, UploadConfig};
//! use kyc_core::{StillImage, UploadClient};
//!
//! # async fn run() -> kyc_core::KycResult<()> {
//! let config = UploadConfig::new(
//!     "https://api.cloudinary.com/v1_1/openscore/image/upload",
//!     "kyc_unsigned",
//!     "openscore",
//! );
//! let uploader = HttpUploader::new(config)?;
//! let url = uploader.upload(&StillImage::jpeg(vec![0xFF, 0xD8], None)).await?;
//! # let _ = url;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod memory;
mod receipt;
mod uploader;

pub use config::UploadConfig;
pub use error::{BlobError, BlobResult};
pub use memory::MemoryUploader;
pub use receipt::UploadReceipt;
pub use uploader::HttpUploader;
