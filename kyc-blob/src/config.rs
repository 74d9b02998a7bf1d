use std::time::Duration;

use kyc_core::UploadSettings;

/// Configuration for the storage provider upload
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Full upload URL, `{endpoint}/v1_1/{cloud_name}/image/upload`
    pub upload_url: String,

    /// Unsigned upload preset name
    pub upload_preset: String,

    /// Account (cloud) name sent alongside the file
    pub cloud_name: String,

    /// Request timeout for a single upload
    pub timeout: Duration,

    /// Largest still accepted before any network call (safety guard)
    pub max_image_bytes: usize,
}

impl UploadConfig {
    pub fn new<S: Into<String>>(upload_url: S, upload_preset: S, cloud_name: S) -> Self {
        Self {
            upload_url: upload_url.into(),
            upload_preset: upload_preset.into(),
            cloud_name: cloud_name.into(),
            timeout: Duration::from_secs(30),
            max_image_bytes: 10 * 1024 * 1024, // 10MB
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max image size
    pub fn with_max_image_bytes(mut self, bytes: usize) -> Self {
        self.max_image_bytes = bytes;
        self
    }
}

impl From<&UploadSettings> for UploadConfig {
    fn from(settings: &UploadSettings) -> Self {
        Self::new(
            settings.upload_url(),
            settings.preset.clone(),
            settings.cloud_name.clone(),
        )
        .with_timeout(settings.timeout)
    }
}
