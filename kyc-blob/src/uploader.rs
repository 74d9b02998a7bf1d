use async_trait::async_trait;
use kyc_core::{KycResult, StillImage, UploadClient};
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::receipt::{ProviderError, UploadReceipt};
use crate::{BlobError, BlobResult, UploadConfig};

/// Uploads stills with an unsigned preset, one multipart POST per image.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    config: UploadConfig,
}

impl HttpUploader {
    pub fn new(config: UploadConfig) -> BlobResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Share an existing client; the config timeout is applied per request.
    pub fn with_client(client: reqwest::Client, config: UploadConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Store one still and return the provider's receipt.
    #[instrument(skip(self, still), fields(bytes = still.len()))]
    pub async fn put(&self, still: &StillImage) -> BlobResult<UploadReceipt> {
        if still.is_empty() {
            return Err(BlobError::invalid("Captured image is empty"));
        }
        if still.len() > self.config.max_image_bytes {
            return Err(BlobError::invalid(format!(
                "Captured image is {} bytes (max {})",
                still.len(),
                self.config.max_image_bytes
            )));
        }

        let file = Part::bytes(still.bytes.to_vec())
            .file_name(format!("capture-{}.jpg", Uuid::new_v4().simple()))
            .mime_str(&still.content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("cloud_name", self.config.cloud_name.clone());

        let response = self
            .client
            .post(&self.config.upload_url)
            .timeout(self.config.timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let reason = ProviderError::reason(&body);
            warn!(status = status.as_u16(), %reason, "upload rejected");
            return Err(BlobError::rejected(status.as_u16(), reason));
        }

        let receipt: UploadReceipt = serde_json::from_str(&body)?;
        debug!(public_id = ?receipt.public_id, "upload stored");
        Ok(receipt)
    }
}

#[async_trait]
impl UploadClient for HttpUploader {
    async fn upload(&self, still: &StillImage) -> KycResult<String> {
        let receipt = self.put(still).await?;
        match receipt.secure_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(BlobError::MissingUrl.into()),
        }
    }
}
