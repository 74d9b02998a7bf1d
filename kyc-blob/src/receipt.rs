use serde::{Deserialize, Serialize};

/// Fields we read from the provider's upload response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
    pub bytes: Option<u64>,
    pub format: Option<String>,
}

/// Error body: `{ "error": { "message": "..." } }`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderError {
    pub error: ProviderErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProviderErrorDetail {
    pub message: String,
}

impl ProviderError {
    /// Best-effort reason text from a non-success body.
    pub(crate) fn reason(body: &str) -> String {
        serde_json::from_str::<ProviderError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect())
    }
}
