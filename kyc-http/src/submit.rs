use async_trait::async_trait;
use kyc_core::{
    ErrorKind, KycError, KycResult, Session, SubmissionClient, SubmissionPayload,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::client::{server_reason, ApiClient};

/// `POST /kyc/submit/{token}`
///
/// Not idempotent: if the request times out after the backend stored the
/// record, the caller sees a failure for a submission that actually landed.
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    api: ApiClient,
}

impl HttpSubmissionClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    #[instrument(skip_all, fields(case_id = %session.case_id(), token = %session.token_hint()))]
    async fn submit(&self, session: &Session, payload: &SubmissionPayload) -> KycResult<()> {
        let url = self.api.kyc_url("submit", session.token())?;
        let response = self
            .api
            .http()
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "submission could not complete");
                KycError::connectivity("Network error.").with_source(e)
            })?;

        let status = response.status();
        if status.is_success() {
            info!(steps = payload.captures().len(), "submission accepted");
            return Ok(());
        }

        let body = response.json::<Value>().await.ok();
        let reason = server_reason(body.as_ref());
        warn!(status = status.as_u16(), ?reason, "submission rejected");
        Err(match reason {
            Some(reason) => KycError::submission_failure(reason),
            None => KycError::from_kind(ErrorKind::SubmissionFailure),
        })
    }
}
