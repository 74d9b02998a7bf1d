use async_trait::async_trait;
use kyc_core::{token_hint, ErrorKind, KycError, KycResult, Session, SessionVerifier};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::client::{connectivity, server_reason, ApiClient};

/// `GET /kyc/verify/{token}`
#[derive(Debug, Clone)]
pub struct HttpSessionVerifier {
    api: ApiClient,
}

impl HttpSessionVerifier {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    #[instrument(skip(self, token), fields(token = %token_hint(token)))]
    async fn verify(&self, token: &str) -> KycResult<Session> {
        let token = token.trim();
        if token.is_empty() {
            return Err(KycError::from_kind(ErrorKind::InvalidSession));
        }

        let url = self.api.kyc_url("verify", token)?;
        let response = self.api.http().get(url).send().await.map_err(|e| {
            warn!(error = %e, "session verification could not complete");
            connectivity(e)
        })?;

        let status = response.status();
        // Error bodies are optional; a success body must parse.
        let body = response.json::<Value>().await;

        if !status.is_success() {
            let reason = server_reason(body.as_ref().ok());
            warn!(status = status.as_u16(), ?reason, "session rejected");
            return Err(match reason {
                Some(reason) => KycError::invalid_session(reason),
                None => KycError::from_kind(ErrorKind::InvalidSession),
            });
        }

        let mut fields = match body.map_err(connectivity)? {
            Value::Object(fields) => fields,
            other => {
                return Err(KycError::from_kind(ErrorKind::ConnectivityFailure)
                    .with_source(anyhow::anyhow!("verification body is not an object: {other}")))
            }
        };

        let case_id = match fields.remove("loan_id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(KycError::from_kind(ErrorKind::ConnectivityFailure)
                    .with_source(anyhow::anyhow!("verification body has no loan_id")))
            }
        };

        info!(case_id = %case_id, "session verified");
        Ok(Session::verified(token, case_id, fields))
    }
}
