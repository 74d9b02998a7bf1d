use kyc_core::{ApiSettings, ErrorKind, KycError, KycResult};
use reqwest::Url;
use serde_json::Value;

/// Shared HTTP plumbing for the verification backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> KycResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| KycError::configuration("Could not build HTTP client").with_source(e))?;
        Self::with_client(client, &settings.base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> KycResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            KycError::configuration(format!("Invalid api.url: {base_url}")).with_source(e)
        })?;
        if base_url.cannot_be_a_base() {
            return Err(KycError::configuration(format!("Invalid api.url: {base_url}")));
        }
        Ok(Self { client, base_url })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// `{base}/kyc/{action}/{token}` with the token percent-encoded as one segment.
    pub(crate) fn kyc_url(&self, action: &str, token: &str) -> KycResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| KycError::configuration("api.url cannot carry a path"))?
            .pop_if_empty()
            .extend(["kyc", action, token]);
        Ok(url)
    }
}

/// The `error` string of a JSON error body, if there is one.
pub(crate) fn server_reason(body: Option<&Value>) -> Option<String> {
    body.and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn connectivity(source: reqwest::Error) -> KycError {
    KycError::from_kind(ErrorKind::ConnectivityFailure).with_source(source)
}
