//! In-process verifier and submission sink for tests and offline development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kyc_core::{
    ErrorKind, KycError, KycResult, Session, SessionVerifier, SubmissionClient, SubmissionPayload,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct VerifierState {
    sessions: HashMap<String, Result<String, KycError>>,
    calls: usize,
}

/// Resolves tokens from a fixed table. Unknown tokens are invalid.
#[derive(Debug, Clone, Default)]
pub struct MemoryVerifier {
    state: Arc<Mutex<VerifierState>>,
}

impl MemoryVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, token: impl Into<String>, case_id: impl Into<String>) -> Self {
        self.state
            .lock()
            .sessions
            .insert(token.into(), Ok(case_id.into()));
        self
    }

    pub fn with_error(self, token: impl Into<String>, error: KycError) -> Self {
        self.state.lock().sessions.insert(token.into(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }
}

#[async_trait]
impl SessionVerifier for MemoryVerifier {
    async fn verify(&self, token: &str) -> KycResult<Session> {
        let mut state = self.state.lock();
        state.calls += 1;
        match state.sessions.get(token) {
            Some(Ok(case_id)) => Ok(Session::verified(token, case_id.clone(), Map::new())),
            Some(Err(err)) => Err(err.clone()),
            None => Err(KycError::from_kind(ErrorKind::InvalidSession)),
        }
    }
}

#[derive(Debug, Default)]
struct SubmitterState {
    submitted: Vec<(String, Value)>,
    fail_with: Option<KycError>,
}

/// Records every submitted payload as JSON.
#[derive(Debug, Clone, Default)]
pub struct MemorySubmitter {
    state: Arc<Mutex<SubmitterState>>,
}

impl MemorySubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later submission fails with `error`.
    pub fn fail_with(&self, error: KycError) {
        self.state.lock().fail_with = Some(error);
    }

    /// `(token, payload)` pairs in submission order.
    pub fn submitted(&self) -> Vec<(String, Value)> {
        self.state.lock().submitted.clone()
    }
}

#[async_trait]
impl SubmissionClient for MemorySubmitter {
    async fn submit(&self, session: &Session, payload: &SubmissionPayload) -> KycResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = &state.fail_with {
            return Err(err.clone());
        }
        state
            .submitted
            .push((session.token().to_string(), payload.to_json()));
        Ok(())
    }
}
