//! Scripted uploader for tests and offline development.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use kyc_core::{KycError, KycResult, StillImage, UploadClient};
use parking_lot::Mutex;

use crate::BlobError;

#[derive(Debug, Default)]
struct MemoryUploaderState {
    script: VecDeque<Result<String, String>>,
    uploaded: Vec<StillImage>,
    attempts: usize,
}

/// Answers uploads from a queue of scripted outcomes.
///
/// When the script runs out, each upload succeeds with
/// `memory://upload/<attempt>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryUploader {
    state: Arc<Mutex<MemoryUploaderState>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next upload succeeds with `url`.
    pub fn succeed_with(&self, url: impl Into<String>) -> &Self {
        self.state.lock().script.push_back(Ok(url.into()));
        self
    }

    /// Next upload is rejected with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) -> &Self {
        self.state.lock().script.push_back(Err(reason.into()));
        self
    }

    /// Stills that were stored successfully, in order.
    pub fn uploaded(&self) -> Vec<StillImage> {
        self.state.lock().uploaded.clone()
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }
}

#[async_trait]
impl UploadClient for MemoryUploader {
    async fn upload(&self, still: &StillImage) -> KycResult<String> {
        let mut state = self.state.lock();
        state.attempts += 1;
        let attempt = state.attempts;
        match state.script.pop_front() {
            Some(Err(reason)) => Err(KycError::from(BlobError::rejected(500, reason))),
            Some(Ok(url)) => {
                state.uploaded.push(still.clone());
                Ok(url)
            }
            None => {
                state.uploaded.push(still.clone());
                Ok(format!("memory://upload/{attempt}"))
            }
        }
    }
}
