//! Captured media and the per-step results it turns into.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::{KycError, KycResult};
use crate::steps::StepPlan;

/// Device position at the time a step's camera was opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geotag {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Geotag {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Geotag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Encoded still frame plus the location known when it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct StillImage {
    pub bytes: Bytes,
    pub content_type: String,
    pub geotag: Option<Geotag>,
}

impl StillImage {
    pub fn jpeg(bytes: impl Into<Bytes>, geotag: Option<Geotag>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: "image/jpeg".to_string(),
            geotag,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A step whose image has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub step_id: String,
    pub reference_url: String,
    pub geotag: Option<Geotag>,
}

/// Wire form of one result inside the submission body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEntry {
    pub url: String,
    pub geo: Option<Geotag>,
}

impl From<&CaptureResult> for CaptureEntry {
    fn from(result: &CaptureResult) -> Self {
        Self {
            url: result.reference_url.clone(),
            geo: result.geotag,
        }
    }
}

/// Append-only results for one session, kept in plan order.
///
/// `push` only accepts the result for the next step in the plan, so the
/// collection can never hold duplicates or skip a step.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureResults {
    plan: StepPlan,
    entries: Vec<CaptureResult>,
}

impl CaptureResults {
    pub fn new(plan: StepPlan) -> Self {
        Self {
            plan,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, result: CaptureResult) -> KycResult<()> {
        let expected = self.plan.get(self.entries.len()).ok_or_else(|| {
            KycError::invalid_state(format!(
                "All {} steps already have a result",
                self.plan.len()
            ))
        })?;

        if result.step_id != expected.id {
            return Err(KycError::invalid_state(format!(
                "Expected a result for step {}, got {}",
                expected.id, result.step_id
            )));
        }

        self.entries.push(result);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.plan.len()
    }

    pub fn get(&self, step_id: &str) -> Option<&CaptureResult> {
        self.entries.iter().find(|r| r.step_id == step_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaptureResult> {
        self.entries.iter()
    }

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }
}
