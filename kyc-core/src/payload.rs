//! The consolidated record posted at the end of a session.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::ancillary::AncillaryData;
use crate::capture::{CaptureEntry, CaptureResults};
use crate::errors::{KycError, KycResult};

/// Complete results for every step, plus ancillary data if the form was shown.
///
/// Serializes as one flat JSON object: each step id maps to
/// `{ "url", "geo" }`, ancillary fields sit alongside as plain strings.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPayload {
    captures: CaptureResults,
    ancillary: Option<AncillaryData>,
}

impl SubmissionPayload {
    pub fn combine(captures: CaptureResults, ancillary: Option<AncillaryData>) -> KycResult<Self> {
        if !captures.is_complete() {
            return Err(KycError::invalid_state(format!(
                "Cannot submit {} of {} steps",
                captures.len(),
                captures.plan().len()
            )));
        }

        if let Some(data) = &ancillary {
            data.validate()?;
            for (field, _) in data.fields() {
                if captures.plan().contains(field) {
                    return Err(KycError::configuration(format!(
                        "Form field {field} collides with a capture step"
                    )));
                }
            }
        }

        Ok(Self {
            captures,
            ancillary,
        })
    }

    pub fn captures(&self) -> &CaptureResults {
        &self.captures
    }

    pub fn ancillary(&self) -> Option<&AncillaryData> {
        self.ancillary.as_ref()
    }

    pub fn to_json(&self) -> Value {
        // Serializing a map of strings and plain structs cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self
            .ancillary
            .as_ref()
            .map(AncillaryData::fields)
            .unwrap_or_default();

        let mut map = serializer.serialize_map(Some(self.captures.len() + fields.len()))?;
        for result in self.captures.iter() {
            map.serialize_entry(&result.step_id, &CaptureEntry::from(result))?;
        }
        for (name, value) in &fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
