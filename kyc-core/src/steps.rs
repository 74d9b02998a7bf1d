//! The fixed, ordered list of capture steps.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{KycError, KycResult};

/// One required capture item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub label: String,
    pub ordinal_index: usize,
}

/// Icon family the front end shows next to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Document,
    Person,
    Property,
}

/// Ids and labels the verification backend expects, in order.
pub const KYC_STEPS: [(&str, &str, StepKind); 7] = [
    ("aadhar_front", "Aadhaar Card (Front)", StepKind::Document),
    ("aadhar_back", "Aadhaar Card (Back)", StepKind::Document),
    ("pan_front", "PAN Card (Front)", StepKind::Document),
    ("selfie", "Selfie with Loan Agent", StepKind::Person),
    ("prop_1", "Property View (Side 1)", StepKind::Property),
    ("prop_2", "Property View (Side 2)", StepKind::Property),
    ("prop_3", "Property View (Side 3)", StepKind::Property),
];

/// Validated, immutable step sequence.
///
/// Non-empty, ids unique, and `steps[i].ordinal_index == i`. Cloning shares the
/// underlying list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    steps: Arc<[StepDefinition]>,
}

impl StepPlan {
    /// Build a plan from `(id, label)` pairs, assigning ordinals by position.
    pub fn new<I, S, L>(steps: I) -> KycResult<Self>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let steps: Vec<StepDefinition> = steps
            .into_iter()
            .enumerate()
            .map(|(ordinal_index, (id, label))| StepDefinition {
                id: id.into(),
                label: label.into(),
                ordinal_index,
            })
            .collect();

        if steps.is_empty() {
            crate::bail_kyc!(configuration, "A capture plan needs at least one step");
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if step.id.trim().is_empty() {
                crate::bail_kyc!(configuration, "Step {} has an empty id", step.ordinal_index);
            }
            if !seen.insert(step.id.as_str()) {
                crate::bail_kyc!(configuration, "Duplicate step id: {}", step.id);
            }
        }

        Ok(Self {
            steps: steps.into(),
        })
    }

    /// The seven-step document, selfie and property sequence.
    pub fn kyc_default() -> Self {
        let steps: Vec<StepDefinition> = KYC_STEPS
            .iter()
            .enumerate()
            .map(|(ordinal_index, (id, label, _))| StepDefinition {
                id: (*id).to_string(),
                label: (*label).to_string(),
                ordinal_index,
            })
            .collect();
        Self {
            steps: steps.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn step(&self, index: usize) -> KycResult<&StepDefinition> {
        self.steps
            .get(index)
            .ok_or_else(|| KycError::invalid_state(format!("No capture step at index {index}")))
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.steps.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.steps.iter().any(|s| s.id == id)
    }

    /// Progress through the plan while `index` is active, as a percentage.
    pub fn progress_percent(&self, index: usize) -> u8 {
        let done = (index + 1).min(self.steps.len());
        ((done * 100) / self.steps.len()) as u8
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        Self::kyc_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_backend_keys() {
        let plan = StepPlan::kyc_default();
        let ids: Vec<&str> = plan.ids().collect();
        assert_eq!(
            ids,
            ["aadhar_front", "aadhar_back", "pan_front", "selfie", "prop_1", "prop_2", "prop_3"]
        );
        for (i, step) in plan.iter().enumerate() {
            assert_eq!(step.ordinal_index, i);
        }
        assert!(plan.is_last(6));
        assert!(!plan.is_last(5));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = StepPlan::new([("a", "A"), ("b", "B"), ("a", "Again")]).unwrap_err();
        assert_eq!(err.message, "Duplicate step id: a");
    }

    #[test]
    fn empty_plan_rejected() {
        let steps: Vec<(String, String)> = Vec::new();
        assert!(StepPlan::new(steps).is_err());
    }

    #[test]
    fn progress_counts_the_active_step() {
        let plan = StepPlan::new([("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]).unwrap();
        assert_eq!(plan.progress_percent(0), 25);
        assert_eq!(plan.progress_percent(3), 100);
    }
}
