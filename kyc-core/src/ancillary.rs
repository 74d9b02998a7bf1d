//! Optional form data collected before capture starts.

use serde::{Deserialize, Serialize};

use crate::errors::{KycError, KycResult};

/// Bank account the loan will be disbursed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

impl BankDetails {
    pub const FIELDS: [&'static str; 4] =
        ["account_holder_name", "account_number", "ifsc_code", "bank_name"];

    fn values(&self) -> [(&'static str, &str); 4] {
        [
            ("account_holder_name", self.account_holder_name.as_str()),
            ("account_number", self.account_number.as_str()),
            ("ifsc_code", self.ifsc_code.as_str()),
            ("bank_name", self.bank_name.as_str()),
        ]
    }
}

/// Extra data merged into the submission. Each variant has a fixed field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AncillaryData {
    BankDetails(BankDetails),
}

/// Which ancillary form, if any, precedes the capture steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncillaryForm {
    BankDetails,
}

impl AncillaryData {
    pub fn form(&self) -> AncillaryForm {
        match self {
            AncillaryData::BankDetails(_) => AncillaryForm::BankDetails,
        }
    }

    /// Field name/value pairs in form order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            AncillaryData::BankDetails(details) => details
                .values()
                .iter()
                .map(|(k, v)| (*k, v.trim().to_string()))
                .collect(),
        }
    }

    /// Names of mandatory fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            AncillaryData::BankDetails(details) => details
                .values()
                .iter()
                .filter(|(_, v)| v.trim().is_empty())
                .map(|(k, _)| *k)
                .collect(),
        }
    }

    /// Completeness check. Purely local; never touches the network.
    pub fn validate(&self) -> KycResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(KycError::incomplete_form(format!(
                "Please fill in: {}",
                missing.join(", ")
            )))
        }
    }
}
