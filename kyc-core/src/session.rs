//! Verified session context resolved from the access token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Pending,
    Verified,
    Invalid,
}

/// One capture run, scoped by the opaque token from the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    case_id: String,
    status: SessionStatus,
    case_fields: Map<String, Value>,
}

impl Session {
    /// A session that has not been checked against the backend yet.
    pub fn pending(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            case_id: String::new(),
            status: SessionStatus::Pending,
            case_fields: Map::new(),
        }
    }

    pub fn verified(
        token: impl Into<String>,
        case_id: impl Into<String>,
        case_fields: Map<String, Value>,
    ) -> Self {
        Self {
            token: token.into(),
            case_id: case_id.into(),
            status: SessionStatus::Verified,
            case_fields,
        }
    }

    pub fn invalid(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            case_id: String::new(),
            status: SessionStatus::Invalid,
            case_fields: Map::new(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Loan/case identifier from the verification response.
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_verified(&self) -> bool {
        self.status == SessionStatus::Verified
    }

    /// Remaining fields the backend returned alongside `loan_id`.
    pub fn case_fields(&self) -> &Map<String, Value> {
        &self.case_fields
    }

    /// Short token prefix safe for logs.
    pub fn token_hint(&self) -> String {
        token_hint(&self.token)
    }
}

/// First few characters of a token, for log lines.
pub fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if prefix.len() < token.len() {
        format!("{prefix}…")
    } else {
        prefix
    }
}
