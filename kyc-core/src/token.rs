//! Access-token extraction from verification links.
//!
//! Links arrive in one of two shapes:
//! - `https://host/form/{token}`
//! - `https://host/form?token={token}`

use url::Url;

use crate::errors::{ErrorKind, KycError, KycResult};

/// Base for links given without scheme and host (`/form?token=...`).
const RELATIVE_LINK_BASE: &str = "http://localhost/";

/// Opaque token identifying one capture session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> KycResult<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(KycError::from_kind(ErrorKind::InvalidAccess));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Pull the decoded token out of a link, preferring the path segment over
    /// the query.
    ///
    /// The query is read as `application/x-www-form-urlencoded` (`+` is a
    /// space); the path segment is only percent-decoded.
    pub fn from_link(link: &str) -> KycResult<Self> {
        let url = parse_link(link.trim()).map_err(invalid_access)?;

        if let Some(token) = token_from_path(&url)? {
            return Self::new(token);
        }
        if let Some(token) = token_from_query(&url) {
            return Self::new(token);
        }
        Err(KycError::from_kind(ErrorKind::InvalidAccess))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn invalid_access(source: impl std::error::Error + Send + Sync + 'static) -> KycError {
    KycError::from_kind(ErrorKind::InvalidAccess).with_source(source)
}

fn parse_link(link: &str) -> Result<Url, url::ParseError> {
    match Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_LINK_BASE)?.join(link),
        parsed => parsed,
    }
}

/// The segment after `form`, percent-decoded.
fn token_from_path(url: &Url) -> KycResult<Option<String>> {
    let Some(mut segments) = url.path_segments() else {
        return Ok(None);
    };
    while let Some(segment) = segments.next() {
        if segment != "form" {
            continue;
        }
        return match segments.next().filter(|s| !s.is_empty()) {
            Some(raw) => {
                let decoded = urlencoding::decode(raw).map_err(invalid_access)?;
                Ok(Some(decoded.into_owned()).filter(|t| !t.trim().is_empty()))
            }
            None => Ok(None),
        };
    }
    Ok(None)
}

fn token_from_query(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.trim().is_empty())
}
