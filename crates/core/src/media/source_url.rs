//! The validated source URL.

use serde::{Deserialize, Serialize};
use url::Url;

use super::ValidationError;

/// Primary domain, matched by suffix (`youtube.com`, `www.youtube.com`, ...).
const PRIMARY_DOMAIN: &str = "youtube.com";

/// Short-link domain, matched exactly.
const SHORT_LINK_DOMAIN: &str = "youtu.be";

/// An immutable URL known to be an absolute http(s) URL pointing at an
/// allow-listed host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceUrl(String);

impl SourceUrl {
    /// Validates and wraps a raw URL string.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = raw.as_ref().trim();
        let parsed = Url::parse(raw).map_err(|_| ValidationError::NotAbsoluteUrl {
            value: raw.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| ValidationError::HostNotAllowed {
                host: String::new(),
            })?;

        if !host_allowed(host) {
            return Err(ValidationError::HostNotAllowed {
                host: host.to_string(),
            });
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Suffix match for the primary domain (dot-boundary, so `notyoutube.com` does
/// not pass), exact match for the short-link domain.
fn host_allowed(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == PRIMARY_DOMAIN
        || host.ends_with(&format!(".{}", PRIMARY_DOMAIN))
        || host == SHORT_LINK_DOMAIN
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
