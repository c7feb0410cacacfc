//! Validated value objects for the remote resource.
//!
//! All input strings are funneled through these factories before anything is
//! handed to the external tool, so malformed or crafted input never reaches
//! the process boundary.

mod source_url;
mod video_id;

pub use source_url::SourceUrl;
pub use video_id::VideoId;

use thiserror::Error;

/// Validation failure for a value object.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Video id is empty or not exactly [`VideoId::LENGTH`] characters.
    #[error("invalid video id length: expected {expected}, got {actual} ({value:?})")]
    InvalidIdLength {
        value: String,
        expected: usize,
        actual: usize,
    },

    /// The string does not parse as an absolute URL.
    #[error("not an absolute URL: {value:?}")]
    NotAbsoluteUrl { value: String },

    /// URL scheme is not http or https.
    #[error("unsupported URL scheme {scheme:?}")]
    UnsupportedScheme { scheme: String },

    /// URL host is missing or not on the allow-list.
    #[error("host {host:?} is not an allowed source")]
    HostNotAllowed { host: String },
}
