//! Shared error classification.
//!
//! Every module defines its own error enum; this category taxonomy is the
//! common vocabulary used when a failure crosses the workflow boundary and has
//! to be rendered for a user.

use serde::Serialize;

/// Broad classification of a failure, independent of which module produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input that never touched an external system.
    Validation,
    /// An expected artifact was missing.
    NotFound,
    /// Duplicate detected - informational, not fatal.
    Conflict,
    /// Internal failure (process start, I/O).
    Failure,
    /// Subprocess non-zero exit or remote API rejection.
    ExternalService,
    /// Required settings are missing or unusable.
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Failure => "failure",
            ErrorCategory::ExternalService => "external_service",
            ErrorCategory::Configuration => "configuration",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(
            ErrorCategory::ExternalService.to_string(),
            "external_service"
        );
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::Configuration).unwrap();
        assert_eq!(json, "\"configuration\"");
    }
}
