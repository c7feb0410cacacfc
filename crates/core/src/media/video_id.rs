//! The 11-character YouTube video identifier.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// An immutable, validated video identifier.
///
/// Constructed only through [`VideoId::new`]; equality and hashing are by
/// string value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Fixed length of every valid id.
    pub const LENGTH: usize = 11;

    /// Validates and wraps a raw id string. Surrounding whitespace is trimmed
    /// before the length check.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.chars().count() != Self::LENGTH {
            return Err(ValidationError::InvalidIdLength {
                value: raw.as_ref().to_string(),
                expected: Self::LENGTH,
                actual: trimmed.chars().count(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_id_round_trips() {
        let id = VideoId::new("dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_trims_whitespace() {
        let id = VideoId::new("  dQw4w9WgXcQ\n").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(VideoId::new("").is_err());
        assert!(VideoId::new("   ").is_err());
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        for bad in ["short", "dQw4w9WgXc", "dQw4w9WgXcQQ", "x"] {
            let err = VideoId::new(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidIdLength { .. }),
                "expected length error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_value_equality() {
        let a = VideoId::new("dQw4w9WgXcQ").unwrap();
        let b = VideoId::new("dQw4w9WgXcQ").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_transparent() {
        let id = VideoId::new("dQw4w9WgXcQ").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"dQw4w9WgXcQ\"");
    }
}
