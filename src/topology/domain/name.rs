//! Validated resource names.

use super::TopologyDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a resource name.
const MAX_RESOURCE_NAME_LENGTH: usize = 64;

/// Validated resource name.
///
/// Names double as host names on the shared container network, so they are
/// restricted to ASCII letters, digits and single hyphens, must start with a
/// letter and must not end with a hyphen. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a validated resource name.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, TopologyDomainError> {
        let trimmed = value.into().trim().to_owned();

        if trimmed.is_empty() {
            return Err(TopologyDomainError::EmptyResourceName);
        }

        if trimmed.len() > MAX_RESOURCE_NAME_LENGTH {
            return Err(TopologyDomainError::ResourceNameTooLong(trimmed));
        }

        let starts_with_letter = trimmed
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic());
        let valid_characters = trimmed
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '-');
        if !starts_with_letter
            || !valid_characters
            || trimmed.ends_with('-')
            || trimmed.contains("--")
        {
            return Err(TopologyDomainError::InvalidResourceName(trimmed));
        }

        Ok(Self(trimmed))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether two names refer to the same resource.
    ///
    /// Resource names are unique regardless of ASCII case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
