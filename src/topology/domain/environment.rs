//! Environment variable values attached to resources.

use super::ResourceName;
use serde::{Deserialize, Serialize};

/// Value of an environment variable, resolved when a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "value")]
pub enum EnvironmentValue {
    /// Fixed string.
    Literal(String),
    /// Current value of a parameter resource.
    Parameter(ResourceName),
    /// Connection string of a database server or database resource.
    ConnectionString(ResourceName),
}

impl EnvironmentValue {
    /// Creates a literal value.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}
