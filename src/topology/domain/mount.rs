//! Bind mounts and named volumes.

use super::TopologyDomainError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

fn ensure_absolute_target(target: &str) -> Result<String, TopologyDomainError> {
    let trimmed = target.trim();
    if !trimmed.starts_with('/') {
        return Err(TopologyDomainError::RelativeMountTarget(trimmed.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Host path mapped into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindMount {
    source: Utf8PathBuf,
    target: String,
}

impl BindMount {
    /// Creates a bind mount.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::RelativeMountTarget`] when `target` is
    /// not an absolute container path.
    pub fn new(source: impl Into<Utf8PathBuf>, target: &str) -> Result<Self, TopologyDomainError> {
        Ok(Self {
            source: source.into(),
            target: ensure_absolute_target(target)?,
        })
    }

    /// Returns the host-side path.
    #[must_use]
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    /// Returns the container-side path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Named volume mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    name: String,
    target: String,
}

impl Volume {
    /// Creates a named volume mount.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyDomainError::RelativeMountTarget`] when `target` is
    /// not an absolute container path.
    pub fn new(name: impl Into<String>, target: &str) -> Result<Self, TopologyDomainError> {
        Ok(Self {
            name: name.into(),
            target: ensure_absolute_target(target)?,
        })
    }

    /// Returns the volume name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the container-side path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}
