//! Registry file sink backed by capability-scoped directory handles.

use crate::pgadmin::ports::RegistryFileSink;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use std::io::{self, Write};

/// Permission bits applied to the registry file on unix.
pub const REGISTRY_FILE_MODE: u32 = 0o644;

/// Writes the registry file in place.
///
/// The file is truncated and rewritten, never replaced by rename, so the
/// inode behind a single-file bind mount stays the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapStdRegistryFileSink;

impl CapStdRegistryFileSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RegistryFileSink for CapStdRegistryFileSink {
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::other(format!("registry path '{path}' has no file name")))?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let mut file = dir.open_with(file_name, &options)?;
        #[cfg(unix)]
        {
            use cap_std::fs::{Permissions, PermissionsExt};
            file.set_permissions(Permissions::from_mode(REGISTRY_FILE_MODE))?;
        }
        file.write_all(contents)?;
        file.sync_all()
    }
}
