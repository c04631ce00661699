//! Registry file persistence port.

use camino::Utf8Path;
use std::io;

/// Replaces the contents of the registry file.
#[cfg_attr(test, mockall::automock)]
pub trait RegistryFileSink: Send + Sync {
    /// Writes `contents` to `path`, truncating any previous content.
    ///
    /// The parent directory must already exist. The file is fully written,
    /// flushed and closed before the call returns.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`io::Error`] when the file cannot be opened or
    /// written.
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;
}
