//! Credential delivery mechanisms understood by pgAdmin.

use crate::pgadmin::{
    domain::{CredentialDeliveryError, ServerCredential},
    ports::{CredentialDelivery, CredentialResult},
};
use crate::shell::{echo_command, quoted_echo_command};
use crate::topology::domain::ResourceName;
use camino::Utf8PathBuf;

/// Delivers the password as the `PasswordExecCommand` `echo '<password>'`.
///
/// The password is embedded verbatim. Passwords containing `'` produce a
/// command the shell splits differently; use [`QuotedEchoPasswordCommand`]
/// for those.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoPasswordCommand;

impl CredentialDelivery for EchoPasswordCommand {
    fn deliver(
        &self,
        _server: &ResourceName,
        password: &str,
    ) -> CredentialResult<ServerCredential> {
        Ok(ServerCredential::ExecCommand(echo_command(password)))
    }
}

/// Delivers the password as an `echo` command with POSIX single-quote
/// escaping.
///
/// NUL and line breaks cannot survive pgAdmin's command handling and are
/// rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedEchoPasswordCommand;

impl CredentialDelivery for QuotedEchoPasswordCommand {
    fn deliver(&self, server: &ResourceName, password: &str) -> CredentialResult<ServerCredential> {
        let unsupported = if password.contains('\0') {
            Some("NUL character")
        } else if password.contains(['\n', '\r']) {
            Some("line break")
        } else {
            None
        };
        if let Some(character) = unsupported {
            return Err(CredentialDeliveryError::UnsupportedCharacter {
                server: server.clone(),
                character,
            });
        }
        Ok(ServerCredential::ExecCommand(quoted_echo_command(password)))
    }
}

/// Points pgAdmin at a pgpass file instead of embedding the password.
///
/// The file itself is provisioned outside the generator, typically through
/// another bind mount on the pgAdmin container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassFileReference {
    path: Utf8PathBuf,
}

impl PassFileReference {
    /// Creates a reference to the pgpass file at `path` inside the
    /// container.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the container path of the pgpass file.
    #[must_use]
    pub fn path(&self) -> &camino::Utf8Path {
        &self.path
    }
}

impl CredentialDelivery for PassFileReference {
    fn deliver(
        &self,
        _server: &ResourceName,
        _password: &str,
    ) -> CredentialResult<ServerCredential> {
        Ok(ServerCredential::PassFile(self.path.to_string()))
    }
}
