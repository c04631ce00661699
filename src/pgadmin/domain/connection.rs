//! Connection record for one PostgreSQL server.

use crate::topology::domain::ResourceName;
use serde::{Deserialize, Serialize};

/// Group every generated server is listed under.
pub const SERVER_GROUP: &str = "Servers";

/// SSL negotiation mode written for every server.
pub const DEFAULT_SSL_MODE: &str = "prefer";

/// Database pgAdmin connects to for administrative queries.
pub const DEFAULT_MAINTENANCE_DB: &str = "postgres";

/// How pgAdmin obtains the server password.
///
/// Serialized as a single member of the enclosing connection object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerCredential {
    /// Shell command whose standard output is the password.
    #[serde(rename = "PasswordExecCommand")]
    ExecCommand(String),
    /// Path of a pgpass file inside the pgAdmin container.
    #[serde(rename = "PassFile")]
    PassFile(String),
}

/// Entry of the `Servers` map in pgAdmin's `servers.json`.
///
/// `Host` is the resource name and `Port` the target port, both as seen
/// from the shared container network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConnection {
    name: String,
    group: String,
    host: String,
    port: u16,
    username: String,
    #[serde(rename = "SSLMode")]
    ssl_mode: String,
    #[serde(rename = "MaintenanceDB")]
    maintenance_db: String,
    #[serde(flatten)]
    credential: ServerCredential,
}

impl ServerConnection {
    /// Creates the record for `server` listening on `target_port`.
    #[must_use]
    pub fn new(
        server: &ResourceName,
        target_port: u16,
        username: impl Into<String>,
        credential: ServerCredential,
    ) -> Self {
        Self {
            name: server.to_string(),
            group: SERVER_GROUP.to_owned(),
            host: server.to_string(),
            port: target_port,
            username: username.into(),
            ssl_mode: DEFAULT_SSL_MODE.to_owned(),
            maintenance_db: DEFAULT_MAINTENANCE_DB.to_owned(),
            credential,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group label.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the host name on the container network.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the target port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the login user.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the SSL mode.
    #[must_use]
    pub fn ssl_mode(&self) -> &str {
        &self.ssl_mode
    }

    /// Returns the maintenance database.
    #[must_use]
    pub fn maintenance_db(&self) -> &str {
        &self.maintenance_db
    }

    /// Returns how the password is delivered.
    #[must_use]
    pub const fn credential(&self) -> &ServerCredential {
        &self.credential
    }
}
