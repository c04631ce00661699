//! Port contracts for server registry generation.
//!
//! Ports isolate how passwords reach pgAdmin and how the registry file is
//! persisted.

mod credential;
mod sink;

pub use credential::{CredentialDelivery, CredentialResult};
#[cfg(test)]
pub use sink::MockRegistryFileSink;
pub use sink::RegistryFileSink;
