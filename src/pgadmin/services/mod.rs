//! Server registry generation and its app host integration.

mod error;
mod generator;
mod handler;
mod integration;

pub use error::{ServerRegistryError, ServerRegistryResult};
pub use generator::{GenerationReport, REGISTRY_MOUNT_TARGET, ServerRegistryGenerator};
pub use handler::ServerRegistryEventHandler;
pub use integration::{PGADMIN_PORT_KEY, PgAdminOptions, PgAdminResourceBuilderExt};
