//! Declarative topology builder and app host run services.

mod builder;
mod error;
mod host;

pub use builder::{AppHostBuilder, LocalAppHost, PostgresServerOptions, ResourceBuilder};
pub use error::{AppHostError, AppHostResult};
pub use host::{AllocatedEndpoint, AppHost, REDACTED_VALUE, RunSummary};
