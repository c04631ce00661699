//! pgAdmin server registry generation.
//!
//! pgAdmin reads `/pgadmin4/servers.json` once at startup to pre-populate
//! its connection list. The addresses of the PostgreSQL servers are only
//! known after the app host allocates endpoints, so the file is generated in
//! reaction to the `AfterEndpointsAllocated` lifecycle event and written to
//! the host side of the container's bind mount.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Generation and integration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
