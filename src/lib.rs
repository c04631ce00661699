//! Anvil: local development app host.
//!
//! This crate declares a multi-container development topology (PostgreSQL,
//! pgAdmin, Dex and the Universe project), allocates its endpoints and
//! generates the pgAdmin server registry once addresses are known.
//!
//! # Architecture
//!
//! Anvil follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and validation with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for registries, events and files
//! - **Adapters**: Concrete implementations of ports (in-memory, filesystem)
//!
//! # Modules
//!
//! - [`topology`]: Resources, endpoints, lifecycle events and the app host
//! - [`pgadmin`]: pgAdmin container integration and `servers.json` generation
//! - [`config`]: Layered settings file and environment configuration
//! - [`apphost`]: The development topology itself

pub mod apphost;
pub mod config;
pub mod pgadmin;
pub mod shell;
pub mod telemetry;
pub mod topology;
