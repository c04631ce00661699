//! Domain model for registered resources and their network endpoints.
//!
//! Resources are identified by validated names. Endpoints start out
//! unallocated and receive an address once the allocation phase of a run
//! completes.

mod endpoint;
mod environment;
mod error;
mod event;
mod mount;
mod name;
mod resource;

pub use endpoint::{Endpoint, EndpointAllocation, EndpointScheme};
pub use environment::EnvironmentValue;
pub use error::TopologyDomainError;
pub use event::{LifecycleEvent, LifecycleEventKind};
pub use mount::{BindMount, Volume};
pub use name::ResourceName;
pub use resource::{
    ContainerImage, ContainerLifetime, DEFAULT_SUPERUSER, DatabaseServer, HealthCheck,
    PRIMARY_ENDPOINT_NAME, Relationship, Resource, ResourceKind,
};
