//! Lifecycle handler that regenerates the server registry.

use super::ServerRegistryGenerator;
use crate::pgadmin::ports::RegistryFileSink;
use crate::topology::{
    domain::{LifecycleEvent, LifecycleEventKind},
    ports::{EventError, EventResult, LifecycleEventHandler, ResourceRegistry},
};
use async_trait::async_trait;
use tracing::error;

/// Runs the generator when endpoints have been allocated.
///
/// Other events are ignored. A generation failure is returned to the event
/// bus, which aborts app host startup.
pub struct ServerRegistryEventHandler<R, S> {
    generator: ServerRegistryGenerator<R, S>,
}

impl<R, S> ServerRegistryEventHandler<R, S>
where
    R: ResourceRegistry,
    S: RegistryFileSink,
{
    /// Wraps a generator.
    #[must_use]
    pub const fn new(generator: ServerRegistryGenerator<R, S>) -> Self {
        Self { generator }
    }

    /// Returns the wrapped generator.
    #[must_use]
    pub const fn generator(&self) -> &ServerRegistryGenerator<R, S> {
        &self.generator
    }
}

#[async_trait]
impl<R, S> LifecycleEventHandler for ServerRegistryEventHandler<R, S>
where
    R: ResourceRegistry + 'static,
    S: RegistryFileSink + 'static,
{
    async fn handle(&self, event: &LifecycleEvent) -> EventResult<()> {
        if event.kind() != LifecycleEventKind::AfterEndpointsAllocated {
            return Ok(());
        }
        match self.generator.generate() {
            Ok(_) => Ok(()),
            Err(err) => {
                error!(
                    admin = %self.generator.admin(),
                    error = %err,
                    "server registry generation failed"
                );
                Err(EventError::handler(event.kind(), err))
            }
        }
    }
}
