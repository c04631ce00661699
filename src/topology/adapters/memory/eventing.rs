//! In-memory lifecycle event bus.

use crate::topology::{
    domain::{LifecycleEvent, LifecycleEventKind},
    ports::{Delivery, EventError, EventResult, Eventing, LifecycleEventHandler, SubscriptionId},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;

struct Subscription {
    kind: LifecycleEventKind,
    delivery: Delivery,
    handler: Arc<dyn LifecycleEventHandler>,
}

#[derive(Default)]
struct EventBusState {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Event bus that dispatches handlers sequentially on the publishing task.
///
/// One-shot subscriptions are removed before their handler runs, so a
/// handler registered with [`Delivery::Once`] never runs twice even if a
/// later publish overlaps with a slow handler.
#[derive(Clone, Default)]
pub struct InMemoryEventBus {
    state: Arc<RwLock<EventBusState>>,
}

impl InMemoryEventBus {
    /// Creates an event bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live subscriptions for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Bus`] when subscription state is unavailable.
    pub fn subscription_count(&self, kind: LifecycleEventKind) -> EventResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|err| EventError::bus(std::io::Error::other(err.to_string())))?;
        Ok(state
            .subscriptions
            .iter()
            .filter(|subscription| subscription.kind == kind)
            .count())
    }

    fn take_handlers(
        &self,
        kind: LifecycleEventKind,
    ) -> EventResult<Vec<Arc<dyn LifecycleEventHandler>>> {
        let mut state = self
            .state
            .write()
            .map_err(|err| EventError::bus(std::io::Error::other(err.to_string())))?;

        let handlers = state
            .subscriptions
            .iter()
            .filter(|subscription| subscription.kind == kind)
            .map(|subscription| Arc::clone(&subscription.handler))
            .collect();
        state.subscriptions.retain(|subscription| {
            subscription.kind != kind || subscription.delivery != Delivery::Once
        });
        Ok(handlers)
    }
}

impl std::fmt::Debug for InMemoryEventBus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("InMemoryEventBus").finish_non_exhaustive()
    }
}

#[async_trait]
impl Eventing for InMemoryEventBus {
    fn subscribe(
        &self,
        kind: LifecycleEventKind,
        delivery: Delivery,
        handler: Arc<dyn LifecycleEventHandler>,
    ) -> EventResult<SubscriptionId> {
        let mut state = self
            .state
            .write()
            .map_err(|err| EventError::bus(std::io::Error::other(err.to_string())))?;

        state.next_id += 1;
        let id = SubscriptionId::new(state.next_id);
        state.subscriptions.push(Subscription {
            kind,
            delivery,
            handler,
        });
        debug!(subscription = %id, event = %kind, ?delivery, "subscribed lifecycle handler");
        Ok(id)
    }

    async fn publish(&self, event: LifecycleEvent) -> EventResult<usize> {
        let kind = event.kind();
        let handlers = self.take_handlers(kind)?;
        debug!(event = %kind, handlers = handlers.len(), "publishing lifecycle event");

        for handler in &handlers {
            handler.handle(&event).await?;
        }
        Ok(handlers.len())
    }
}
