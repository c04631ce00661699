//! Lifecycle event subscription and dispatch port.

use crate::topology::domain::{LifecycleEvent, LifecycleEventKind};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for eventing operations.
pub type EventResult<T> = Result<T, EventError>;

/// Handler invoked when a subscribed lifecycle event is published.
#[async_trait]
pub trait LifecycleEventHandler: Send + Sync {
    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] when handling fails. Publishing stops at the
    /// first failing handler.
    async fn handle(&self, event: &LifecycleEvent) -> EventResult<()>;
}

/// How often a subscription is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Removed after the first delivery.
    Once,
    /// Delivered on every publish.
    EveryPublish,
}

/// Identifier handed out for each subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates an identifier from its sequence number.
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Typed lifecycle event queue.
#[async_trait]
pub trait Eventing: Send + Sync {
    /// Registers a handler for one kind of event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Bus`] when subscription state is unavailable.
    fn subscribe(
        &self,
        kind: LifecycleEventKind,
        delivery: Delivery,
        handler: Arc<dyn LifecycleEventHandler>,
    ) -> EventResult<SubscriptionId>;

    /// Delivers an event to its subscribers in subscription order and
    /// returns how many handlers ran.
    ///
    /// # Errors
    ///
    /// Returns the first handler failure, or [`EventError::Bus`] when
    /// subscription state is unavailable.
    async fn publish(&self, event: LifecycleEvent) -> EventResult<usize>;
}

/// Errors returned while subscribing or publishing.
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// A handler failed.
    #[error("{kind} handler failed: {source}")]
    Handler {
        /// Event being handled.
        kind: LifecycleEventKind,
        /// Underlying failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Subscription state could not be accessed.
    #[error("event bus unavailable: {0}")]
    Bus(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventError {
    /// Wraps a handler failure.
    pub fn handler(
        kind: LifecycleEventKind,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Handler {
            kind,
            source: Arc::new(err),
        }
    }

    /// Wraps a failure to access subscription state.
    pub fn bus(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Bus(Arc::new(err))
    }
}
