//! Lifecycle events published during a run.

use chrono::{DateTime, Utc};
use std::fmt;

/// Discriminant used to subscribe to a class of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    /// Published before any endpoint is allocated.
    BeforeStart,
    /// Published once every endpoint in the topology has an address.
    AfterEndpointsAllocated,
}

impl LifecycleEventKind {
    /// Returns the canonical event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeStart => "before_start",
            Self::AfterEndpointsAllocated => "after_endpoints_allocated",
        }
    }
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Lifecycle event delivered to subscribed handlers.
///
/// Events carry no resource-specific context. Handlers query the registry
/// they were constructed with when the event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The run is about to allocate endpoints.
    BeforeStart {
        /// Time the run started.
        at: DateTime<Utc>,
    },
    /// Endpoint allocation has settled.
    AfterEndpointsAllocated {
        /// Time allocation completed.
        allocated_at: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> LifecycleEventKind {
        match self {
            Self::BeforeStart { .. } => LifecycleEventKind::BeforeStart,
            Self::AfterEndpointsAllocated { .. } => LifecycleEventKind::AfterEndpointsAllocated,
        }
    }
}
