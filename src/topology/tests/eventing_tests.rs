//! Unit tests for the in-memory lifecycle event bus.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::topology::{
    adapters::memory::InMemoryEventBus,
    domain::{LifecycleEvent, LifecycleEventKind},
    ports::{Delivery, EventError, EventResult, Eventing, LifecycleEventHandler},
};
use async_trait::async_trait;
use chrono::Utc;

#[derive(Default)]
struct CountingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl LifecycleEventHandler for CountingHandler {
    async fn handle(&self, _event: &LifecycleEvent) -> EventResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct OrderedHandler {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl LifecycleEventHandler for OrderedHandler {
    async fn handle(&self, _event: &LifecycleEvent) -> EventResult<()> {
        self.log.lock().expect("log lock").push(self.label);
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl LifecycleEventHandler for FailingHandler {
    async fn handle(&self, event: &LifecycleEvent) -> EventResult<()> {
        Err(EventError::handler(
            event.kind(),
            std::io::Error::other("disk full"),
        ))
    }
}

fn allocated() -> LifecycleEvent {
    LifecycleEvent::AfterEndpointsAllocated {
        allocated_at: Utc::now(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn one_shot_handler_runs_once() {
    let bus = InMemoryEventBus::new();
    let handler = Arc::new(CountingHandler::default());
    bus.subscribe(
        LifecycleEventKind::AfterEndpointsAllocated,
        Delivery::Once,
        handler.clone(),
    )
    .expect("subscription succeeds");

    assert_eq!(bus.publish(allocated()).await.expect("first publish"), 1);
    assert_eq!(bus.publish(allocated()).await.expect("second publish"), 0);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_handler_runs_on_every_publish() {
    let bus = InMemoryEventBus::new();
    let handler = Arc::new(CountingHandler::default());
    bus.subscribe(
        LifecycleEventKind::AfterEndpointsAllocated,
        Delivery::EveryPublish,
        handler.clone(),
    )
    .expect("subscription succeeds");

    bus.publish(allocated()).await.expect("first publish");
    bus.publish(allocated()).await.expect("second publish");
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn handlers_only_receive_their_event_kind() {
    let bus = InMemoryEventBus::new();
    let handler = Arc::new(CountingHandler::default());
    bus.subscribe(
        LifecycleEventKind::AfterEndpointsAllocated,
        Delivery::Once,
        handler.clone(),
    )
    .expect("subscription succeeds");

    let delivered = bus
        .publish(LifecycleEvent::BeforeStart { at: Utc::now() })
        .await
        .expect("publish succeeds");

    assert_eq!(delivered, 0);
    assert_eq!(
        bus.subscription_count(LifecycleEventKind::AfterEndpointsAllocated)
            .expect("count succeeds"),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn handlers_run_in_subscription_order() {
    let bus = InMemoryEventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for label in ["first", "second", "third"] {
        bus.subscribe(
            LifecycleEventKind::AfterEndpointsAllocated,
            Delivery::EveryPublish,
            Arc::new(OrderedHandler {
                label,
                log: Arc::clone(&log),
            }),
        )
        .expect("subscription succeeds");
    }

    bus.publish(allocated()).await.expect("publish succeeds");
    assert_eq!(*log.lock().expect("log lock"), ["first", "second", "third"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn first_failing_handler_stops_dispatch() {
    let bus = InMemoryEventBus::new();
    let after = Arc::new(CountingHandler::default());
    bus.subscribe(
        LifecycleEventKind::AfterEndpointsAllocated,
        Delivery::EveryPublish,
        Arc::new(FailingHandler),
    )
    .expect("subscription succeeds");
    bus.subscribe(
        LifecycleEventKind::AfterEndpointsAllocated,
        Delivery::EveryPublish,
        after.clone(),
    )
    .expect("subscription succeeds");

    let result = bus.publish(allocated()).await;

    assert!(matches!(result, Err(EventError::Handler { .. })));
    assert_eq!(after.calls.load(Ordering::SeqCst), 0);
}
