//! The process-wide publish/subscribe event bus (§4.8).
//!
//! Despite the name in the original spec's component table, one
//! `EventStream` is scoped to a single `ActorSystem`, not to the whole OS
//! process — §9 Design Notes is explicit that "the process registry, event
//! stream, and dead-letter are per-`ActorSystem`... multiple systems may
//! coexist."

// Layer 1: Standard library imports
use std::any::{Any, TypeId};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use tracing::error;

type Handler = Arc<dyn Fn(&(dyn Any + Send + Sync)) + Send + Sync>;

struct EventStreamInner {
    subscribers: DashMap<TypeId, Vec<(u64, Handler)>>,
    next_id: AtomicU64,
}

/// A cheap-clone handle to the publish/subscribe bus. `subscribe<T>`
/// registers a handler for exactly one event type `T`; `publish` fans out
/// synchronously, in publish order, to every handler registered for the
/// published value's runtime type. A handler that panics is caught and
/// logged rather than poisoning delivery to the remaining subscribers.
#[derive(Clone)]
pub struct EventStream(Arc<EventStreamInner>);

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStream {
    pub fn new() -> Self {
        Self(Arc::new(EventStreamInner {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(0),
        }))
    }

    /// Register `handler` for every future `publish::<T>`. Returns a handle
    /// whose `unsubscribe()` removes it again.
    pub fn subscribe<T, F>(&self, handler: F) -> Subscription
    where
        T: Any + Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        let wrapped: Handler = Arc::new(move |event: &(dyn Any + Send + Sync)| {
            if let Some(typed) = event.downcast_ref::<T>() {
                handler(typed);
            }
        });
        self.0.subscribers.entry(type_id).or_default().push((id, wrapped));
        Subscription {
            stream: self.0.clone(),
            type_id,
            id,
        }
    }

    /// Fan `event` out to every handler subscribed to `T`. No ordering is
    /// guaranteed between concurrent publishers; subscribers see this
    /// publisher's own events in call order.
    pub fn publish<T: Any + Send + Sync + 'static>(&self, event: T) {
        let type_id = TypeId::of::<T>();
        let Some(handlers) = self.0.subscribers.get(&type_id) else {
            return;
        };
        let event: &(dyn Any + Send + Sync) = &event;
        for (_, handler) in handlers.iter() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                let message = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("<non-string panic payload>");
                error!(message, "event stream subscriber panicked");
            }
        }
    }

    /// Count of live subscriptions across every event type. Test/diagnostic use.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.iter().map(|entry| entry.value().len()).sum()
    }
}

/// A live subscription. Dropping it leaks the handler in place — call
/// [`Subscription::unsubscribe`] explicitly to stop delivery.
pub struct Subscription {
    stream: Arc<EventStreamInner>,
    type_id: TypeId,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(mut handlers) = self.stream.subscribers.get_mut(&self.type_id) {
            handlers.retain(|(id, _)| *id != self.id);
        }
    }
}
