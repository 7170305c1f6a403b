//! `Props`: the immutable recipe a `Pid` is spawned from (§3 Data Model).

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::traits::Actor;
use crate::mailbox::MailboxCapacity;
use crate::supervisor::{OneForOne, SupervisionStrategy};

const DEFAULT_THROUGHPUT: usize = 300;
const DEFAULT_START_DEADLINE: Duration = Duration::from_secs(5);

/// A function that produces a fresh actor instance — called once at spawn
/// time and again on every restart.
pub type Producer<A> = Arc<dyn Fn() -> A + Send + Sync>;

/// The immutable recipe `ActorSystem::spawn`/`ActorContext::spawn` consume
/// to create a `Pid`.
///
/// Cloning a `Props` is cheap (everything inside is already `Arc`-shared);
/// the same `Props` value can be used to spawn any number of independent
/// incarnations.
pub struct Props<A: Actor> {
    producer: Producer<A>,
    mailbox_capacity: MailboxCapacity,
    throughput: usize,
    strategy: Arc<dyn SupervisionStrategy>,
    start_deadline: Duration,
}

impl<A: Actor> Clone for Props<A> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
            mailbox_capacity: self.mailbox_capacity,
            throughput: self.throughput,
            strategy: self.strategy.clone(),
            start_deadline: self.start_deadline,
        }
    }
}

impl<A: Actor> Props<A> {
    /// Build a `Props` from a producer function, with the runtime's
    /// defaults: unbounded mailbox, `OneForOne` supervision, a 5 second
    /// start deadline.
    pub fn from_producer<F>(producer: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
            mailbox_capacity: MailboxCapacity::Unbounded,
            throughput: DEFAULT_THROUGHPUT,
            strategy: Arc::new(OneForOne),
            start_deadline: DEFAULT_START_DEADLINE,
        }
    }

    /// Override the mailbox capacity.
    pub fn with_mailbox_capacity(mut self, capacity: MailboxCapacity) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Override the per-run user-message throughput.
    pub fn with_throughput(mut self, throughput: usize) -> Self {
        self.throughput = throughput;
        self
    }

    /// Override the supervision strategy applied to this actor's failures.
    pub fn with_strategy(mut self, strategy: Arc<dyn SupervisionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Override the start deadline (see §4.2's throttled start-deadline warning).
    pub fn with_start_deadline(mut self, deadline: Duration) -> Self {
        self.start_deadline = deadline;
        self
    }

    /// Produce a fresh actor instance.
    pub fn produce(&self) -> A {
        (self.producer)()
    }

    /// The configured mailbox capacity.
    pub fn mailbox_capacity(&self) -> MailboxCapacity {
        self.mailbox_capacity
    }

    /// The configured per-run throughput.
    pub fn throughput(&self) -> usize {
        self.throughput
    }

    /// The configured supervision strategy.
    pub fn strategy(&self) -> Arc<dyn SupervisionStrategy> {
        self.strategy.clone()
    }

    /// The configured start deadline.
    pub fn start_deadline(&self) -> Duration {
        self.start_deadline
    }
}
