//! `ActorSystem`: process-wide lifecycle owner (§6 External Interfaces).
//!
//! Created with configuration, optionally enriched with a cluster identity
//! layer, started by spawning the root guardian, and torn down by stopping
//! it (cascade-stops all actors).

// Layer 1: Standard library imports
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tracing::{debug, info};

// Layer 3: Internal module imports
use super::config::SystemConfig;
use super::errors::SystemError;
use crate::actor::{Actor, ActorContext, Props, SystemHandle};
use crate::cluster::{ClusterContext, MembershipProvider};
use crate::events::EventStream;
use crate::message::{Envelope, Message, SystemMessage};
use crate::pid::Pid;
use crate::registry::ProcessRegistry;
use crate::supervisor::OneForOne;

/// The root guardian has no user-facing message: its only job is to be the
/// parent every top-level `spawn` attaches to, so `SystemMessage::Stop`
/// cascades to the whole tree in one delivery.
#[derive(Debug)]
enum NoMessage {}

struct RootGuardian;

impl std::fmt::Debug for RootGuardian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootGuardian").finish()
    }
}

#[async_trait]
impl Actor for RootGuardian {
    type Message = NoMessage;
    type Error = Infallible;

    async fn receive(&mut self, message: NoMessage, _ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        match message {}
    }
}

/// Deferred cluster construction: the builder needs a fully-assembled
/// `SystemHandle` and `EventStream` (both only known once `build` runs)
/// before it can hand back a `ClusterContext`, so it passes a closure
/// rather than a half-built value.
pub(super) type ClusterFactory =
    Box<dyn FnOnce(Arc<dyn SystemHandle>, &SystemConfig, EventStream) -> ClusterContext>;

/// Owns the process registry, event stream, and (optionally) cluster
/// identity layer for one runtime. Multiple systems may coexist in one OS
/// process (§9 Design Notes).
pub struct ActorSystem {
    config: SystemConfig,
    registry: Arc<ProcessRegistry>,
    events: EventStream,
    cluster: Option<ClusterContext>,
    membership: Option<Arc<dyn MembershipProvider>>,
    root: Pid,
    shutting_down: AtomicBool,
}

impl std::fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorSystem")
            .field("process_count", &self.registry.process_count())
            .field("has_cluster", &self.cluster.is_some())
            .finish()
    }
}

impl ActorSystem {
    /// Construct a system with no cluster identity layer, remote transport,
    /// or custom wiring. Use [`super::builder::SystemBuilder`] for those.
    pub fn new(config: SystemConfig) -> Arc<Self> {
        Self::build(config, None, None, None)
    }

    pub(super) fn build(
        config: SystemConfig,
        remote_handler: Option<Arc<dyn crate::registry::RemoteHandler>>,
        cluster_factory: Option<ClusterFactory>,
        membership: Option<Arc<dyn MembershipProvider>>,
    ) -> Arc<Self> {
        let registry = ProcessRegistry::new(config.actor_request_timeout, Arc::new(OneForOne));
        if let Some(remote_handler) = remote_handler {
            registry.set_remote_handler(remote_handler);
        }
        let events = EventStream::new();
        let handle: Arc<dyn SystemHandle> = registry.clone();

        let root_props = Props::from_producer(|| RootGuardian);
        let root = ActorContext::spawn(handle.clone(), None, root_props);

        let cluster = cluster_factory.map(|factory| factory(handle.clone(), &config, events.clone()));

        info!(process_count = registry.process_count(), "actor system started");

        Arc::new(Self {
            config,
            registry,
            events,
            cluster,
            membership,
            root,
            shutting_down: AtomicBool::new(false),
        })
    }

    /// Apply the membership provider's current topology to the cluster
    /// identity layer. A no-op on a system built without a cluster. Call
    /// once after construction (the join step of process-wide lifecycle)
    /// and again whenever the membership provider observes a change.
    pub async fn join(&self) {
        if let (Some(cluster), Some(membership)) = (&self.cluster, &self.membership) {
            cluster.apply_topology((*membership.current()).clone()).await;
        }
    }

    /// This system's configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// The `SystemHandle` every `ActorContext::spawn` in this system is
    /// driven through.
    pub fn handle(&self) -> Arc<dyn SystemHandle> {
        self.registry.clone()
    }

    /// This system's event stream.
    pub fn events(&self) -> &EventStream {
        &self.events
    }

    /// The cluster identity layer, if this system was built with one.
    pub fn cluster(&self) -> Option<&ClusterContext> {
        self.cluster.as_ref()
    }

    /// The root guardian's `Pid` — every `spawn`ed actor's ultimate ancestor.
    pub fn root(&self) -> Pid {
        self.root.clone()
    }

    /// Number of processes currently registered (actors, routers,
    /// partitions, in-flight asks — everything with a `Pid`).
    pub fn process_count(&self) -> usize {
        self.registry.process_count()
    }

    /// The most recent dead-letter events recorded by this system, oldest
    /// first.
    pub fn recent_dead_letters(&self) -> Vec<crate::process::DeadLetterEvent> {
        self.registry.recent_dead_letters()
    }

    /// Spawn a top-level actor as a child of the root guardian.
    pub fn spawn<A: Actor>(&self, props: Props<A>) -> Pid {
        ActorContext::spawn(self.handle(), Some(self.root.clone()), props)
    }

    /// Fire-and-forget send from outside the actor tree (e.g. test setup,
    /// an external driver). Prefer `ActorContext::send` from within an actor.
    pub async fn tell<M: Message>(&self, target: &Pid, message: M) {
        let process = self.registry.resolve(target);
        let _ = process.deliver_user_message(Envelope::new(message)).await;
    }

    /// Stop the root guardian (cascading to every actor in the tree), wait
    /// out the configured grace period, then — if a cluster is configured
    /// and `exit_on_shutdown` is set — exit the process.
    pub async fn shutdown(&self) -> Result<(), SystemError> {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return Err(SystemError::ShuttingDown);
        }

        debug!("actor system shutdown initiated");
        let root = self.registry.resolve(&self.root);
        let _ = root.deliver_system_message(SystemMessage::Stop).await;
        tokio::time::sleep(self.config.shutdown_grace_period).await;

        if self.cluster.is_some() && self.config.exit_on_shutdown {
            info!("exiting process after cluster shutdown");
            std::process::exit(0);
        }

        Ok(())
    }
}
