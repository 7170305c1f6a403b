//! `SystemBuilder`: fluent composition of config, remote transport, and an
//! optional cluster identity layer into one [`ActorSystem`] (§6 External
//! Interfaces, §4.7).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::actor_system::{ActorSystem, ClusterFactory};
use super::config::SystemConfig;
use crate::cluster::{Activator, BlockList, ClusterContext, MembershipProvider, PartitionIdentityActor};
use crate::registry::RemoteHandler;

struct PendingActivator {
    kind: String,
    activator: Arc<dyn Activator>,
}

/// Builds an [`ActorSystem`], optionally wiring in remote transport and a
/// cluster identity layer.
///
/// # Examples
///
/// ```rust,ignore
/// use nexusrt::system::SystemBuilder;
/// use nexusrt::SystemConfig;
///
/// let system = SystemBuilder::new(SystemConfig::default())
///     .with_cluster("member-1", membership_provider)
///     .with_activator("player", player_activator)
///     .build();
/// ```
pub struct SystemBuilder {
    config: SystemConfig,
    remote_handler: Option<Arc<dyn RemoteHandler>>,
    cluster: Option<(String, Arc<dyn MembershipProvider>)>,
    activators: Vec<PendingActivator>,
}

impl SystemBuilder {
    /// Start building a system from the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            remote_handler: None,
            cluster: None,
            activators: Vec::new(),
        }
    }

    /// Install a transport for delivering to processes outside this system.
    pub fn with_remote_handler(mut self, handler: Arc<dyn RemoteHandler>) -> Self {
        self.remote_handler = Some(handler);
        self
    }

    /// Enable the cluster identity layer, identifying this process as
    /// `self_member_id` within the topology `membership` observes.
    pub fn with_cluster(mut self, self_member_id: impl Into<String>, membership: Arc<dyn MembershipProvider>) -> Self {
        self.cluster = Some((self_member_id.into(), membership));
        self
    }

    /// Register this member as an owner of `kind`, activating new
    /// incarnations via `activator`. Requires [`Self::with_cluster`].
    pub fn with_activator(mut self, kind: impl Into<String>, activator: Arc<dyn Activator>) -> Self {
        self.activators.push(PendingActivator { kind: kind.into(), activator });
        self
    }

    /// Assemble the configured [`ActorSystem`].
    ///
    /// Activators registered without [`Self::with_cluster`] are silently
    /// ignored — there is no topology for them to own a partition of. Call
    /// [`ActorSystem::join`] after construction to apply the membership
    /// provider's current topology.
    pub fn build(self) -> Arc<ActorSystem> {
        let activators = self.activators;
        let request_timeout = self.config.actor_request_timeout;
        let max_attempts = self.config.cluster_request_attempts;
        let pid_cache_capacity = self.config.pid_cache_capacity;
        let blocked_member_duration = self.config.blocked_member_duration;

        let membership = self.cluster.as_ref().map(|(_, membership)| membership.clone());
        let cluster_factory: Option<ClusterFactory> = self.cluster.map(|(self_member_id, _membership)| {
            Box::new(
                move |handle: Arc<dyn crate::actor::SystemHandle>, _config: &SystemConfig, events: crate::events::EventStream| {
                    let cache = crate::cluster::PidCache::new(pid_cache_capacity);
                    let block_list = BlockList::new(blocked_member_duration);
                    let context = ClusterContext::new(
                        handle.clone(),
                        self_member_id,
                        events,
                        cache,
                        block_list,
                        request_timeout,
                        max_attempts,
                    );

                    for pending in activators {
                        let partition = PartitionIdentityActor::new(pending.activator, handle.clone());
                        context.register_partition(pending.kind, partition);
                    }

                    context
                },
            ) as ClusterFactory
        });

        ActorSystem::build(self.config, self.remote_handler, cluster_factory, membership)
    }
}
