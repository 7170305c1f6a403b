//! `ClusterContext`: the public send-path entry point for virtual actors
//! (§4.7) and the local half of the topology-change protocol.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::RwLock;

// Layer 3: Internal module imports
use super::block_list::BlockList;
use super::error::ClusterError;
use super::identity::{partition_process_id, ClusterIdentity};
use super::partition::{ActivationRequest, ActivationResponse, PartitionIdentityActor};
use super::pid_cache::PidCache;
use super::topology::{Topology, TopologyApplied};
use crate::actor::SystemHandle;
use crate::events::EventStream;
use crate::futures::ask::{ask, AskError, AskProcess};
use crate::message::{Envelope, Message};
use crate::pid::{Address, Pid};

/// How long a displaced activation is given to drain before it is stopped
/// after a topology change moves its identity off this member.
const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(250);

/// Owns the pieces a member needs to act as both a requester of virtual
/// actors (cache, retry loop) and an owner of them (local partitions,
/// topology-driven directory pruning).
pub struct ClusterContext {
    system: Arc<dyn SystemHandle>,
    cache: PidCache,
    topology: RwLock<Arc<Topology>>,
    block_list: BlockList,
    partitions_owned: DashMap<String, Arc<PartitionIdentityActor>>,
    events: EventStream,
    self_member_id: String,
    request_timeout: Duration,
    max_attempts: u32,
    quiescence: Duration,
}

impl ClusterContext {
    pub fn new(
        system: Arc<dyn SystemHandle>,
        self_member_id: impl Into<String>,
        events: EventStream,
        cache: PidCache,
        block_list: BlockList,
        request_timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            system,
            cache,
            topology: RwLock::new(Arc::new(Topology::new(0, Vec::new()))),
            block_list,
            partitions_owned: DashMap::new(),
            events,
            self_member_id: self_member_id.into(),
            request_timeout,
            max_attempts: max_attempts.max(1),
            quiescence: DEFAULT_QUIESCENCE,
        }
    }

    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.quiescence = quiescence;
        self
    }

    pub fn topology(&self) -> Arc<Topology> {
        self.topology.read().clone()
    }

    /// Register this member as the owner of `kind`, backed by `partition`.
    /// The partition is registered under a well-known id so every member
    /// addresses it the same way, local or remote.
    pub fn register_partition(&self, kind: impl Into<String>, partition: Arc<PartitionIdentityActor>) {
        let kind = kind.into();
        self.system.register(partition_process_id(&kind), partition.clone());
        self.partitions_owned.insert(kind, partition);
    }

    /// Apply a new topology snapshot: prune directory entries this member no
    /// longer owns, schedule their local activations for a graceful stop
    /// after a quiescence delay, then publish [`TopologyApplied`].
    pub async fn apply_topology(&self, topology: Topology) {
        let topology = Arc::new(topology);
        *self.topology.write() = topology.clone();

        for entry in self.partitions_owned.iter() {
            let partition = entry.value().clone();
            let displaced = partition.retain_owned(&topology, &self.self_member_id);
            for (identity, pid) in displaced {
                self.cache.invalidate(&identity);
                let system = self.system.clone();
                let quiescence = self.quiescence;
                tokio::spawn(async move {
                    tokio::time::sleep(quiescence).await;
                    let process = system.resolve(&pid);
                    let _ = process.deliver_system_message(crate::message::SystemMessage::Stop).await;
                });
            }
        }

        self.events.publish(TopologyApplied(topology.version));
    }

    /// Resolve `identity`'s owning partition (local or remote) and ask it to
    /// activate, without touching the cache.
    async fn activate(&self, identity: &ClusterIdentity) -> Result<Pid, ClusterError> {
        let topology = self.topology.read().clone();
        let owner = topology
            .owner_of(identity)
            .cloned()
            .ok_or_else(|| ClusterError::IdentityUnavailable(identity.clone()))?;

        if self.block_list.is_blocked(&owner.id) {
            return Err(ClusterError::MemberBlocked(owner.id));
        }

        let address = if owner.id == self.self_member_id {
            Address::local()
        } else {
            Address::remote(format!("{}:{}", owner.host, owner.port))
        };
        let partition_pid = Pid::new(address, partition_process_id(&identity.kind));

        let (ask_process, rx) = AskProcess::new();
        let ask_id = self.system.next_id();
        let ask_pid = self.system.register(ask_id, ask_process);

        let system = self.system.clone();
        let target = partition_pid.clone();
        let post = move |envelope: Envelope| {
            let system = system.clone();
            let target = target.clone();
            async move { system.resolve(&target).deliver_user_message(envelope).await }
        };

        let envelope = Envelope::new(ActivationRequest { identity: identity.clone() });
        let result: Result<ActivationResponse, AskError> =
            ask(ask_pid.clone(), rx, post, envelope, self.request_timeout).await;
        self.system.unregister(&ask_pid);

        result.map(|response| response.pid).map_err(|_| ClusterError::IdentityUnavailable(identity.clone()))
    }

    /// Resolve `identity` to a `Pid`, activating it (local or remote) on a
    /// cache miss.
    async fn resolve(&self, identity: &ClusterIdentity) -> Result<Pid, ClusterError> {
        if let Some(pid) = self.cache.get(identity) {
            return Ok(pid);
        }
        let pid = self.activate(identity).await?;
        self.cache.insert(identity.clone(), pid.clone());
        Ok(pid)
    }

    /// Send `message` to the virtual actor backing `identity` and await a
    /// typed reply within `deadline`, retrying transient failures (stale
    /// cache entry, dead-letter, timeout) up to this context's configured
    /// attempt limit.
    pub async fn request<M, R>(&self, identity: ClusterIdentity, message: M, deadline: Duration) -> Result<R, ClusterError>
    where
        M: Message + Clone,
        R: Message,
    {
        let mut last_error = ClusterError::IdentityUnavailable(identity.clone());

        for _attempt in 0..self.max_attempts {
            let pid = match self.resolve(&identity).await {
                Ok(pid) => pid,
                Err(err) => {
                    last_error = err;
                    continue;
                }
            };

            let (ask_process, rx) = AskProcess::new();
            let ask_id = self.system.next_id();
            let ask_pid = self.system.register(ask_id, ask_process);

            let system = self.system.clone();
            let target = pid.clone();
            let post = move |envelope: Envelope| {
                let system = system.clone();
                let target = target.clone();
                async move { system.resolve(&target).deliver_user_message(envelope).await }
            };

            let envelope = Envelope::new(message.clone());
            let result: Result<R, AskError> = ask(ask_pid.clone(), rx, post, envelope, deadline).await;
            self.system.unregister(&ask_pid);

            match result {
                Ok(reply) => return Ok(reply),
                Err(AskError::TypeMismatch) => {
                    return Err(ClusterError::IdentityUnavailable(identity.clone()));
                }
                Err(AskError::DeadLetter | AskError::Timeout | AskError::Cancelled) => {
                    self.cache.invalidate(&identity);
                    last_error = ClusterError::IdentityUnavailable(identity.clone());
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::identity::Activator;
    use crate::cluster::member::Member;
    use crate::mailbox::MailboxError;
    use crate::message::SystemMessage;
    use crate::process::{DeadLetterEvent, DeadLetterProcess, Process};
    use crate::supervisor::{OneForOne, SupervisionStrategy};
    use crate::util::ProcessId;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::num::NonZeroUsize;

    #[derive(Debug, Clone)]
    struct Ping(u32);

    #[derive(Debug, Clone)]
    struct Pong(u32);

    struct Echo {
        system: Arc<dyn SystemHandle>,
    }

    impl std::fmt::Debug for Echo {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Echo").finish()
        }
    }

    #[async_trait]
    impl Process for Echo {
        async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
            if let Ok((ping, meta)) = envelope.downcast::<Ping>() {
                if let Some(target) = meta.reply_to.or(meta.sender) {
                    let process = self.system.resolve(&target);
                    let _ = process.deliver_user_message(Envelope::new(Pong(ping.0))).await;
                }
            }
            Ok(())
        }
        async fn deliver_system_message(&self, _message: SystemMessage) -> Result<(), MailboxError> {
            Ok(())
        }
    }

    struct EchoActivator;

    #[async_trait]
    impl Activator for EchoActivator {
        async fn activate(&self, _identity: &ClusterIdentity, system: &Arc<dyn SystemHandle>) -> Pid {
            let id = system.next_id();
            system.register(id, Arc::new(Echo { system: system.clone() }))
        }
    }

    struct TestSystem {
        processes: DashMap<ProcessId, Arc<dyn Process>>,
    }

    impl TestSystem {
        fn new() -> Arc<Self> {
            Arc::new(Self { processes: DashMap::new() })
        }
    }

    impl SystemHandle for TestSystem {
        fn next_id(&self) -> ProcessId {
            ProcessId::new()
        }
        fn register(&self, id: ProcessId, process: Arc<dyn Process>) -> Pid {
            self.processes.insert(id, process.clone());
            Pid::with_handle(id, process)
        }
        fn unregister(&self, pid: &Pid) {
            self.processes.remove(&pid.id());
        }
        fn resolve(&self, pid: &Pid) -> Arc<dyn Process> {
            if let Some(cached) = pid.cached() {
                return cached;
            }
            self.processes.get(&pid.id()).map(|e| e.clone()).expect("test pid must be registered")
        }
        fn publish_dead_letter(&self, _event: DeadLetterEvent) {}
        fn ask_deadline(&self) -> Duration {
            Duration::from_secs(1)
        }
        fn default_strategy(&self) -> Arc<dyn SupervisionStrategy> {
            Arc::new(OneForOne)
        }
    }

    fn local_member(id: &str, kind: &str) -> Member {
        Member::new(id, "host", 9000, HashSet::from([kind.to_string()]))
    }

    fn context_with_owned_partition(system: Arc<TestSystem>) -> ClusterContext {
        let events = EventStream::new();
        let cache = PidCache::new(NonZeroUsize::new(16).unwrap());
        let block_list = BlockList::new(Duration::from_secs(3600));
        let ctx = ClusterContext::new(
            system.clone(),
            "local",
            events,
            cache,
            block_list,
            Duration::from_secs(1),
            3,
        );

        let partition = PartitionIdentityActor::new(Arc::new(EchoActivator), system.clone() as Arc<dyn SystemHandle>);
        ctx.register_partition("player", partition);
        ctx
    }

    #[tokio::test]
    async fn test_request_activates_and_replies() {
        let system = TestSystem::new();
        let ctx = context_with_owned_partition(system.clone());

        let topology = Topology::new(1, vec![local_member("local", "player")]);
        ctx.apply_topology(topology).await;

        let identity = ClusterIdentity::new("player", "alice");
        let reply: Pong = ctx.request(identity, Ping(7), Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply.0, 7);
    }

    #[tokio::test]
    async fn test_request_caches_pid_across_calls() {
        let system = TestSystem::new();
        let ctx = context_with_owned_partition(system.clone());
        let topology = Topology::new(1, vec![local_member("local", "player")]);
        ctx.apply_topology(topology).await;

        let identity = ClusterIdentity::new("player", "alice");
        ctx.request::<_, Pong>(identity.clone(), Ping(1), Duration::from_secs(1)).await.unwrap();
        assert!(ctx.cache.get(&identity).is_some());
        ctx.request::<_, Pong>(identity.clone(), Ping(2), Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_request_fails_when_kind_unowned() {
        let system = TestSystem::new();
        let ctx = context_with_owned_partition(system.clone());
        let topology = Topology::new(1, vec![local_member("local", "guild")]);
        ctx.apply_topology(topology).await;

        let identity = ClusterIdentity::new("player", "alice");
        let result: Result<Pong, ClusterError> = ctx.request(identity, Ping(1), Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ClusterError::IdentityUnavailable(_))));
    }

    #[tokio::test]
    async fn test_request_fails_when_member_blocked() {
        let system = TestSystem::new();
        let ctx = context_with_owned_partition(system.clone());
        let topology = Topology::new(1, vec![local_member("local", "player")]);
        ctx.apply_topology(topology).await;
        ctx.block_list.block("local");

        let identity = ClusterIdentity::new("player", "alice");
        let result: Result<Pong, ClusterError> = ctx.request(identity, Ping(1), Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ClusterError::MemberBlocked(_))));
    }

    #[tokio::test]
    async fn test_apply_topology_prunes_displaced_identities() {
        let system = TestSystem::new();
        let ctx = context_with_owned_partition(system.clone());
        let topology = Topology::new(1, vec![local_member("local", "player")]);
        ctx.apply_topology(topology).await;

        let identity = ClusterIdentity::new("player", "alice");
        ctx.request::<_, Pong>(identity.clone(), Ping(1), Duration::from_secs(1)).await.unwrap();
        assert!(ctx.cache.get(&identity).is_some());

        let next_topology = Topology::new(2, vec![local_member("other", "player")]);
        ctx.apply_topology(next_topology).await;
        assert!(ctx.cache.get(&identity).is_none());
    }
}
