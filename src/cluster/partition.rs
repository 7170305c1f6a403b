//! `PartitionIdentityActor`: the authoritative activation directory for the
//! identities a member owns in the current topology generation (§4.7).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;

// Layer 3: Internal module imports
use super::identity::{Activator, ClusterIdentity};
use super::topology::Topology;
use crate::actor::SystemHandle;
use crate::mailbox::MailboxError;
use crate::message::{Envelope, SystemMessage};
use crate::pid::Pid;
use crate::process::Process;

/// Ask the owning partition to resolve (activating if necessary) `identity`.
#[derive(Debug, Clone)]
pub struct ActivationRequest {
    pub identity: ClusterIdentity,
}

/// Reply to [`ActivationRequest`].
#[derive(Debug, Clone)]
pub struct ActivationResponse {
    pub identity: ClusterIdentity,
    pub pid: Pid,
}

/// Forget a directory entry — sent when a topology change moves ownership
/// of `identity` off this member.
#[derive(Debug, Clone)]
pub struct ForgetIdentity {
    pub identity: ClusterIdentity,
}

/// Serializes activation for the identities this member currently owns and
/// keeps an authoritative `identity -> Pid` map for the running topology
/// generation. One instance per cluster kind.
pub struct PartitionIdentityActor {
    directory: DashMap<ClusterIdentity, Pid>,
    locks: DashMap<ClusterIdentity, Arc<AsyncMutex<()>>>,
    generation: AtomicU64,
    activator: Arc<dyn Activator>,
    system: Arc<dyn SystemHandle>,
}

impl std::fmt::Debug for PartitionIdentityActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionIdentityActor")
            .field("directory_len", &self.directory.len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl PartitionIdentityActor {
    pub fn new(activator: Arc<dyn Activator>, system: Arc<dyn SystemHandle>) -> Arc<Self> {
        Arc::new(Self {
            directory: DashMap::new(),
            locks: DashMap::new(),
            generation: AtomicU64::new(0),
            activator,
            system,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    pub fn advance_generation(&self, version: u64) {
        self.generation.store(version, Ordering::Relaxed);
    }

    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    fn identity_lock(&self, identity: &ClusterIdentity) -> Arc<AsyncMutex<()>> {
        self.locks.entry(identity.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Resolve `identity`, activating it locally on first use. Concurrent
    /// calls for the same identity collapse onto one activation.
    pub async fn resolve(&self, identity: &ClusterIdentity) -> Pid {
        if let Some(existing) = self.directory.get(identity) {
            return existing.clone();
        }
        let lock = self.identity_lock(identity);
        let _guard = lock.lock().await;
        if let Some(existing) = self.directory.get(identity) {
            return existing.clone();
        }
        let pid = self.activator.activate(identity, &self.system).await;
        self.directory.insert(identity.clone(), pid.clone());
        pid
    }

    pub fn forget(&self, identity: &ClusterIdentity) {
        self.directory.remove(identity);
        self.locks.remove(identity);
    }

    /// Drop every directory entry `topology` no longer assigns to
    /// `self_member_id`, returning the `(identity, Pid)` pairs that moved so
    /// the caller can quiesce their local activations.
    pub fn retain_owned(&self, topology: &Topology, self_member_id: &str) -> Vec<(ClusterIdentity, Pid)> {
        let mut displaced = Vec::new();
        self.directory.retain(|identity, pid| {
            let still_owned =
                topology.owner_of(identity).map(|member| member.id == self_member_id).unwrap_or(false);
            if !still_owned {
                displaced.push((identity.clone(), pid.clone()));
            }
            still_owned
        });
        for (identity, _) in &displaced {
            self.locks.remove(identity);
        }
        displaced
    }
}

#[async_trait]
impl Process for PartitionIdentityActor {
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if let Ok((forget, _meta)) = envelope.downcast::<ForgetIdentity>() {
            self.forget(&forget.identity);
            return Ok(());
        }

        let (request, meta) = match envelope.downcast::<ActivationRequest>() {
            Ok(pair) => pair,
            Err(_) => return Ok(()),
        };

        let pid = self.resolve(&request.identity).await;
        let reply_target = meta.reply_to.or(meta.sender);
        if let Some(target) = reply_target {
            let process = self.system.resolve(&target);
            let response = ActivationResponse { identity: request.identity, pid };
            let _ = process.deliver_user_message(Envelope::new(response)).await;
        }
        Ok(())
    }

    async fn deliver_system_message(&self, _message: SystemMessage) -> Result<(), MailboxError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::Address;
    use crate::process::{DeadLetterEvent, DeadLetterProcess};
    use crate::supervisor::{OneForOne, SupervisionStrategy};
    use crate::util::ProcessId;
    use std::time::Duration;

    struct NoopActivator;

    #[async_trait]
    impl Activator for NoopActivator {
        async fn activate(&self, _identity: &ClusterIdentity, system: &Arc<dyn SystemHandle>) -> Pid {
            let id = system.next_id();
            system.register(id, Arc::new(DeadLetterProcess::silent()))
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

    #[tokio::test]
    async fn test_resolve_activates_once_and_caches() {
        let system = TestSystem::new();
        let partition = PartitionIdentityActor::new(Arc::new(NoopActivator), system.clone());
        let identity = ClusterIdentity::new("player", "alice");

        let first = partition.resolve(&identity).await;
        let second = partition.resolve(&identity).await;
        assert_eq!(first, second);
        assert_eq!(partition.directory_len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolve_collapses_to_one_activation() {
        let system = TestSystem::new();
        let partition = PartitionIdentityActor::new(Arc::new(NoopActivator), system.clone());
        let identity = ClusterIdentity::new("player", "alice");

        let (a, b) = tokio::join!(partition.resolve(&identity), partition.resolve(&identity));
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_forget_removes_directory_entry() {
        let system = TestSystem::new();
        let partition = PartitionIdentityActor::new(Arc::new(NoopActivator), system.clone());
        let identity = ClusterIdentity::new("player", "alice");
        partition.resolve(&identity).await;
        partition.forget(&identity);
        assert_eq!(partition.directory_len(), 0);
    }

    #[tokio::test]
    async fn test_activation_request_replies_with_response() {
        let system = TestSystem::new();
        let partition = PartitionIdentityActor::new(Arc::new(NoopActivator), system.clone());
        let partition_id = system.next_id();
        let partition_pid = system.register(partition_id, partition.clone());

        let reply_id = system.next_id();
        let reply = Arc::new(DeadLetterProcess::silent());
        let reply_pid = system.register(reply_id, reply);

        let identity = ClusterIdentity::new("player", "alice");
        let request = Envelope::new(ActivationRequest { identity }).with_reply_to(reply_pid);
        let process = system.resolve(&partition_pid);
        process.deliver_user_message(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_retain_owned_drops_entries_no_longer_owned_here() {
        use super::super::member::Member;
        use super::super::topology::Topology;
        use std::collections::HashSet;

        let system = TestSystem::new();
        let partition = PartitionIdentityActor::new(Arc::new(NoopActivator), system.clone());
        let identity = ClusterIdentity::new("player", "alice");
        partition.resolve(&identity).await;
        assert_eq!(partition.directory_len(), 1);

        let topology = Topology::new(
            2,
            vec![Member::new("other-member", "host", 9000, HashSet::from(["player".to_string()]))],
        );
        let displaced = partition.retain_owned(&topology, "this-member");
        assert_eq!(displaced.len(), 1);
        assert_eq!(displaced[0].0, identity);
        assert_eq!(partition.directory_len(), 0);
    }
}
