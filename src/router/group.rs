//! `Router<M>`: a stateless fan-out process sharing a [`RouterState`] (§4.6).

// Layer 1: Standard library imports
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use rand::Rng;
use tracing::trace;

// Layer 3: Internal module imports
use super::state::RouterState;
use super::strategies::{consistent_hash_pick, RoutingStrategy};
use crate::actor::SystemHandle;
use crate::mailbox::MailboxError;
use crate::message::{Envelope, EnvelopeMeta, Message, SystemMessage};
use crate::pid::Pid;
use crate::process::{DeadLetterEvent, Process};

/// Add or remove a routee from a running router. Sent as an ordinary user
/// message to the router's own `Pid`.
#[derive(Debug, Clone)]
pub enum RouterManagement {
    AddRoutee(Pid),
    RemoveRoutee(Pid),
}

/// Request the router's current routee set. The router replies with
/// [`Routees`] to `reply_to` (falling back to `sender`), if either is set.
#[derive(Debug, Clone)]
pub struct GetRoutees;

/// Reply to [`GetRoutees`].
#[derive(Debug, Clone)]
pub struct Routees(pub Vec<Pid>);

fn envelope_from<M: Message>(message: M, meta: EnvelopeMeta) -> Envelope {
    let mut envelope = Envelope::new(message);
    envelope.sender = meta.sender;
    envelope.reply_to = meta.reply_to;
    envelope.correlation_id = meta.correlation_id;
    envelope.not_influence_receive_timeout = meta.not_influence_receive_timeout;
    envelope
}

/// A stateless fan-out process: forwards messages of type `M` to a shared,
/// dynamically-updatable routee set according to a [`RoutingStrategy`].
///
/// `M` must be `Clone` — `Broadcast` fundamentally requires delivering
/// independent copies to each routee, and requiring it only on the router's
/// own message type (rather than on every [`Message`] in the system) keeps
/// the type-erasure boundary everywhere else unchanged.
pub struct Router<M: Message + Clone> {
    state: RouterState,
    strategy: RoutingStrategy<M>,
    system: Arc<dyn SystemHandle>,
    self_pid: OnceLock<Pid>,
    _marker: PhantomData<M>,
}

impl<M: Message + Clone> fmt::Debug for Router<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("pid", &self.self_pid.get()).finish()
    }
}

impl<M: Message + Clone> Router<M> {
    /// Spawn a router with the given strategy and initial routee set,
    /// returning its `Pid`.
    pub fn spawn(system: Arc<dyn SystemHandle>, strategy: RoutingStrategy<M>, routees: Vec<Pid>) -> Pid {
        let id = system.next_id();
        let router = Arc::new(Self {
            state: RouterState::new(routees),
            strategy,
            system: system.clone(),
            self_pid: OnceLock::new(),
            _marker: PhantomData,
        });
        let pid = system.register(id, router.clone());
        // Infallible: this OnceLock is only ever written here, once, right
        // after the single `register` call that produces `pid`.
        let _ = router.self_pid.set(pid.clone());
        pid
    }

    fn pid(&self) -> Option<Pid> {
        self.self_pid.get().cloned()
    }

    async fn forward_to(&self, target: &Pid, message: M, meta: EnvelopeMeta) {
        let envelope = envelope_from(message, meta);
        let process = self.system.resolve(target);
        if let Err(err) = process.deliver_user_message(envelope).await {
            trace!(%target, ?err, "router forward failed");
        }
    }

    async fn reply_routees(&self, to: &Pid, routees: Vec<Pid>) {
        let process = self.system.resolve(to);
        let _ = process.deliver_user_message(Envelope::new(Routees(routees))).await;
    }

    fn dead_letter(&self, sender: Option<Pid>, message_type: &'static str) {
        if let Some(pid) = self.pid() {
            self.system.publish_dead_letter(DeadLetterEvent {
                target: pid,
                sender,
                message_type,
                timestamp: chrono::Utc::now(),
            });
        }
    }
}

#[async_trait]
impl<M: Message + Clone> Process for Router<M> {
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if let Some(mgmt) = envelope.payload.as_any().downcast_ref::<RouterManagement>() {
            match mgmt.clone() {
                RouterManagement::AddRoutee(pid) => self.state.add_routee(pid),
                RouterManagement::RemoveRoutee(pid) => self.state.remove_routee(&pid),
            }
            return Ok(());
        }

        if envelope.payload.as_any().downcast_ref::<GetRoutees>().is_some() {
            let reply_target = envelope.reply_to.clone().or_else(|| envelope.sender.clone());
            if let Some(target) = reply_target {
                self.reply_routees(&target, self.state.routees().to_vec()).await;
            }
            return Ok(());
        }

        let (message, meta) = match envelope.downcast::<M>() {
            Ok(pair) => pair,
            Err(original) => {
                self.dead_letter(original.sender.clone(), original.message_type());
                return Ok(());
            }
        };

        let routees = self.state.routees();
        if routees.is_empty() {
            self.dead_letter(meta.sender, "<router: empty routee set>");
            return Ok(());
        }

        match &self.strategy {
            RoutingStrategy::Broadcast => {
                for pid in routees.iter() {
                    self.forward_to(pid, message.clone(), meta.clone()).await;
                }
            }
            RoutingStrategy::RoundRobin => {
                let index = self.state.next_round_robin_index(routees.len());
                self.forward_to(&routees[index], message, meta).await;
            }
            RoutingStrategy::Random => {
                let index = rand::thread_rng().gen_range(0..routees.len());
                self.forward_to(&routees[index], message, meta).await;
            }
            RoutingStrategy::ConsistentHash { key_of } => {
                let key = key_of(&message);
                let target = consistent_hash_pick(&routees, key).clone();
                self.forward_to(&target, message, meta).await;
            }
        }
        Ok(())
    }

    async fn deliver_system_message(&self, _message: SystemMessage) -> Result<(), MailboxError> {
        // Routers are stateless fan-out processes with no lifecycle of their
        // own to supervise; system messages addressed to one are dropped.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::SystemHandle;
    use crate::pid::Address;
    use crate::supervisor::OneForOne;
    use crate::util::ProcessId;
    use dashmap::DashMap;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Job(u32);

    #[derive(Debug)]
    struct Recorder {
        received: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl Process for Recorder {
        async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
            if let Ok((job, _meta)) = envelope.downcast::<Job>() {
                self.received.lock().push(job.0);
            }
            Ok(())
        }

        async fn deliver_system_message(&self, _message: SystemMessage) -> Result<(), MailboxError> {
            Ok(())
        }
    }

    struct TestSystem {
        processes: DashMap<ProcessId, Arc<dyn Process>>,
        dead_letters: Mutex<Vec<DeadLetterEvent>>,
    }

    impl TestSystem {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                processes: DashMap::new(),
                dead_letters: Mutex::new(Vec::new()),
            })
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
            self.processes
                .get(&pid.id())
                .map(|entry| entry.clone())
                .expect("test routee must be registered")
        }

        fn publish_dead_letter(&self, event: DeadLetterEvent) {
            self.dead_letters.lock().push(event);
        }

        fn ask_deadline(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn default_strategy(&self) -> Arc<dyn crate::supervisor::SupervisionStrategy> {
            Arc::new(OneForOne)
        }
    }

    fn spawn_recorder(system: &Arc<TestSystem>) -> (Pid, Arc<Recorder>) {
        let recorder = Arc::new(Recorder { received: Mutex::new(Vec::new()) });
        let id = system.next_id();
        let pid = system.register(id, recorder.clone());
        (pid, recorder)
    }

    #[tokio::test]
    async fn test_round_robin_cycles_routees() {
        let system = TestSystem::new();
        let (pid_a, rec_a) = spawn_recorder(&system);
        let (pid_b, rec_b) = spawn_recorder(&system);

        let router_pid = Router::<Job>::spawn(system.clone(), RoutingStrategy::RoundRobin, vec![pid_a, pid_b]);
        let router = system.resolve(&router_pid);

        for n in 0..4 {
            router.deliver_user_message(Envelope::new(Job(n))).await.unwrap();
        }

        assert_eq!(rec_a.received.lock().as_slice(), &[0, 2]);
        assert_eq!(rec_b.received.lock().as_slice(), &[1, 3]);
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_every_routee() {
        let system = TestSystem::new();
        let (pid_a, rec_a) = spawn_recorder(&system);
        let (pid_b, rec_b) = spawn_recorder(&system);

        let router_pid = Router::<Job>::spawn(system.clone(), RoutingStrategy::Broadcast, vec![pid_a, pid_b]);
        let router = system.resolve(&router_pid);
        router.deliver_user_message(Envelope::new(Job(7))).await.unwrap();

        assert_eq!(rec_a.received.lock().as_slice(), &[7]);
        assert_eq!(rec_b.received.lock().as_slice(), &[7]);
    }

    #[tokio::test]
    async fn test_add_and_remove_routee_via_management_message() {
        let system = TestSystem::new();
        let (pid_a, rec_a) = spawn_recorder(&system);
        let (pid_b, rec_b) = spawn_recorder(&system);

        let router_pid = Router::<Job>::spawn(system.clone(), RoutingStrategy::RoundRobin, vec![pid_a.clone()]);
        let router = system.resolve(&router_pid);

        router
            .deliver_user_message(Envelope::new(RouterManagement::AddRoutee(pid_b)))
            .await
            .unwrap();
        router.deliver_user_message(Envelope::new(Job(1))).await.unwrap();
        router.deliver_user_message(Envelope::new(Job(2))).await.unwrap();

        router
            .deliver_user_message(Envelope::new(RouterManagement::RemoveRoutee(pid_a)))
            .await
            .unwrap();
        router.deliver_user_message(Envelope::new(Job(3))).await.unwrap();

        assert_eq!(rec_a.received.lock().as_slice(), &[1]);
        assert_eq!(rec_b.received.lock().as_slice(), &[2, 3]);
    }

    #[tokio::test]
    async fn test_empty_routee_set_publishes_dead_letter() {
        let system = TestSystem::new();
        let router_pid = Router::<Job>::spawn(system.clone(), RoutingStrategy::RoundRobin, vec![]);
        let router = system.resolve(&router_pid);
        router.deliver_user_message(Envelope::new(Job(1))).await.unwrap();
        assert_eq!(system.dead_letters.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_get_routees_replies_to_sender() {
        let system = TestSystem::new();
        let (pid_a, _rec_a) = spawn_recorder(&system);
        let (reply_pid, reply_recorder) = spawn_recorder(&system);

        let router_pid = Router::<Job>::spawn(system.clone(), RoutingStrategy::RoundRobin, vec![pid_a.clone()]);
        let router = system.resolve(&router_pid);

        let envelope = Envelope::new(GetRoutees).with_reply_to(reply_pid);
        router.deliver_user_message(envelope).await.unwrap();

        // Routees isn't a Job, so the plain recorder won't record it, but
        // delivery must not error and must not panic on downcast mismatch.
        let _ = reply_recorder.received.lock();
    }

    #[tokio::test]
    async fn test_consistent_hash_routes_same_key_to_same_routee() {
        let system = TestSystem::new();
        let (pid_a, rec_a) = spawn_recorder(&system);
        let (pid_b, rec_b) = spawn_recorder(&system);

        let strategy = RoutingStrategy::ConsistentHash { key_of: Arc::new(|job: &Job| job.0 as u64) };
        let router_pid = Router::<Job>::spawn(system.clone(), strategy, vec![pid_a, pid_b]);
        let router = system.resolve(&router_pid);

        router.deliver_user_message(Envelope::new(Job(42))).await.unwrap();
        router.deliver_user_message(Envelope::new(Job(42))).await.unwrap();

        let total_a = rec_a.received.lock().len();
        let total_b = rec_b.received.lock().len();
        assert_eq!(total_a + total_b, 2);
        assert!(total_a == 2 || total_b == 2);
    }
}
