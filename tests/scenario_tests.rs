//! End-to-end scenario tests, one per named case: ask-echo, restart resets
//! state, poison-pill ordering, watch-after-termination, cluster
//! activation, and topology-change cache invalidation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use nexusrt::{
    Activator, Actor, ActorContext, ClusterIdentity, Envelope, MailboxError, Member, MembershipProvider, Pid,
    Process, Props, SystemBuilder, SystemConfig, SystemMessage, Topology,
};

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

// ---------------------------------------------------------------------
// Scenario 1: Ask-echo
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Echo(String);

struct EchoActor;

impl fmt::Debug for EchoActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EchoActor").finish()
    }
}

#[async_trait]
impl Actor for EchoActor {
    type Message = Echo;
    type Error = Infallible;

    async fn receive(&mut self, message: Echo, ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        ctx.respond(message).await;
        Ok(())
    }
}

#[derive(Debug)]
struct Kickoff;

struct AskDriver {
    target: Pid,
    result: Arc<Mutex<Option<String>>>,
}

impl fmt::Debug for AskDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskDriver").finish()
    }
}

#[async_trait]
impl Actor for AskDriver {
    type Message = Kickoff;
    type Error = Infallible;

    async fn receive(&mut self, _message: Kickoff, ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        let reply: Echo = ctx.ask(&self.target, Echo("hi".to_string())).await.expect("ask should succeed");
        *self.result.lock() = Some(reply.0);
        Ok(())
    }
}

#[tokio::test]
async fn ask_echo_returns_same_payload() {
    let config = SystemConfig::builder().with_actor_request_timeout(Duration::from_secs(1)).build().unwrap();
    let system = nexusrt::ActorSystem::new(config);

    let target = system.spawn(Props::from_producer(|| EchoActor));
    let result = Arc::new(Mutex::new(None));
    let driver = system.spawn(Props::from_producer({
        let result = result.clone();
        move || AskDriver { target: target.clone(), result: result.clone() }
    }));
    system.tell(&driver, Kickoff).await;

    settle().await;
    assert_eq!(result.lock().as_deref(), Some("hi"));
}

// ---------------------------------------------------------------------
// Scenario 2: Restart resets state
// ---------------------------------------------------------------------

#[derive(Debug)]
struct Bump;

#[derive(Debug)]
struct ThresholdExceeded;

impl fmt::Display for ThresholdExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "threshold exceeded")
    }
}

impl std::error::Error for ThresholdExceeded {}

struct RestartingCounter {
    count: u32,
    threshold: u32,
    observed: Arc<AtomicU32>,
    restarts: Arc<AtomicUsize>,
}

impl fmt::Debug for RestartingCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartingCounter").field("count", &self.count).finish()
    }
}

#[async_trait]
impl Actor for RestartingCounter {
    type Message = Bump;
    type Error = ThresholdExceeded;

    async fn receive(&mut self, _message: Bump, _ctx: &ActorContext<Self>) -> Result<(), ThresholdExceeded> {
        if self.count >= self.threshold {
            return Err(ThresholdExceeded);
        }
        self.count += 1;
        self.observed.store(self.count, Ordering::SeqCst);
        Ok(())
    }

    async fn on_restart(&mut self, _cause: Option<String>, _ctx: &ActorContext<Self>) -> Result<(), ThresholdExceeded> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        self.observed.store(self.count, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn restart_resets_actor_state() {
    let system = nexusrt::ActorSystem::new(SystemConfig::default());
    let observed = Arc::new(AtomicU32::new(0));
    let restarts = Arc::new(AtomicUsize::new(0));

    let pid = system.spawn(Props::from_producer({
        let observed = observed.clone();
        let restarts = restarts.clone();
        move || RestartingCounter {
            count: 0,
            threshold: 2,
            observed: observed.clone(),
            restarts: restarts.clone(),
        }
    }));

    system.tell(&pid, Bump).await;
    system.tell(&pid, Bump).await;
    settle().await;
    assert_eq!(observed.load(Ordering::SeqCst), 2);

    // Third message exceeds the threshold, triggering one-for-one restart
    // under the root guardian's default strategy.
    system.tell(&pid, Bump).await;
    settle().await;

    assert_eq!(restarts.load(Ordering::SeqCst), 1);
    assert_eq!(observed.load(Ordering::SeqCst), 0);

    system.tell(&pid, Bump).await;
    settle().await;
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------
// Scenario 3: PoisonPill ordering
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Tagged(&'static str);

struct Recorder {
    seen: Arc<Mutex<Vec<&'static str>>>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder").finish()
    }
}

#[async_trait]
impl Actor for Recorder {
    type Message = Tagged;
    type Error = Infallible;

    async fn receive(&mut self, message: Tagged, _ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        self.seen.lock().push(message.0);
        Ok(())
    }
}

#[derive(Debug)]
struct RunSequence;

struct Sequencer {
    target: Pid,
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer").finish()
    }
}

#[async_trait]
impl Actor for Sequencer {
    type Message = RunSequence;
    type Error = Infallible;

    async fn receive(&mut self, _message: RunSequence, ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        ctx.send(&self.target, Tagged("A")).await;
        ctx.send(&self.target, Tagged("B")).await;
        ctx.poison(&self.target).await;
        ctx.send(&self.target, Tagged("C")).await;
        Ok(())
    }
}

#[tokio::test]
async fn poison_pill_stops_before_trailing_message() {
    let system = nexusrt::ActorSystem::new(SystemConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let target = system.spawn(Props::from_producer({
        let seen = seen.clone();
        move || Recorder { seen: seen.clone() }
    }));
    let sequencer = system.spawn(Props::from_producer(move || Sequencer { target: target.clone() }));
    system.tell(&sequencer, RunSequence).await;

    settle().await;

    assert_eq!(*seen.lock(), vec!["A", "B"]);
    let dead_letters = system.recent_dead_letters();
    assert!(dead_letters.iter().any(|event| event.message_type.contains("Tagged")));
}

// ---------------------------------------------------------------------
// Scenario 4: Watch after termination
// ---------------------------------------------------------------------

#[derive(Debug)]
struct Die;

struct Mortal;

impl fmt::Debug for Mortal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mortal").finish()
    }
}

#[async_trait]
impl Actor for Mortal {
    type Message = Die;
    type Error = Infallible;

    async fn receive(&mut self, _message: Die, ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        ctx.stop_self().await;
        Ok(())
    }
}

#[derive(Debug)]
struct WatchNow;

struct LateWatcher {
    target: Pid,
    terminated: Arc<Mutex<Option<nexusrt::StopReason>>>,
}

impl fmt::Debug for LateWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LateWatcher").finish()
    }
}

#[async_trait]
impl Actor for LateWatcher {
    type Message = WatchNow;
    type Error = Infallible;

    async fn receive(&mut self, _message: WatchNow, ctx: &ActorContext<Self>) -> Result<(), Infallible> {
        ctx.watch(&self.target).await;
        Ok(())
    }

    async fn on_terminated(
        &mut self,
        _who: Pid,
        reason: nexusrt::StopReason,
        _ctx: &ActorContext<Self>,
    ) -> Result<(), Infallible> {
        *self.terminated.lock() = Some(reason);
        Ok(())
    }
}

#[tokio::test]
async fn watch_after_termination_yields_immediate_terminated() {
    let system = nexusrt::ActorSystem::new(SystemConfig::default());

    let target = system.spawn(Props::from_producer(|| Mortal));
    system.tell(&target, Die).await;
    settle().await;

    let terminated = Arc::new(Mutex::new(None));
    let watcher = system.spawn(Props::from_producer({
        let terminated = terminated.clone();
        move || LateWatcher { target: target.clone(), terminated: terminated.clone() }
    }));
    system.tell(&watcher, WatchNow).await;
    settle().await;

    assert_eq!(*terminated.lock(), Some(nexusrt::StopReason::Stopped));
}

// ---------------------------------------------------------------------
// Scenarios 5 & 6: Cluster activation, topology-change invalidates cache
// ---------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Ping(u32);

#[derive(Debug, Clone)]
struct Pong(u32);

struct EchoProcess {
    system: Arc<dyn nexusrt::SystemHandle>,
}

impl fmt::Debug for EchoProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EchoProcess").finish()
    }
}

#[async_trait]
impl Process for EchoProcess {
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

struct CountingActivator(Arc<AtomicUsize>);

#[async_trait]
impl Activator for CountingActivator {
    async fn activate(&self, _identity: &ClusterIdentity, system: &Arc<dyn nexusrt::SystemHandle>) -> Pid {
        self.0.fetch_add(1, Ordering::SeqCst);
        let id = system.next_id();
        system.register(id, Arc::new(EchoProcess { system: system.clone() }))
    }
}

struct StaticMembership(Mutex<Arc<Topology>>);

impl MembershipProvider for StaticMembership {
    fn current(&self) -> Arc<Topology> {
        self.0.lock().clone()
    }
}

fn member(id: &str, kind: &str) -> Member {
    Member::new(id, "localhost", 9000, HashSet::from([kind.to_string()]))
}

#[tokio::test]
async fn cluster_activation_caches_across_calls() {
    let topology = Arc::new(Topology::new(1, vec![member("self", "echo")]));
    let membership = Arc::new(StaticMembership(Mutex::new(topology)));
    let activations = Arc::new(AtomicUsize::new(0));

    let system = SystemBuilder::new(SystemConfig::default())
        .with_cluster("self", membership)
        .with_activator("echo", Arc::new(CountingActivator(activations.clone())))
        .build();
    system.join().await;

    let cluster = system.cluster().expect("cluster configured");
    let identity = ClusterIdentity::new("echo", "k1");

    let first: Pong = cluster.request(identity.clone(), Ping(1), Duration::from_secs(1)).await.unwrap();
    assert_eq!(first.0, 1);
    assert_eq!(activations.load(Ordering::SeqCst), 1);

    let second: Pong = cluster.request(identity, Ping(2), Duration::from_secs(1)).await.unwrap();
    assert_eq!(second.0, 2);
    assert_eq!(activations.load(Ordering::SeqCst), 1, "second call must reuse the cached pid");
}

#[tokio::test]
async fn topology_change_invalidates_cached_identity() {
    let topology = Arc::new(Topology::new(1, vec![member("self", "echo")]));
    let membership = Arc::new(StaticMembership(Mutex::new(topology)));
    let activations = Arc::new(AtomicUsize::new(0));

    let system = SystemBuilder::new(SystemConfig::default())
        .with_cluster("self", membership)
        .with_activator("echo", Arc::new(CountingActivator(activations.clone())))
        .build();
    system.join().await;

    let cluster = system.cluster().expect("cluster configured");
    let identity = ClusterIdentity::new("echo", "k1");

    let _: Pong = cluster.request(identity.clone(), Ping(1), Duration::from_secs(1)).await.unwrap();
    assert_eq!(activations.load(Ordering::SeqCst), 1);

    // Reassign "echo" away from "self"; the cached pid for k1 is no longer
    // valid once the new topology is applied.
    let reassigned = Topology::new(2, vec![member("other", "echo")]);
    cluster.apply_topology(reassigned).await;

    let result: Result<Pong, nexusrt::ClusterError> =
        cluster.request(identity, Ping(2), Duration::from_millis(200)).await;
    assert!(result.is_err(), "k1 is no longer owned locally and has no other member to activate on");
}
