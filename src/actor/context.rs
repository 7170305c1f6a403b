//! `ActorContext`: the handle an incarnation uses to talk back to the
//! runtime, plus the `SystemHandle` seam that decouples this module from
//! the not-yet-built registry/system layer (§4.2).

// Layer 1: Standard library imports
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

// Layer 3: Internal module imports
use super::lifecycle::ActorState;
use super::props::Props;
use super::traits::Actor;
use crate::futures::{ask, AskError, AskProcess};
use crate::mailbox::{Invoker, Mailbox, MailboxError};
use crate::message::{AutoRespond, Envelope, EnvelopeMeta, Failure, Message, StopReason, SystemMessage};
use crate::pid::{Address, Pid};
use crate::process::{DeadLetterEvent, Process};
use crate::supervisor::{Directive, Scope, SupervisionStrategy};
use crate::util::ProcessId;

/// Everything `ActorContext` needs from the process registry / event stream
/// / default-supervision layer, without depending on their concrete types.
///
/// Implemented by the `ActorSystem`/registry once those modules exist;
/// `ActorContext::spawn` only ever sees it as `Arc<dyn SystemHandle>`.
pub trait SystemHandle: Send + Sync {
    /// Mint a fresh, locally-unique process id.
    fn next_id(&self) -> ProcessId;

    /// Register a process handle under `id`, returning its `Pid`.
    fn register(&self, id: ProcessId, process: Arc<dyn Process>) -> Pid;

    /// Remove a process from the registry. Idempotent.
    fn unregister(&self, pid: &Pid);

    /// Resolve a `Pid` to a process handle, falling back to the
    /// dead-letter sink internally if it no longer resolves.
    fn resolve(&self, pid: &Pid) -> Arc<dyn Process>;

    /// Publish a dead-letter event on the system's event stream.
    fn publish_dead_letter(&self, event: DeadLetterEvent);

    /// Record that `id` has terminated, so a `watch` arriving after the
    /// fact can resolve immediately instead of going silent. Default is a
    /// no-op; `ProcessRegistry` backs this with a bounded tombstone map.
    fn record_termination(&self, _id: ProcessId, _reason: StopReason) {}

    /// Look up whether `id` names a recently-terminated local process, and
    /// why. Default always reports unknown.
    fn last_stop_reason(&self, _id: ProcessId) -> Option<StopReason> {
        None
    }

    /// The default `ask` timeout for this system.
    fn ask_deadline(&self) -> Duration;

    /// The strategy applied to root-level actors (no parent to escalate to).
    fn default_strategy(&self) -> Arc<dyn SupervisionStrategy>;
}

/// An internal marker that stops an actor once it reaches the front of the
/// user queue, without ever being handed to `Actor::receive`.
#[derive(Debug)]
struct PoisonPill;

struct ActorContextInner<A: Actor> {
    pid_cell: OnceLock<Pid>,
    parent: Option<Pid>,
    children: Mutex<Vec<Pid>>,
    watchers: Mutex<Vec<Pid>>,
    state: Mutex<ActorState>,
    mailbox: Mailbox,
    system: Arc<dyn SystemHandle>,
    stats: Mutex<crate::supervisor::RestartStatistics>,
    strategy: Arc<dyn SupervisionStrategy>,
    actor: Mutex<Option<A>>,
    props: Props<A>,
    generation: AtomicU64,
    timeout_epoch: AtomicU64,
    receive_timeout_duration: Mutex<Option<Duration>>,
    continuations: DashMap<u64, Box<dyn FnOnce(&mut A) + Send>>,
    continuation_counter: AtomicU64,
    current: Mutex<Option<EnvelopeMeta>>,
    self_weak: OnceLock<Weak<ActorContextInner<A>>>,
}

impl<A: Actor> fmt::Debug for ActorContextInner<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorContextInner")
            .field("pid", &self.pid_cell.get())
            .finish()
    }
}

impl<A: Actor> ActorContextInner<A> {
    fn pid(&self) -> Pid {
        self.pid_cell
            .get()
            .cloned()
            .unwrap_or_else(|| Pid::new(Address::local(), ProcessId::new()))
    }

    fn handle(&self) -> Option<ActorContext<A>> {
        self.self_weak
            .get()
            .and_then(Weak::upgrade)
            .map(|inner| ActorContext { inner })
    }

    fn rearm_receive_timeout(&self) {
        let Some(duration) = *self.receive_timeout_duration.lock() else {
            return;
        };
        let epoch = self.timeout_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = mailbox.post_system(SystemMessage::ReceiveTimeout { generation: epoch });
        });
    }

    /// Record a failure, suspend this incarnation, and escalate it to the
    /// parent supervisor (or the system's default strategy at the root).
    async fn fail(&self, reason: String) {
        self.stats.lock().record_failure();
        let _ = self.mailbox.post_system(SystemMessage::SuspendMailbox);

        let failure = Failure {
            child: self.pid(),
            reason,
            stats: self.stats.lock().clone(),
            offending_message: None,
        };

        match &self.parent {
            Some(parent) => {
                let process = self.system.resolve(parent);
                let _ = process
                    .deliver_system_message(SystemMessage::ChildFailure(failure))
                    .await;
            }
            None => {
                let strategy = self.system.default_strategy();
                let directive = strategy.handle_failure(&failure.child, &failure);
                apply_directive(&self.system, directive, failure.child.clone(), failure).await;
            }
        }
    }
}

/// Apply a supervision `Directive` to `target`, the failed process.
///
/// Shared between a supervisor handling `SystemMessage::ChildFailure` and
/// the root-level self-supervision path in [`ActorContextInner::fail`].
async fn apply_directive(
    system: &Arc<dyn SystemHandle>,
    directive: Directive,
    target: Pid,
    failure: Failure,
) {
    let process = system.resolve(&target);
    match directive {
        Directive::Resume => {
            let _ = process.deliver_system_message(SystemMessage::ResumeMailbox).await;
        }
        Directive::Restart { delay } => {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let _ = process
                .deliver_system_message(SystemMessage::Restart {
                    cause: Some(failure.reason.clone()),
                })
                .await;
            let _ = process.deliver_system_message(SystemMessage::ResumeMailbox).await;
        }
        Directive::Stop => {
            let _ = process.deliver_system_message(SystemMessage::Stop).await;
        }
        Directive::Escalate => {
            // Only reachable when a root-level default strategy itself
            // returns Escalate — there is no further parent, so the safest
            // fallback is to stop rather than drop the failure silently.
            tracing::warn!(%target, "escalate with no parent supervisor; stopping instead");
            let _ = process.deliver_system_message(SystemMessage::Stop).await;
        }
    }
}

#[async_trait]
impl<A: Actor> Process for ActorContextInner<A> {
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        self.mailbox.post_user(envelope)
    }

    async fn deliver_system_message(&self, message: SystemMessage) -> Result<(), MailboxError> {
        self.mailbox.post_system(message)
    }
}

#[async_trait]
impl<A: Actor> Invoker for ActorContextInner<A> {
    async fn invoke_system_message(&self, message: SystemMessage) -> Result<(), MailboxError> {
        match message {
            SystemMessage::Started => {
                if let Some(ctx) = self.handle() {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        if let Err(err) = actor.on_start(&ctx).await {
                            drop(guard);
                            self.fail(err.to_string()).await;
                        }
                    }
                }
                Ok(())
            }

            SystemMessage::Restart { cause } => {
                *self.state.lock() = ActorState::Restarting;
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.timeout_epoch.fetch_add(1, Ordering::AcqRel);
                self.continuations.clear();
                *self.actor.lock() = Some(self.props.produce());
                *self.state.lock() = ActorState::Alive;

                if let Some(ctx) = self.handle() {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        if let Err(err) = actor.on_restart(cause, &ctx).await {
                            drop(guard);
                            self.fail(err.to_string()).await;
                        }
                    }
                }
                Ok(())
            }

            SystemMessage::Stop => {
                *self.state.lock() = ActorState::Stopping;

                let children: Vec<Pid> = self.children.lock().clone();
                for child in children {
                    let process = self.system.resolve(&child);
                    let _ = process.deliver_system_message(SystemMessage::Stop).await;
                }

                if let Some(ctx) = self.handle() {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        let _ = actor.on_stop(&ctx).await;
                    }
                }

                *self.state.lock() = ActorState::Stopped;
                let pid = self.pid();
                self.system.unregister(&pid);
                self.system.record_termination(pid.id(), StopReason::Stopped);

                let watchers = self.watchers.lock().clone();
                for watcher in &watchers {
                    let process = self.system.resolve(watcher);
                    let _ = process
                        .deliver_system_message(SystemMessage::Terminated {
                            who: pid.clone(),
                            reason: StopReason::Stopped,
                        })
                        .await;
                }
                if let Some(parent) = &self.parent {
                    let process = self.system.resolve(parent);
                    let _ = process
                        .deliver_system_message(SystemMessage::Terminated {
                            who: pid,
                            reason: StopReason::Stopped,
                        })
                        .await;
                }

                self.mailbox.close();
                Ok(())
            }

            SystemMessage::Watch { watcher } => {
                let mut watchers = self.watchers.lock();
                if !watchers.contains(&watcher) {
                    watchers.push(watcher);
                }
                Ok(())
            }

            SystemMessage::Unwatch { watcher } => {
                self.watchers.lock().retain(|w| *w != watcher);
                Ok(())
            }

            SystemMessage::Terminated { who, reason } => {
                if let Some(ctx) = self.handle() {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        if let Err(err) = actor.on_terminated(who, reason, &ctx).await {
                            drop(guard);
                            self.fail(err.to_string()).await;
                        }
                    }
                }
                Ok(())
            }

            SystemMessage::ChildFailure(failure) => {
                let supervisor = self.pid();
                let directive = self.strategy.handle_failure(&supervisor, &failure);
                let targets: Vec<Pid> = if self.strategy.scope() == Scope::All {
                    self.children.lock().clone()
                } else {
                    vec![failure.child.clone()]
                };
                for target in targets {
                    apply_directive(&self.system, directive, target, failure.clone()).await;
                }
                Ok(())
            }

            SystemMessage::SuspendMailbox | SystemMessage::ResumeMailbox => {
                // The mailbox toggles its own `suspended` flag before
                // handing either variant to the invoker; nothing left to do.
                Ok(())
            }

            SystemMessage::ReceiveTimeout { generation } => {
                if generation != self.timeout_epoch.load(Ordering::Acquire) {
                    return Ok(());
                }
                if let Some(ctx) = self.handle() {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        if let Err(err) = actor.on_receive_timeout(&ctx).await {
                            drop(guard);
                            self.fail(err.to_string()).await;
                            return Ok(());
                        }
                    }
                }
                self.rearm_receive_timeout();
                Ok(())
            }

            SystemMessage::Continuation {
                generation,
                continuation_id,
            } => {
                if generation != self.generation.load(Ordering::Acquire) {
                    self.continuations.remove(&continuation_id);
                    return Ok(());
                }
                if let Some((_, continuation)) = self.continuations.remove(&continuation_id) {
                    let mut guard = self.actor.lock();
                    if let Some(actor) = guard.as_mut() {
                        continuation(actor);
                    }
                }
                Ok(())
            }
        }
    }

    async fn invoke_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if envelope.payload.as_any().downcast_ref::<PoisonPill>().is_some() {
            return self.mailbox.post_system(SystemMessage::Stop);
        }

        let (message, meta) = match envelope.downcast::<A::Message>() {
            Ok(pair) => pair,
            Err(original) => {
                self.system.publish_dead_letter(DeadLetterEvent {
                    target: self.pid(),
                    sender: original.sender.clone(),
                    message_type: original.message_type(),
                    timestamp: chrono::Utc::now(),
                });
                return Ok(());
            }
        };

        if !meta.not_influence_receive_timeout {
            self.rearm_receive_timeout();
        }
        *self.current.lock() = Some(meta);

        let result = match self.handle() {
            Some(ctx) => {
                let mut guard = self.actor.lock();
                match guard.as_mut() {
                    Some(actor) => actor.receive(message, &ctx).await,
                    None => Ok(()),
                }
            }
            None => Ok(()),
        };

        *self.current.lock() = None;
        if let Err(err) = result {
            self.fail(err.to_string()).await;
        }
        Ok(())
    }
}

/// A live actor incarnation's handle back into the runtime.
///
/// Cheap to clone — it's an `Arc` around the shared incarnation state. An
/// actor's own `receive`/lifecycle hooks are always called with a
/// reference to exactly this type.
pub struct ActorContext<A: Actor> {
    inner: Arc<ActorContextInner<A>>,
}

impl<A: Actor> Clone for ActorContext<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Actor> ActorContext<A> {
    /// Spawn a fresh incarnation under `system`, optionally as a child of
    /// `parent`, and return its `Pid`. Registers the process, wires the
    /// mailbox to this context, and delivers `Started`.
    pub fn spawn(system: Arc<dyn SystemHandle>, parent: Option<Pid>, props: Props<A>) -> Pid {
        let id = system.next_id();
        let mailbox = Mailbox::new(props.mailbox_capacity(), props.throughput());
        let actor = props.produce();

        let inner = Arc::new(ActorContextInner {
            pid_cell: OnceLock::new(),
            parent,
            children: Mutex::new(Vec::new()),
            watchers: Mutex::new(Vec::new()),
            state: Mutex::new(ActorState::Alive),
            mailbox: mailbox.clone(),
            system: system.clone(),
            stats: Mutex::new(crate::supervisor::RestartStatistics::new()),
            strategy: props.strategy(),
            actor: Mutex::new(Some(actor)),
            props,
            generation: AtomicU64::new(0),
            timeout_epoch: AtomicU64::new(0),
            receive_timeout_duration: Mutex::new(None),
            continuations: DashMap::new(),
            continuation_counter: AtomicU64::new(0),
            current: Mutex::new(None),
            self_weak: OnceLock::new(),
        });
        let _ = inner.self_weak.set(Arc::downgrade(&inner));

        let pid = system.register(id, inner.clone());
        let _ = inner.pid_cell.set(pid.clone());

        mailbox.start(inner.clone());
        let _ = mailbox.post_system(SystemMessage::Started);

        pid
    }

    /// This incarnation's own `Pid`.
    pub fn pid(&self) -> Pid {
        self.inner.pid()
    }

    /// The supervising parent, if this incarnation was spawned as a child.
    pub fn parent(&self) -> Option<Pid> {
        self.inner.parent.clone()
    }

    /// `Pid`s of children spawned via [`Self::spawn_child`].
    pub fn children(&self) -> Vec<Pid> {
        self.inner.children.lock().clone()
    }

    /// This incarnation's current lifecycle state.
    pub fn state(&self) -> ActorState {
        *self.inner.state.lock()
    }

    /// Fire-and-forget send to `target`.
    pub async fn send<M: Message>(&self, target: &Pid, message: M) {
        let envelope = Envelope::new(message).with_sender(self.pid());
        let process = self.inner.system.resolve(target);
        let _ = process.deliver_user_message(envelope).await;
    }

    /// Send to `target` with `reply_to` set to this actor, so `target` can
    /// route its answer back through an ordinary `receive`d message rather
    /// than a future.
    pub async fn request<M: Message>(&self, target: &Pid, message: M) {
        let envelope = Envelope::new(message)
            .with_sender(self.pid())
            .with_reply_to(self.pid());
        let process = self.inner.system.resolve(target);
        let _ = process.deliver_user_message(envelope).await;
    }

    /// Send to `target` and await a typed reply, using the system's
    /// default ask deadline.
    pub async fn ask<M: Message, R: Message>(&self, target: &Pid, message: M) -> Result<R, AskError> {
        let deadline = self.inner.system.ask_deadline();
        self.ask_within(target, message, deadline).await
    }

    /// Like [`Self::ask`] with an explicit deadline.
    pub async fn ask_within<M: Message, R: Message>(
        &self,
        target: &Pid,
        message: M,
        deadline: Duration,
    ) -> Result<R, AskError> {
        let (process, rx) = AskProcess::new();
        let ask_pid = Pid::with_handle(self.inner.system.next_id(), process);
        let envelope = Envelope::new(message).with_sender(self.pid());
        let system = self.inner.system.clone();
        let target = target.clone();

        ask(
            ask_pid,
            rx,
            move |envelope| {
                let system = system.clone();
                let target = target.clone();
                async move {
                    let process = system.resolve(&target);
                    process.deliver_user_message(envelope).await
                }
            },
            envelope,
            deadline,
        )
        .await
    }

    /// Reply to the sender/reply-to of the message currently being
    /// processed. A no-op (logged at debug) outside of `receive`'s scope or
    /// if the current message carried no sender.
    pub async fn respond<M: Message>(&self, message: M) {
        let target = {
            let current = self.inner.current.lock();
            current
                .as_ref()
                .and_then(|meta| meta.reply_to.clone().or_else(|| meta.sender.clone()))
        };
        match target {
            Some(target) => self.send(&target, message).await,
            None => debug!("respond() called with no reply-to/sender on the current message"),
        }
    }

    /// Convenience for [`AutoRespond`] payloads: builds and sends the
    /// automatic reply. Not invoked automatically — the actor's own
    /// `receive` calls this explicitly when it wants the behavior.
    pub async fn respond_auto<M: AutoRespond>(&self, message: &M) {
        self.respond(message.auto_reply()).await;
    }

    /// Redirect `message` to `target`, preserving the current message's
    /// original sender/reply-to rather than substituting this actor.
    pub async fn forward<M: Message>(&self, target: &Pid, message: M) {
        let (sender, reply_to) = {
            let current = self.inner.current.lock();
            match current.as_ref() {
                Some(meta) => (meta.sender.clone(), meta.reply_to.clone()),
                None => (None, None),
            }
        };
        let mut envelope = Envelope::new(message);
        if let Some(sender) = sender {
            envelope = envelope.with_sender(sender);
        }
        if let Some(reply_to) = reply_to {
            envelope = envelope.with_reply_to(reply_to);
        }
        let process = self.inner.system.resolve(target);
        let _ = process.deliver_user_message(envelope).await;
    }

    /// Spawn a child incarnation, recording it so it's stopped alongside
    /// this actor and included in `AllForOne` supervision.
    pub fn spawn_child<C: Actor>(&self, props: Props<C>) -> Pid {
        let child = ActorContext::<C>::spawn(self.inner.system.clone(), Some(self.pid()), props);
        self.inner.children.lock().push(child.clone());
        child
    }

    /// Register to receive `Terminated` when `target` dies. If `target`
    /// already terminated, `Terminated` is delivered immediately instead of
    /// being silently dropped by the dead-letter sink.
    pub async fn watch(&self, target: &Pid) {
        if let Some(reason) = self.inner.system.last_stop_reason(target.id()) {
            let watcher = self.inner.system.resolve(&self.pid());
            let _ = watcher
                .deliver_system_message(SystemMessage::Terminated {
                    who: target.clone(),
                    reason,
                })
                .await;
            return;
        }
        let process = self.inner.system.resolve(target);
        let _ = process
            .deliver_system_message(SystemMessage::Watch { watcher: self.pid() })
            .await;
    }

    /// Stop watching `target`.
    pub async fn unwatch(&self, target: &Pid) {
        let process = self.inner.system.resolve(target);
        let _ = process
            .deliver_system_message(SystemMessage::Unwatch { watcher: self.pid() })
            .await;
    }

    /// Request an immediate stop of `target`.
    pub async fn stop(&self, target: &Pid) {
        let process = self.inner.system.resolve(target);
        let _ = process.deliver_system_message(SystemMessage::Stop).await;
    }

    /// Request this incarnation's own stop.
    pub async fn stop_self(&self) {
        self.stop(&self.pid()).await;
    }

    /// Queue a `PoisonPill` behind `target`'s already-pending user
    /// messages: it stops only once it reaches the front of the queue, and
    /// is never delivered to the actor's `receive`.
    pub async fn poison(&self, target: &Pid) {
        let envelope = Envelope::new(PoisonPill).with_sender(self.pid());
        let process = self.inner.system.resolve(target);
        let _ = process.deliver_user_message(envelope).await;
    }

    /// Arm (or rearm) a receive-timeout: `on_receive_timeout` fires if no
    /// qualifying user message arrives within `duration`.
    pub fn set_receive_timeout(&self, duration: Duration) {
        *self.inner.receive_timeout_duration.lock() = Some(duration);
        self.inner.rearm_receive_timeout();
    }

    /// Disarm the receive-timeout.
    pub fn cancel_receive_timeout(&self) {
        *self.inner.receive_timeout_duration.lock() = None;
        self.inner.timeout_epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Await `future` off the mailbox's dispatch loop, then apply
    /// `continuation` to the actor on its own mailbox thread once it
    /// resolves. Dropped silently if this incarnation has since been
    /// replaced by a restart.
    pub fn reenter_after<T, Fut, F>(&self, future: Fut, continuation: F)
    where
        T: Send + 'static,
        Fut: std::future::Future<Output = T> + Send + 'static,
        F: FnOnce(&mut A, T) + Send + 'static,
    {
        let inner = self.inner.clone();
        let generation = inner.generation.load(Ordering::Acquire);
        let continuation_id = inner.continuation_counter.fetch_add(1, Ordering::AcqRel);
        tokio::spawn(async move {
            let value = future.await;
            let boxed: Box<dyn FnOnce(&mut A) + Send> = Box::new(move |actor: &mut A| continuation(actor, value));
            inner.continuations.insert(continuation_id, boxed);
            let _ = inner
                .mailbox
                .post_system(SystemMessage::Continuation { generation, continuation_id });
        });
    }
}
