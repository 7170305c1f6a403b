//! The dual-queue, single-consumer mailbox dispatcher (§4.1).

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::error::MailboxError;
use super::traits::{BoxedFuture, Dispatcher, Invoker, MailboxCapacity, TokioDispatcher};
use crate::message::{Envelope, SystemMessage};

const DEFAULT_THROUGHPUT: usize = 300;

struct Queues {
    system: Mutex<VecDeque<SystemMessage>>,
    user: Mutex<VecDeque<Envelope>>,
}

/// Two FIFO queues, a run-exclusion flag, and a suspension flag (§3 Data Model).
///
/// `Mailbox` owns no actor state. It drives an [`Invoker`] (the
/// `ActorContext`, in practice) one message at a time, strictly preferring
/// system messages, and never runs two dispatch loops concurrently — the
/// `running` flag is the exclusion token referenced throughout §5.
pub struct Mailbox {
    queues: Arc<Queues>,
    running: Arc<AtomicBool>,
    suspended: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    capacity: MailboxCapacity,
    throughput: usize,
    handlers: Arc<OnceLock<(Arc<dyn Invoker>, Arc<dyn Dispatcher>)>>,
}

impl Clone for Mailbox {
    fn clone(&self) -> Self {
        Self {
            queues: self.queues.clone(),
            running: self.running.clone(),
            suspended: self.suspended.clone(),
            closed: self.closed.clone(),
            capacity: self.capacity,
            throughput: self.throughput,
            handlers: self.handlers.clone(),
        }
    }
}

impl Mailbox {
    /// Create an unbounded mailbox with the default throughput.
    pub fn unbounded() -> Self {
        Self::new(MailboxCapacity::Unbounded, DEFAULT_THROUGHPUT)
    }

    /// Create a mailbox with explicit capacity and per-run user-message
    /// throughput (the `Throughput` runtime configuration option, §6).
    pub fn new(capacity: MailboxCapacity, throughput: usize) -> Self {
        Self {
            queues: Arc::new(Queues {
                system: Mutex::new(VecDeque::new()),
                user: Mutex::new(VecDeque::new()),
            }),
            running: Arc::new(AtomicBool::new(false)),
            suspended: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            capacity,
            throughput,
            handlers: Arc::new(OnceLock::new()),
        }
    }

    /// Wire the mailbox to its invoker and dispatcher. Must be called
    /// before the first `post_*`/`start` — subsequent calls are ignored.
    pub fn register_handlers(&self, invoker: Arc<dyn Invoker>, dispatcher: Arc<dyn Dispatcher>) {
        let _ = self.handlers.set((invoker, dispatcher));
    }

    /// Convenience: register handlers with the default Tokio dispatcher.
    pub fn start(&self, invoker: Arc<dyn Invoker>) {
        self.register_handlers(invoker, Arc::new(TokioDispatcher));
    }

    /// Enqueue a system message and attempt to schedule a run.
    pub fn post_system(&self, message: SystemMessage) -> Result<(), MailboxError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MailboxError::Closed);
        }
        self.queues.system.lock().push_back(message);
        self.schedule();
        Ok(())
    }

    /// Enqueue a user message and attempt to schedule a run. Bounded
    /// mailboxes reject with `MailboxFull` rather than applying
    /// backpressure — per §4.1, backpressure is externalized.
    pub fn post_user(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MailboxError::Closed);
        }
        let mut user = self.queues.user.lock();
        if let MailboxCapacity::Bounded(capacity) = self.capacity {
            if user.len() >= capacity {
                return Err(MailboxError::Full { capacity });
            }
        }
        user.push_back(envelope);
        drop(user);
        self.schedule();
        Ok(())
    }

    /// Mark the mailbox closed: further posts fail, but an in-flight run
    /// is allowed to drain what it already has.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Step 2 of §4.1's `schedule` algorithm: atomically claim the single
    /// consumer slot, handing off to the dispatcher only on success.
    fn schedule(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // An in-flight dispatcher will pick this up when it next checks
            // the queues before releasing `running`.
            return;
        }

        let Some((invoker, dispatcher)) = self.handlers.get().cloned() else {
            // No invoker registered yet; release the slot so the next post
            // (after registration) can schedule.
            self.running.store(false, Ordering::Release);
            return;
        };

        let this = self.clone();
        let fut: BoxedFuture = Box::pin(async move {
            this.run(invoker).await;
        });
        dispatcher.dispatch(fut);
    }

    /// Step 3/§4.1's `run` algorithm: the single consumer loop.
    async fn run(&self, invoker: Arc<dyn Invoker>) {
        loop {
            let mut faulted = false;

            // Drain system queue unconditionally; toggles suspended flag.
            loop {
                let next = self.queues.system.lock().pop_front();
                let Some(message) = next else { break };
                let toggles_suspend = matches!(
                    message,
                    SystemMessage::SuspendMailbox | SystemMessage::ResumeMailbox
                );
                if toggles_suspend {
                    match message {
                        SystemMessage::SuspendMailbox => {
                            self.suspended.store(true, Ordering::Release)
                        }
                        SystemMessage::ResumeMailbox => {
                            self.suspended.store(false, Ordering::Release)
                        }
                        _ => unreachable!(),
                    }
                }
                if let Err(err) = invoker.invoke_system_message(message).await {
                    warn!(error = %err, "system message handler faulted");
                    faulted = true;
                    break;
                }
            }

            if !faulted && !self.suspended.load(Ordering::Acquire) {
                let mut processed = 0usize;
                while processed < self.throughput {
                    let next = self.queues.user.lock().pop_front();
                    let Some(envelope) = next else { break };
                    if let Err(err) = invoker.invoke_user_message(envelope).await {
                        warn!(error = %err, "user message handler faulted");
                        faulted = true;
                        break;
                    }
                    processed += 1;
                }
            }

            if faulted {
                // Escalation is the invoker's responsibility (it owns the
                // actor's PID/parent link); the mailbox only stops pulling.
                debug!("mailbox run faulted; stopping dispatch until explicitly resumed");
            }

            // Release the exclusion token, then re-check: if either queue
            // gained entries while we were finishing up, reschedule rather
            // than risk a lost wakeup between the check and the release.
            self.running.store(false, Ordering::Release);
            let more_system = !self.queues.system.lock().is_empty();
            let more_user = !self.suspended.load(Ordering::Acquire)
                && !self.queues.user.lock().is_empty();
            if faulted || !(more_system || more_user) {
                break;
            }
            if self
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Someone else already rescheduled us.
                break;
            }
        }
    }

    /// Current user-queue length, for diagnostics and tests.
    pub fn user_len(&self) -> usize {
        self.queues.user.lock().len()
    }

    /// Current system-queue length, for diagnostics and tests.
    pub fn system_len(&self) -> usize {
        self.queues.system.lock().len()
    }

    /// Whether the mailbox is currently suspended (system-only delivery).
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }
}
