//! The system-message protocol: typed control signals that are always
//! delivered ahead of pending user messages within a mailbox run (§4, §7 GLOSSARY).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::message::Message;
use crate::pid::Pid;
use crate::supervisor::stats::RestartStatistics;

/// Why an actor is being stopped or has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A normal, requested stop (`Stop`, drained `PoisonPill`, or parent
    /// cascade from a sibling/parent shutdown).
    Stopped,
    /// The actor's parent or supervisor restarted it.
    Restarted,
    /// The actor faulted and supervision decided to stop it permanently.
    Failed,
    /// The owning `ActorSystem` is shutting down.
    SystemShutdown,
}

/// A supervised child's failure, as escalated to its parent.
#[derive(Debug, Clone)]
pub struct Failure {
    /// The child `Pid` that failed.
    pub child: Pid,
    /// Human-readable failure reason (from `ActorFailure`/`MailboxFault`).
    pub reason: String,
    /// The child's restart statistics at the time of failure.
    pub stats: RestartStatistics,
    /// The message being processed when the failure occurred, if any —
    /// carried so a supervision strategy can inspect it when deciding.
    pub offending_message: Option<Arc<dyn Message>>,
}

/// Control signals exchanged between the mailbox dispatcher, the
/// `ActorContext` state machine, and supervisors.
///
/// System messages are never type-erased through `Box<dyn Message>` — the
/// set is closed and known to the runtime, so an enum is both simpler and
/// cheaper than the dynamic-dispatch path used for user messages.
#[derive(Debug, Clone)]
pub enum SystemMessage {
    /// Delivered once, immediately after a fresh incarnation is wired into
    /// its mailbox and registered.
    Started,

    /// Request to restart: stop current incarnation's children, await
    /// their termination, re-incarnate, then deliver `Started` again.
    Restart {
        /// The failure that triggered this restart, if supervised.
        cause: Option<String>,
    },

    /// Immediate stop request (as opposed to a drained-queue `PoisonPill`).
    Stop,

    /// Register `watcher` to receive `Terminated` when this actor dies.
    Watch {
        /// The actor requesting notification.
        watcher: Pid,
    },

    /// Remove a previously registered watcher.
    Unwatch {
        /// The actor to stop notifying.
        watcher: Pid,
    },

    /// Delivered to every watcher, and to the parent, exactly once when an
    /// actor finishes its `Stopped` handling.
    Terminated {
        /// The actor that terminated.
        who: Pid,
        /// Why it terminated.
        reason: StopReason,
    },

    /// A child escalated a failure to this (its parent) actor.
    ChildFailure(Failure),

    /// Suspend user-message delivery; only system messages are processed
    /// until a matching `ResumeMailbox`.
    SuspendMailbox,

    /// Resume user-message delivery.
    ResumeMailbox,

    /// Idle timer fired: no non-excluded user message arrived within the
    /// armed duration.
    ReceiveTimeout {
        /// The context generation this timer was armed under — stale
        /// timers (generation mismatch after restart) are dropped.
        generation: u64,
    },

    /// Carries a captured continuation scheduled via `reenter_after`.
    /// Dropped by the context if `generation` no longer matches the
    /// current incarnation.
    Continuation {
        /// The generation the continuation was captured under.
        generation: u64,
        /// Opaque continuation id resolved against the context's pending
        /// continuation table.
        continuation_id: u64,
    },
}

/// A timestamped system message as it sits in the mailbox's system queue.
#[derive(Debug, Clone)]
pub struct SystemEnvelope {
    /// The control signal.
    pub message: SystemMessage,
    /// When it was enqueued.
    pub timestamp: DateTime<Utc>,
}

impl SystemEnvelope {
    /// Wrap a system message with the current timestamp.
    pub fn new(message: SystemMessage) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
        }
    }
}
