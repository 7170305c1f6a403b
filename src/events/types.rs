//! Closed observability event sets published on the event stream,
//! beyond `DeadLetterEvent` (§10.5).

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use crate::message::StopReason;
use crate::pid::Pid;
use crate::supervisor::{Directive, RestartStatistics};

/// Severity a subscriber can filter on without downcasting the event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A supervision decision as applied to a failed child, published for
/// observers that aren't the supervisor itself.
#[derive(Debug, Clone)]
pub struct SupervisionEvent {
    /// The child the decision was made about.
    pub child: Pid,
    /// The reason the child failed.
    pub reason: String,
    /// Restart statistics at decision time.
    pub stats: RestartStatistics,
    /// The directive the strategy returned.
    pub directive: Directive,
    pub timestamp: DateTime<Utc>,
}

impl SupervisionEvent {
    pub fn new(child: Pid, reason: String, stats: RestartStatistics, directive: Directive) -> Self {
        Self { child, reason, stats, directive, timestamp: Utc::now() }
    }

    /// `Resume`/`Restart` are routine; `Stop`/`Escalate` merit more attention.
    pub fn severity(&self) -> Severity {
        match self.directive {
            Directive::Resume => Severity::Debug,
            Directive::Restart { .. } => Severity::Info,
            Directive::Stop => Severity::Warn,
            Directive::Escalate => Severity::Error,
        }
    }
}

/// A phase transition in an actor's lifecycle.
#[derive(Debug, Clone)]
pub enum ActorLifecycleEvent {
    /// A fresh incarnation finished wiring into its mailbox and registry.
    Started { actor: Pid, timestamp: DateTime<Utc> },
    /// The actor is being re-incarnated.
    Restarted { actor: Pid, timestamp: DateTime<Utc> },
    /// The actor finished its `Stopped` handling.
    Terminated { actor: Pid, reason: StopReason, timestamp: DateTime<Utc> },
}

impl ActorLifecycleEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Started { .. } | Self::Restarted { .. } => Severity::Debug,
            Self::Terminated { reason: StopReason::Failed, .. } => Severity::Warn,
            Self::Terminated { .. } => Severity::Info,
        }
    }
}

/// A mailbox-level condition worth observing independently of the actor
/// logic running on top of it.
#[derive(Debug, Clone)]
pub enum MailboxEvent {
    /// User-message delivery suspended (explicit `SuspendMailbox` or a
    /// pending restart).
    Suspended { owner: Pid, timestamp: DateTime<Utc> },
    /// User-message delivery resumed.
    Resumed { owner: Pid, timestamp: DateTime<Utc> },
    /// The mailbox was closed; no further deliveries will be accepted.
    Closed { owner: Pid, timestamp: DateTime<Utc> },
    /// A bounded mailbox rejected a post because it was at capacity.
    Full { owner: Pid, capacity: usize, timestamp: DateTime<Utc> },
}

impl MailboxEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Suspended { .. } | Self::Resumed { .. } | Self::Closed { .. } => Severity::Debug,
            Self::Full { .. } => Severity::Warn,
        }
    }
}
