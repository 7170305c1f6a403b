//! The `Process` abstraction: the mailbox endpoint a [`Pid`] ultimately names.
//!
//! Every addressable entity in the runtime — an actor incarnation, a
//! one-shot future, a router, the dead-letter sink itself — implements
//! `Process`. A `Pid` never denotes the entity's lifetime; it denotes a
//! position in the registry that may or may not still resolve to one.

// Layer 1: Standard library imports
use std::fmt::Debug;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

// Layer 3: Internal module imports
use crate::mailbox::MailboxError;
use crate::message::{Envelope, SystemMessage};
use crate::pid::Pid;

/// Exactly the two operations a [`Pid`] can invoke on whatever it names
/// (§3 Data Model: "Process: ... exactly two user-visible operations").
#[async_trait]
pub trait Process: Send + Sync + Debug {
    /// Deliver a user message.
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError>;

    /// Deliver a system message.
    async fn deliver_system_message(&self, message: SystemMessage) -> Result<(), MailboxError>;
}

/// Published whenever a message is delivered to a `Pid` that no longer (or
/// never did) resolve to a live process — the dead-letter sink's sole
/// observable effect, broadcast on the owning `ActorSystem`'s event stream.
#[derive(Debug, Clone)]
pub struct DeadLetterEvent {
    /// The `Pid` the message was addressed to.
    pub target: Pid,
    /// The sender, if the original envelope carried one.
    pub sender: Option<Pid>,
    /// Human-readable payload type name, for logging without downcasting.
    pub message_type: &'static str,
    /// When the dead-letter was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A closure-based publish target, so [`DeadLetterProcess`] doesn't need to
/// depend on the event stream's concrete type and can be constructed before
/// an `ActorSystem` exists (e.g. in isolated mailbox tests).
pub type DeadLetterPublisher = Arc<dyn Fn(DeadLetterEvent) + Send + Sync>;

/// The sink every unresolved or stopped `Pid` ultimately routes to.
///
/// Never fails: delivering to a dead letter always succeeds from the
/// sender's point of view, it just doesn't do anything but publish an
/// event (§7: `DeadLetter -> published-on-event-stream / ask-future-faults`).
pub struct DeadLetterProcess {
    publisher: Option<DeadLetterPublisher>,
}

impl Debug for DeadLetterProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadLetterProcess").finish()
    }
}

impl DeadLetterProcess {
    /// A dead-letter sink with no publisher attached; messages are logged
    /// at debug level and otherwise dropped.
    pub fn silent() -> Self {
        Self { publisher: None }
    }

    /// A dead-letter sink that publishes to the given callback, typically
    /// the owning `ActorSystem`'s event stream.
    pub fn with_publisher(publisher: DeadLetterPublisher) -> Self {
        Self {
            publisher: Some(publisher),
        }
    }

    fn record(&self, target: Pid, sender: Option<Pid>, message_type: &'static str) {
        debug!(%target, message_type, "dead letter");
        if let Some(publisher) = &self.publisher {
            publisher(DeadLetterEvent {
                target,
                sender,
                message_type,
                timestamp: Utc::now(),
            });
        }
    }
}

#[async_trait]
impl Process for DeadLetterProcess {
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        let target = envelope
            .reply_to
            .clone()
            .unwrap_or_else(|| Pid::new(crate::pid::Address::local(), crate::util::ProcessId::new()));
        self.record(target, envelope.sender.clone(), envelope.message_type());
        Ok(())
    }

    async fn deliver_system_message(&self, message: SystemMessage) -> Result<(), MailboxError> {
        debug!(?message, "system message to dead letter");
        Ok(())
    }
}
