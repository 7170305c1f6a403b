//! Collaborator traits the mailbox's `run` algorithm dispatches through.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::error::MailboxError;
use crate::message::{Envelope, SystemMessage};

/// A future ready to be handed to an executor, boxed for object safety.
pub type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Hands the mailbox's `run` loop off to a thread pool / task executor
/// (§4.1: "hand control to the dispatcher ... to execute run").
///
/// Kept as a trait — rather than calling `tokio::spawn` directly from the
/// mailbox — so tests can run a mailbox's dispatch loop inline on the
/// current task without spawning.
pub trait Dispatcher: Send + Sync {
    /// Schedule `fut` to run, detached from the caller.
    fn dispatch(&self, fut: BoxedFuture);
}

/// The default dispatcher: every `run` invocation becomes its own Tokio task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDispatcher;

impl Dispatcher for TokioDispatcher {
    fn dispatch(&self, fut: BoxedFuture) {
        tokio::spawn(fut);
    }
}

/// The mailbox's callback target: whatever owns the actor incarnation and
/// can process one system or user message at a time.
///
/// Implemented by `ActorContext` in practice; kept as a trait at the
/// mailbox boundary so the mailbox itself stays ignorant of `Actor`/`Props`.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Process one system message to completion.
    async fn invoke_system_message(&self, message: SystemMessage) -> Result<(), MailboxError>;

    /// Process one user message to completion (awaiting to the end, per
    /// §4.1's strict per-actor ordering requirement).
    async fn invoke_user_message(&self, envelope: Envelope) -> Result<(), MailboxError>;
}

/// Whether a mailbox's user queue is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxCapacity {
    /// Bounded to at most `n` pending user messages.
    Bounded(usize),
    /// No bound; `post_user` always succeeds.
    Unbounded,
}
