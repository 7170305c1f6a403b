//! One-shot ask/request futures: a temporary `Pid` that exists only long
//! enough to receive a single reply (§4.5).

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::timeout;

// Layer 3: Internal module imports
use crate::mailbox::MailboxError;
use crate::message::{downcast_message, Envelope, SystemMessage};
use crate::pid::Pid;
use crate::process::Process;

/// Why an `ask` failed to produce a typed reply.
#[derive(Debug, Error)]
pub enum AskError {
    /// No reply arrived before the deadline; the future `Pid` has been
    /// unregistered and any later reply lands on the dead-letter sink.
    #[error("ask timed out waiting for a reply")]
    Timeout,

    /// The reply arrived but its payload didn't downcast to the expected type.
    #[error("reply payload did not match the expected type")]
    TypeMismatch,

    /// The request landed on the dead-letter sink instead of a live process.
    #[error("request was delivered to the dead-letter sink")]
    DeadLetter,

    /// The one-shot channel was dropped without a reply (the `AskProcess`
    /// was torn down, e.g. by system shutdown).
    #[error("ask future was cancelled before a reply arrived")]
    Cancelled,
}

/// A process that exists only to capture the next message delivered to it
/// and hand it to the waiting [`ask`] caller.
///
/// Self-unregistration on completion is the caller's responsibility (the
/// caller holds the `Pid` and owning registry); `AskProcess` itself just
/// guarantees at most one delivery is forwarded.
#[derive(Debug)]
pub struct AskProcess {
    reply: std::sync::Mutex<Option<oneshot::Sender<Envelope>>>,
}

impl AskProcess {
    /// Construct the process half; pairs with the [`oneshot::Receiver`]
    /// the caller awaits.
    pub fn new() -> (Arc<Self>, oneshot::Receiver<Envelope>) {
        let (tx, rx) = oneshot::channel();
        (
            Arc::new(Self {
                reply: std::sync::Mutex::new(Some(tx)),
            }),
            rx,
        )
    }
}

#[async_trait]
impl Process for AskProcess {
    async fn deliver_user_message(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if let Some(tx) = self.reply.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = tx.send(envelope);
        }
        Ok(())
    }

    async fn deliver_system_message(&self, _message: SystemMessage) -> Result<(), MailboxError> {
        Ok(())
    }
}

/// Send `envelope` to `target` and await a typed reply within `deadline`.
///
/// `post` is the caller's send primitive (resolving `target` through the
/// registry/cache and delivering to it) — kept as a closure so this
/// function has no dependency on the registry's concrete type. It's async
/// because delivery goes through `Process::deliver_user_message`.
pub async fn ask<R, F, Fut>(
    self_pid_for_reply: Pid,
    rx: oneshot::Receiver<Envelope>,
    post: F,
    envelope: Envelope,
    deadline: Duration,
) -> Result<R, AskError>
where
    R: crate::message::Message,
    F: FnOnce(Envelope) -> Fut,
    Fut: std::future::Future<Output = Result<(), MailboxError>>,
{
    let envelope = envelope.with_reply_to(self_pid_for_reply);
    post(envelope).await.map_err(|_| AskError::DeadLetter)?;

    match timeout(deadline, rx).await {
        Ok(Ok(reply)) => {
            let (value, _meta) = reply.downcast::<R>().map_err(|_| AskError::TypeMismatch)?;
            Ok(value)
        }
        Ok(Err(_)) => Err(AskError::Cancelled),
        Err(_) => Err(AskError::Timeout),
    }
}
