//! The `Actor` trait: the single piece of business logic a user writes.

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::Message;
use crate::pid::Pid;
use crate::message::StopReason;

/// Message-handling logic for one actor incarnation.
///
/// `receive` is the operation named in the data model: process one user
/// message to completion. The `on_start`/`on_restart`/`on_stop`/
/// `on_receive_timeout` hooks exist because an incarnation still needs to
/// react to its own lifecycle and to a receive-timeout firing — they are
/// invoked by the surrounding [`ActorContext`] in response to the
/// corresponding system messages, never by calling code directly.
///
/// # Example
///
/// ```rust,ignore
/// use nexusrt::actor::{Actor, ActorContext};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct Increment;
///
/// struct Counter { value: i64 }
///
/// #[async_trait]
/// impl Actor for Counter {
///     type Message = Increment;
///     type Error = std::convert::Infallible;
///
///     async fn receive(
///         &mut self,
///         _message: Increment,
///         _ctx: &ActorContext<Self>,
///     ) -> Result<(), Self::Error> {
///         self.value += 1;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// The single message type this incarnation handles.
    type Message: Message;

    /// The error type a failed `receive` (or lifecycle hook) returns. A
    /// `Some` error triggers supervision: the context records a failure
    /// and consults its `SupervisionStrategy`.
    type Error: Error + Send + Sync + 'static;

    /// Process one user message.
    async fn receive(
        &mut self,
        message: Self::Message,
        ctx: &ActorContext<Self>,
    ) -> Result<(), Self::Error>
    where
        Self: Sized;

    /// Called once after the incarnation is registered and before its
    /// first user message is delivered (in response to `SystemMessage::Started`).
    async fn on_start(&mut self, _ctx: &ActorContext<Self>) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Called on a fresh incarnation produced by a restart, before it
    /// starts accepting user messages again. `cause` is the failure reason
    /// that triggered the restart, if known.
    async fn on_restart(
        &mut self,
        _cause: Option<String>,
        _ctx: &ActorContext<Self>,
    ) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Called once while transitioning to `Stopped`, after children have
    /// been asked to stop and before the `Pid` is unregistered.
    async fn on_stop(&mut self, _ctx: &ActorContext<Self>) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Called when the armed receive-timeout elapses with no qualifying
    /// message delivered in the interval.
    async fn on_receive_timeout(&mut self, _ctx: &ActorContext<Self>) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Called when a `Pid` this incarnation is watching terminates.
    async fn on_terminated(
        &mut self,
        _who: Pid,
        _reason: StopReason,
        _ctx: &ActorContext<Self>,
    ) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        Ok(())
    }
}
