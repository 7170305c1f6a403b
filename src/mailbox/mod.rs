//! The mailbox: the sole entry point through which messages reach an actor
//! incarnation, implementing the dual-queue dispatch algorithm.
//!
//! # Components
//!
//! - [`Mailbox`] - two FIFO queues (system, user), a single-consumer
//!   exclusion flag, and a suspend flag
//! - [`Invoker`] - the callback target a mailbox drives one message at a time
//! - [`Dispatcher`] - hands a mailbox run off to an executor
//! - [`MailboxError`] - `Full`/`Closed`
//!
//! Backpressure is externalized: a bounded mailbox's `post_user` returns
//! `MailboxError::Full` rather than blocking or silently dropping.

pub mod dual_queue;
pub mod error;
pub mod traits;

pub use dual_queue::Mailbox;
pub use error::MailboxError;
pub use traits::{BoxedFuture, Dispatcher, Invoker, MailboxCapacity, TokioDispatcher};
