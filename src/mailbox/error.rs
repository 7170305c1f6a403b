//! Mailbox-level error types.

// Layer 2: Third-party crate imports
use thiserror::Error;

/// Errors returned by a mailbox's `post_user`/`post_system` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// A bounded mailbox's user queue was at capacity.
    #[error("mailbox full (capacity {capacity})")]
    Full {
        /// The configured bound that was hit.
        capacity: usize,
    },

    /// The mailbox has finished running and will not schedule again.
    #[error("mailbox closed")]
    Closed,
}
