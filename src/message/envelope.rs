// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY
use uuid::Uuid;

// Layer 3: Internal module imports
use super::traits::{downcast_message, Message};
use crate::pid::Pid;

/// A type-erased message plus its routing metadata — what travels through
/// the mailbox's user queue and across the `Process` boundary.
///
/// Unlike the teacher's original `MessageEnvelope<M>`, this envelope is not
/// generic over the payload type: the process registry and dead-letter sink
/// must hold envelopes destined for actors of different concrete message
/// types in the same queues and the same registry. The concrete actor's
/// typed process is the one place that downcasts the payload back to
/// `A::Message` before calling `Actor::handle_message` — everywhere else,
/// the envelope stays opaque.
pub struct Envelope {
    /// The type-erased payload.
    pub payload: Box<dyn Message>,

    /// The actor that sent this message, if any.
    pub sender: Option<Pid>,

    /// Where replies should be addressed, if different from `sender`.
    pub reply_to: Option<Pid>,

    /// Creation timestamp (§3.2 chrono `DateTime<Utc>`).
    pub timestamp: DateTime<Utc>,

    /// Correlation id for request/response tracking (`ask`, cluster request).
    pub correlation_id: Option<Uuid>,

    /// When true, this message does not reset a receive-timeout timer.
    pub not_influence_receive_timeout: bool,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("payload_type", &self.payload.message_type())
            .field("sender", &self.sender)
            .field("reply_to", &self.reply_to)
            .field("timestamp", &self.timestamp)
            .field("correlation_id", &self.correlation_id)
            .finish()
    }
}

impl Envelope {
    /// Wrap a concrete message with no routing metadata attached.
    pub fn new<M: Message>(payload: M) -> Self {
        Self {
            payload: Box::new(payload),
            sender: None,
            reply_to: None,
            timestamp: Utc::now(), // §3.2 chrono standard
            correlation_id: None,
            not_influence_receive_timeout: false,
        }
    }

    /// Builder: attach the sending `Pid`.
    pub fn with_sender(mut self, sender: Pid) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Builder: attach an explicit reply-to `Pid`, distinct from `sender`.
    pub fn with_reply_to(mut self, reply_to: Pid) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Builder: attach a correlation id for request/response tracking.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Builder: mark this message as not resetting the receive-timeout timer.
    pub fn not_influencing_receive_timeout(mut self) -> Self {
        self.not_influence_receive_timeout = true;
        self
    }

    /// The payload's runtime type name, for logs and monitoring events.
    pub fn message_type(&self) -> &'static str {
        self.payload.message_type()
    }

    /// Consume the envelope, attempting to recover the concrete payload
    /// type `M` while preserving routing metadata.
    ///
    /// On mismatch, the original envelope is reconstructed and returned so
    /// the caller (normally a typed process trying its own `Actor::Message`
    /// type) can divert it to dead-letter.
    pub fn downcast<M: Message>(self) -> Result<(M, EnvelopeMeta), Envelope> {
        let meta = EnvelopeMeta {
            sender: self.sender.clone(),
            reply_to: self.reply_to.clone(),
            timestamp: self.timestamp,
            correlation_id: self.correlation_id,
            not_influence_receive_timeout: self.not_influence_receive_timeout,
        };
        match downcast_message::<M>(self.payload) {
            Ok(boxed) => Ok((*boxed, meta)),
            Err(_) => Err(self),
        }
    }
}

/// The routing metadata of an [`Envelope`], separated from the payload so
/// it can be carried alongside an already-downcast concrete message.
#[derive(Debug, Clone)]
pub struct EnvelopeMeta {
    /// The actor that sent this message, if any.
    pub sender: Option<Pid>,
    /// Where replies should be addressed, if different from `sender`.
    pub reply_to: Option<Pid>,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Correlation id for request/response tracking.
    pub correlation_id: Option<Uuid>,
    /// When true, this message does not reset a receive-timeout timer.
    pub not_influence_receive_timeout: bool,
}
