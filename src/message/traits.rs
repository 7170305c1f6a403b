//! The `Message` marker trait and its blanket implementation.
//!
//! Actor message payloads are ordinary Rust values — there is no trait an
//! author must implement by hand. `Message` exists so the mailbox, process
//! registry, and dead-letter sink can hold payloads of different concrete
//! types behind one `Box<dyn Message>` and recover the concrete type later,
//! at the one place that needs it: a typed process unwrapping an envelope
//! before handing it to `Actor::handle_message`.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt::Debug;

/// Anything sendable and debuggable can be a message payload.
///
/// # Example
///
/// ```rust
/// use nexusrt::message::Message;
///
/// #[derive(Debug)]
/// struct Ping;
///
/// fn accepts_message<M: Message>(_m: M) {}
/// accepts_message(Ping);
/// ```
pub trait Message: Any + Send + Debug {
    /// Borrow as `dyn Any` for type inspection without consuming the box.
    fn as_any(&self) -> &dyn Any;

    /// Consume the box, recovering a `dyn Any` box suitable for
    /// `Box<dyn Any>::downcast`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The type name used in dead-letter logs and monitoring events.
    fn message_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: Any + Send + Debug> Message for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Downcast a boxed, type-erased message back to its concrete type.
pub fn downcast_message<M: Message>(message: Box<dyn Message>) -> Result<Box<M>, &'static str> {
    message
        .into_any()
        .downcast::<M>()
        .map_err(|_| "message payload did not match the expected type")
}

/// Marker for messages that should auto-generate a reply once handled.
///
/// If the unwrapped payload's concrete type implements this, the context
/// invokes the actor's `receive` and immediately also sends the generated
/// reply back to the envelope's sender (see §4.2 auto-response).
pub trait AutoRespond: Message {
    /// The reply type produced automatically after a successful receive.
    type Reply: Message;

    /// Build the automatic reply from a reference to this request.
    fn auto_reply(&self) -> Self::Reply;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[derive(Debug)]
    struct Pong;

    #[test]
    fn test_message_type_name() {
        let msg: Box<dyn Message> = Box::new(Ping(1));
        assert!(msg.message_type().contains("Ping"));
    }

    #[test]
    fn test_downcast_success() {
        let msg: Box<dyn Message> = Box::new(Ping(42));
        let typed = downcast_message::<Ping>(msg).expect("downcast should succeed");
        assert_eq!(*typed, Ping(42));
    }

    #[test]
    fn test_as_any_roundtrip() {
        let msg: Box<dyn Message> = Box::new(Ping(7));
        assert!(msg.as_any().downcast_ref::<Ping>().is_some());
        assert!(msg.as_any().downcast_ref::<Pong>().is_none());
    }
}
