//! The process-wide (per-`ActorSystem`) event stream and the closed set of
//! observability events the runtime publishes on it (§4.8, §10.5).
//!
//! - `stream.rs` — `EventStream`, `Subscription`.
//! - `types.rs` — `Severity`, `SupervisionEvent`, `ActorLifecycleEvent`,
//!   `MailboxEvent`.

pub mod stream;
pub mod types;

pub use stream::{EventStream, Subscription};
pub use types::{ActorLifecycleEvent, MailboxEvent, Severity, SupervisionEvent};
