//! The `Actor` trait, its supervised runtime context, and the lifecycle
//! state machine a live incarnation moves through (§4.2).
//!
//! - `traits.rs` — the `Actor` trait a user implements.
//! - `context.rs` — `ActorContext`, the handle `receive`/lifecycle hooks
//!   get, plus the `SystemHandle` seam into the registry/system layer.
//! - `lifecycle.rs` — `ActorState`.
//! - `props.rs` — `Props`, the immutable spawn recipe.

pub mod context;
pub mod lifecycle;
pub mod props;
pub mod traits;

pub use context::{ActorContext, SystemHandle};
pub use lifecycle::ActorState;
pub use props::{Producer, Props};
pub use traits::Actor;
