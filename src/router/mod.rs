//! Routee-set message distribution: stateless fan-out processes sharing an
//! immutable routee set (§4.6).
//!
//! - `state.rs` — `RouterState`, the shared immutable routee set.
//! - `strategies.rs` — `RoutingStrategy` and the consistent-hash ring.
//! - `group.rs` — `Router<M>`, the `Process` implementation, and the
//!   management messages that add/remove routees at runtime.

pub mod group;
pub mod state;
pub mod strategies;

pub use group::{GetRoutees, Router, RouterManagement, Routees};
pub use state::RouterState;
pub use strategies::{consistent_hash_pick, RoutingStrategy};
