//! Fan-out strategies a router dispatches incoming messages with (§4.6).

// Layer 1: Standard library imports
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 3: Internal module imports
use crate::pid::Pid;

/// How a router picks a routee (or routees) for an incoming message.
pub enum RoutingStrategy<M> {
    /// Send an independent copy to every routee.
    Broadcast,
    /// Atomic counter modulo routee count.
    RoundRobin,
    /// Uniform random pick.
    Random,
    /// Route by a key extracted from the message, mapped onto a hash ring.
    /// Ties on the ring are broken by routee id.
    ConsistentHash { key_of: Arc<dyn Fn(&M) -> u64 + Send + Sync> },
}

impl<M> Clone for RoutingStrategy<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Broadcast => Self::Broadcast,
            Self::RoundRobin => Self::RoundRobin,
            Self::Random => Self::Random,
            Self::ConsistentHash { key_of } => Self::ConsistentHash { key_of: key_of.clone() },
        }
    }
}

impl<M> fmt::Debug for RoutingStrategy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str("Broadcast"),
            Self::RoundRobin => f.write_str("RoundRobin"),
            Self::Random => f.write_str("Random"),
            Self::ConsistentHash { .. } => f.write_str("ConsistentHash"),
        }
    }
}

const VNODES_PER_ROUTEE: u32 = 64;

fn ring_hash(pid: &Pid, vnode: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    pid.hash(&mut hasher);
    vnode.hash(&mut hasher);
    hasher.finish()
}

/// Pick a routee for `key` by walking a hash ring built from `routees`,
/// each represented by [`VNODES_PER_ROUTEE`] virtual nodes. Ties on the
/// ring (and the wrap-around fallback) are broken by routee id.
///
/// # Panics
///
/// Panics if `routees` is empty; callers must check the routee set is
/// non-empty before dispatching.
pub fn consistent_hash_pick<'a>(routees: &'a [Pid], key: u64) -> &'a Pid {
    let mut ring: Vec<(u64, &Pid)> = routees
        .iter()
        .flat_map(|pid| (0..VNODES_PER_ROUTEE).map(move |v| (ring_hash(pid, v), pid)))
        .collect();
    ring.sort_by(|(hash_a, pid_a), (hash_b, pid_b)| {
        hash_a.cmp(hash_b).then_with(|| pid_a.to_string().cmp(&pid_b.to_string()))
    });
    ring.iter()
        .find(|(hash, _)| *hash >= key)
        .or_else(|| ring.first())
        .map(|(_, pid)| *pid)
        .unwrap_or_else(|| &routees[0])
}
