//! `ClusterIdentity`, the canonical key for a virtual actor, plus the
//! pluggable activation seam (§3, §4.7).

// Layer 1: Standard library imports
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use uuid::Uuid;

// Layer 3: Internal module imports
use crate::actor::SystemHandle;
use crate::pid::Pid;
use crate::util::ProcessId;

/// `(kind, identity)` — the canonical key for a virtual actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterIdentity {
    pub kind: String,
    pub identity: String,
}

impl ClusterIdentity {
    pub fn new(kind: impl Into<String>, identity: impl Into<String>) -> Self {
        Self { kind: kind.into(), identity: identity.into() }
    }
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.identity)
    }
}

/// Where a kind's virtual actors are allowed to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Always activate on the member that owns the identity by topology hash.
    OwnerLocal,
    /// Any member may host an activation; owner-local is a hint, not a rule.
    AnyMember,
}

/// Spawns (or otherwise obtains) the local actor backing a virtual identity
/// the first time it's requested. One `Activator` per cluster kind.
#[async_trait]
pub trait Activator: Send + Sync {
    /// Activate `identity`, returning the `Pid` of the (possibly
    /// newly-spawned) local actor backing it.
    async fn activate(&self, identity: &ClusterIdentity, system: &Arc<dyn SystemHandle>) -> Pid;
}

/// The well-known process id of a kind's `PartitionIdentityActor`, derived
/// from the kind name alone so every member can address it without a
/// discovery round-trip — local or remote, the id is the same.
pub fn partition_process_id(kind: &str) -> ProcessId {
    let mut high_hasher = DefaultHasher::new();
    kind.hash(&mut high_hasher);
    "partition-high".hash(&mut high_hasher);
    let high = high_hasher.finish();

    let mut low_hasher = DefaultHasher::new();
    kind.hash(&mut low_hasher);
    "partition-low".hash(&mut low_hasher);
    let low = low_hasher.finish();

    ProcessId::from_uuid(Uuid::from_u64_pair(high, low))
}
