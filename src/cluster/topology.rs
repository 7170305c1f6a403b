//! `Topology`: an immutable membership snapshot plus the per-kind owner
//! function identities are resolved against (§3, §4.7).

// Layer 1: Standard library imports
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Layer 3: Internal module imports
use super::identity::ClusterIdentity;
use super::member::Member;

const VNODES_PER_MEMBER: u32 = 64;

fn member_hash(id: &str, vnode: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    vnode.hash(&mut hasher);
    hasher.finish()
}

fn identity_key(identity: &ClusterIdentity) -> u64 {
    let mut hasher = DefaultHasher::new();
    identity.kind.hash(&mut hasher);
    identity.identity.hash(&mut hasher);
    hasher.finish()
}

/// An immutable `(members, topology-hash)` snapshot. A new `Topology` is
/// published, never mutated — subscribers always observe one coherent view.
#[derive(Debug, Clone)]
pub struct Topology {
    pub version: u64,
    pub members: Arc<[Member]>,
    pub topology_hash: u64,
}

impl Topology {
    pub fn new(version: u64, members: Vec<Member>) -> Self {
        let mut hasher = DefaultHasher::new();
        for member in &members {
            member.id.hash(&mut hasher);
        }
        Self {
            version,
            members: members.into(),
            topology_hash: hasher.finish(),
        }
    }

    /// The member that owns `identity` under this topology, by consistent
    /// hashing over the members that declare support for its kind. `None`
    /// if no member currently supports the kind.
    pub fn owner_of(&self, identity: &ClusterIdentity) -> Option<&Member> {
        let candidates: Vec<&Member> = self.members.iter().filter(|m| m.supports(&identity.kind)).collect();
        if candidates.is_empty() {
            return None;
        }
        let key = identity_key(identity);
        let mut ring: Vec<(u64, &Member)> = candidates
            .iter()
            .flat_map(|member| (0..VNODES_PER_MEMBER).map(move |v| (member_hash(&member.id, v), *member)))
            .collect();
        ring.sort_by(|(hash_a, member_a), (hash_b, member_b)| {
            hash_a.cmp(hash_b).then_with(|| member_a.id.cmp(&member_b.id))
        });
        ring.iter()
            .find(|(hash, _)| *hash >= key)
            .or_else(|| ring.first())
            .map(|(_, member)| *member)
    }
}

/// Published on the event stream after a topology change has been fully
/// applied locally (directory entries forgotten, stale activations
/// quiesced) — subscribers may now safely drain their own caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyApplied(pub u64);
