//! `Member`: a node in the cluster as seen by the membership provider (§3, §6).

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::sync::Arc;

/// A node the membership provider currently considers live. Members expire
/// after a TTL if not refreshed — enforced by the provider, not by `Member`
/// itself, since expiry policy is provider-specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub kinds: HashSet<String>,
}

impl Member {
    pub fn new(id: impl Into<String>, host: impl Into<String>, port: u16, kinds: HashSet<String>) -> Self {
        Self { id: id.into(), host: host.into(), port, kinds }
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }
}

/// External collaborator supplying cluster membership. Must provide
/// at-least-once delivery of the latest snapshot — implementations
/// typically publish [`crate::cluster::Topology`] onto the owning
/// `ActorSystem`'s `EventStream` both on change and on periodic refresh.
pub trait MembershipProvider: Send + Sync {
    /// The most recently observed topology.
    fn current(&self) -> Arc<super::topology::Topology>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_supports_kind() {
        let member = Member::new("m1", "10.0.0.1", 9000, HashSet::from(["player".to_string()]));
        assert!(member.supports("player"));
        assert!(!member.supports("guild"));
    }
}
