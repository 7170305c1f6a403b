//! Cluster identity layer: location-transparent virtual actors addressed by
//! `ClusterIdentity` instead of `Pid` (§3, §4.7).
//!
//! - `identity.rs` — `ClusterIdentity`, `PlacementPolicy`, `Activator`.
//! - `member.rs` — `Member`, `MembershipProvider`.
//! - `topology.rs` — `Topology` (consistent-hash ownership), `TopologyApplied`.
//! - `pid_cache.rs` — `PidCache`, the per-member resolved-identity cache.
//! - `block_list.rs` — `BlockList`, short-circuiting sends to dead members.
//! - `partition.rs` — `PartitionIdentityActor`, the per-kind activation directory.
//! - `context.rs` — `ClusterContext`, the public send/topology-change entry point.
//! - `error.rs` — `ClusterError`.

pub mod block_list;
pub mod context;
pub mod error;
pub mod identity;
pub mod member;
pub mod partition;
pub mod pid_cache;
pub mod topology;

pub use block_list::BlockList;
pub use context::ClusterContext;
pub use error::ClusterError;
pub use identity::{partition_process_id, Activator, ClusterIdentity, PlacementPolicy};
pub use member::{Member, MembershipProvider};
pub use partition::{ActivationRequest, ActivationResponse, ForgetIdentity, PartitionIdentityActor};
pub use pid_cache::PidCache;
pub use topology::{Topology, TopologyApplied};
