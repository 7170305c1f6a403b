//! Cluster identity layer error types (§4.7, §7).

use thiserror::Error;

use super::identity::ClusterIdentity;

/// Errors from the cluster identity layer's public entry point,
/// `ClusterContext::request`.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Retries were exhausted within the deadline without a usable reply.
    #[error("identity {0} unavailable after exhausting retries")]
    IdentityUnavailable(ClusterIdentity),

    /// The request reached a live activation but it returned an
    /// application-level error, propagated verbatim.
    #[error("grain error {code}: {message}")]
    GrainError { code: String, message: String },

    /// The target member is on the block list.
    #[error("member {0} is blocked")]
    MemberBlocked(String),
}
