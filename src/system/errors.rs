//! System-level errors (§7 Error Handling Design).

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::cluster::ClusterError;
use crate::registry::RegistryError;

/// Errors from `ActorSystem`-level operations: construction, spawn,
/// shutdown, and cluster access.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// `shutdown` was called while a shutdown was already in progress.
    #[error("system shutdown already in progress")]
    ShuttingDown,

    /// A cluster operation was attempted on a system built without one.
    #[error("this system was not configured with a cluster identity layer")]
    ClusterNotConfigured,

    /// Registry-level failure (duplicate named registration).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Cluster identity layer failure, propagated verbatim.
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

impl SystemError {
    /// Whether retrying the same operation might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, SystemError::Cluster(ClusterError::IdentityUnavailable(_)))
    }

    /// Whether the system itself must stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SystemError::ShuttingDown)
    }
}
