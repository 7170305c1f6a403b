//! Error types surfaced by supervision operations.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::pid::Pid;

/// Errors a [`super::SupervisionStrategy`] or its caller can surface.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The named child is not (or no longer) one of this supervisor's children.
    #[error("child not found: {pid}")]
    ChildNotFound {
        /// The `Pid` that was not recognized.
        pid: Pid,
    },

    /// A restart attempt's child-producer function failed.
    #[error("failed to restart child '{pid}': {reason}")]
    RestartFailed {
        /// The child that failed to restart.
        pid: Pid,
        /// Why the producer failed.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::Address;
    use crate::util::ProcessId;

    #[test]
    fn test_child_not_found_display() {
        let pid = Pid::new(Address::local(), ProcessId::new());
        let err = SupervisorError::ChildNotFound { pid: pid.clone() };
        assert!(err.to_string().contains(&pid.to_string()));
    }
}
