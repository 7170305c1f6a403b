//! Process registry error types (§4.4).

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::ProcessId;

/// Errors from fallible registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A named registration attempted to reuse an id that is already occupied.
    #[error("process id already registered: {0}")]
    NameExists(ProcessId),
}
