//! The process registry: a flat `ProcessId -> Process` map plus the
//! dead-letter recorder and `SystemHandle` implementation it backs (§4.4).
//!
//! - `process_registry.rs` — `ProcessRegistry`, the `SystemHandle` impl.
//! - `dead_letter.rs` — bounded recent-dead-letter recorder.
//! - `error.rs` — `RegistryError`.

pub mod dead_letter;
pub mod error;
pub mod process_registry;

pub use dead_letter::DeadLetterRecorder;
pub use error::RegistryError;
pub use process_registry::{ProcessRegistry, RemoteHandler};
