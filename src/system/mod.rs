//! Process-wide lifecycle: `ActorSystem`, its builder, configuration, and
//! error types (§6 External Interfaces).

pub mod actor_system;
pub mod builder;
pub mod config;
pub mod errors;

pub use actor_system::ActorSystem;
pub use builder::SystemBuilder;
pub use config::{
    SystemConfig, SystemConfigBuilder, DEFAULT_ACTOR_REQUEST_TIMEOUT, DEFAULT_BLOCKED_MEMBER_DURATION,
    DEFAULT_SHUTDOWN_GRACE_PERIOD, DEFAULT_START_DEADLINE, DEFAULT_THROUGHPUT,
};
pub use errors::SystemError;
