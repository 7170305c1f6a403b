//! Runtime configuration: every option from the original spec's external
//! interfaces (§6), validated at `build()` time rather than at first use.

// Layer 1: Standard library
use std::num::NonZeroUsize;
use std::time::Duration;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
use super::errors::SystemError;

/// `BlockedMemberDuration` default — how long an unresponsive cluster
/// member is short-circuited before being retried.
pub const DEFAULT_BLOCKED_MEMBER_DURATION: Duration = Duration::from_secs(3600);

/// `ActorRequestTimeout` default — the default `ask` deadline, both for
/// plain actor asks and for `ClusterContext::request`.
pub const DEFAULT_ACTOR_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// `StartDeadline` default — mirrors `actor::props`'s own default so a
/// `SystemConfig` built with no overrides produces `Props` with the same
/// warning threshold.
pub const DEFAULT_START_DEADLINE: Duration = Duration::from_secs(5);

/// `Throughput` default — user messages processed per mailbox run.
pub const DEFAULT_THROUGHPUT: usize = 300;

/// How long `ActorSystem::shutdown` waits for the root guardian's cascade
/// stop to drain before returning.
pub const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

// SAFETY: 1024 is a nonzero literal.
const DEFAULT_PID_CACHE_CAPACITY: NonZeroUsize = unsafe { NonZeroUsize::new_unchecked(1024) };
const DEFAULT_CLUSTER_REQUEST_ATTEMPTS: u32 = 3;

/// Runtime configuration recognized by the core (§6 External Interfaces).
///
/// An immutable, builder-constructed value — the only way to deviate from
/// these defaults is [`SystemConfig::builder`].
///
/// # Examples
///
/// ```rust
/// use nexusrt::system::SystemConfig;
/// use std::time::Duration;
///
/// let config = SystemConfig::builder()
///     .with_actor_request_timeout(Duration::from_secs(10))
///     .with_dead_letter_request_logging(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.actor_request_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Log requests routed to the dead-letter sink.
    pub dead_letter_request_logging: bool,

    /// Gate a more verbose tier of supervision-decision logging.
    pub developer_supervision_logging: bool,

    /// How long an unresponsive cluster member stays blocked.
    pub blocked_member_duration: Duration,

    /// Default `ask` deadline, for both plain actor asks and cluster requests.
    pub actor_request_timeout: Duration,

    /// Default `Props` start-deadline warning threshold.
    pub start_deadline: Duration,

    /// Default mailbox user-messages processed per dispatch run.
    pub throughput: usize,

    /// Exit the process once a configured cluster has finished shutting down.
    pub exit_on_shutdown: bool,

    /// How long `shutdown` waits for the cascade-stop to drain.
    pub shutdown_grace_period: Duration,

    /// Bound on the per-member resolved-identity cache
    /// (`cluster::PidCache`) — not named in the original Runtime
    /// Configuration list but needed to size that collaborator.
    pub pid_cache_capacity: NonZeroUsize,

    /// Retry attempts for `ClusterContext::request` within its deadline.
    pub cluster_request_attempts: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            dead_letter_request_logging: false,
            developer_supervision_logging: false,
            blocked_member_duration: DEFAULT_BLOCKED_MEMBER_DURATION,
            actor_request_timeout: DEFAULT_ACTOR_REQUEST_TIMEOUT,
            start_deadline: DEFAULT_START_DEADLINE,
            throughput: DEFAULT_THROUGHPUT,
            exit_on_shutdown: false,
            shutdown_grace_period: DEFAULT_SHUTDOWN_GRACE_PERIOD,
            pid_cache_capacity: DEFAULT_PID_CACHE_CAPACITY,
            cluster_request_attempts: DEFAULT_CLUSTER_REQUEST_ATTEMPTS,
        }
    }
}

impl SystemConfig {
    /// Start building a non-default configuration.
    pub fn builder() -> SystemConfigBuilder {
        SystemConfigBuilder::default()
    }

    fn validate(&self) -> Result<(), SystemError> {
        if self.actor_request_timeout.is_zero() {
            return Err(SystemError::ConfigError("actor_request_timeout must be > 0".into()));
        }
        if self.start_deadline.is_zero() {
            return Err(SystemError::ConfigError("start_deadline must be > 0".into()));
        }
        if self.throughput == 0 {
            return Err(SystemError::ConfigError("throughput must be > 0".into()));
        }
        if self.shutdown_grace_period.is_zero() {
            return Err(SystemError::ConfigError("shutdown_grace_period must be > 0".into()));
        }
        if self.cluster_request_attempts == 0 {
            return Err(SystemError::ConfigError("cluster_request_attempts must be > 0".into()));
        }
        Ok(())
    }
}

/// Fluent builder for [`SystemConfig`].
#[derive(Debug, Default)]
pub struct SystemConfigBuilder {
    config: SystemConfig,
}

impl SystemConfigBuilder {
    pub fn with_dead_letter_request_logging(mut self, enabled: bool) -> Self {
        self.config.dead_letter_request_logging = enabled;
        self
    }

    pub fn with_developer_supervision_logging(mut self, enabled: bool) -> Self {
        self.config.developer_supervision_logging = enabled;
        self
    }

    pub fn with_blocked_member_duration(mut self, duration: Duration) -> Self {
        self.config.blocked_member_duration = duration;
        self
    }

    pub fn with_actor_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.actor_request_timeout = timeout;
        self
    }

    pub fn with_start_deadline(mut self, deadline: Duration) -> Self {
        self.config.start_deadline = deadline;
        self
    }

    pub fn with_throughput(mut self, throughput: usize) -> Self {
        self.config.throughput = throughput;
        self
    }

    pub fn with_exit_on_shutdown(mut self, enabled: bool) -> Self {
        self.config.exit_on_shutdown = enabled;
        self
    }

    pub fn with_shutdown_grace_period(mut self, duration: Duration) -> Self {
        self.config.shutdown_grace_period = duration;
        self
    }

    pub fn with_pid_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.config.pid_cache_capacity = capacity;
        self
    }

    pub fn with_cluster_request_attempts(mut self, attempts: u32) -> Self {
        self.config.cluster_request_attempts = attempts;
        self
    }

    /// Validate and produce the final [`SystemConfig`].
    pub fn build(self) -> Result<SystemConfig, SystemError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();
        assert_eq!(config.blocked_member_duration, Duration::from_secs(3600));
        assert_eq!(config.throughput, DEFAULT_THROUGHPUT);
        assert!(!config.exit_on_shutdown);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SystemConfig::builder()
            .with_actor_request_timeout(Duration::from_secs(1))
            .with_throughput(50)
            .with_exit_on_shutdown(true)
            .build()
            .unwrap();
        assert_eq!(config.actor_request_timeout, Duration::from_secs(1));
        assert_eq!(config.throughput, 50);
        assert!(config.exit_on_shutdown);
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = SystemConfig::builder().with_actor_request_timeout(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_throughput() {
        let result = SystemConfig::builder().with_throughput(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = SystemConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.actor_request_timeout, restored.actor_request_timeout);
    }
}
