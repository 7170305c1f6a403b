//! Supervision strategies: given a failed child's restart history, decide
//! whether to resume it, restart it, stop it, or escalate to the parent
//! supervisor (§4.3).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use rand::Rng;

// Layer 3: Internal module imports
use super::stats::RestartStatistics;
use crate::message::Failure;
use crate::pid::Pid;

/// Whether a restart decision applies only to the failed child, or to all
/// of the supervisor's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Restart only the failed child.
    One,
    /// Stop and restart every child the supervisor manages.
    All,
}

/// What a supervisor should do about a failed child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// Leave the child's state untouched and let it keep processing.
    Resume,
    /// Stop and recreate the child, waiting `delay` first if present.
    Restart { delay: Option<Duration> },
    /// Stop the child permanently; it is not recreated.
    Stop,
    /// This supervisor cannot handle the failure; forward it to its own parent.
    Escalate,
}

/// Decides a [`Directive`] for a failed child given its restart history.
///
/// Implemented by the concrete strategies below and by any user-supplied
/// type — the trait is the extension point named in the design notes on
/// supervisor-as-interface.
pub trait SupervisionStrategy: Send + Sync {
    /// Decide what to do about `child`'s failure.
    ///
    /// `stats` reflects the child's history *before* this failure is
    /// recorded — callers that want the decision informed by this failure
    /// too should call `stats.record_failure()` first.
    fn handle_failure(&self, supervisor: &Pid, failure: &Failure) -> Directive;

    /// Whether the decision applies to the failed child alone or to all of
    /// the supervisor's children.
    fn scope(&self) -> Scope {
        Scope::One
    }
}

/// Restart only the child that failed, unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneForOne;

impl SupervisionStrategy for OneForOne {
    fn handle_failure(&self, _supervisor: &Pid, _failure: &Failure) -> Directive {
        Directive::Restart { delay: None }
    }
}

/// Restart every sibling whenever any one of them fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllForOne;

impl SupervisionStrategy for AllForOne {
    fn handle_failure(&self, _supervisor: &Pid, _failure: &Failure) -> Directive {
        Directive::Restart { delay: None }
    }

    fn scope(&self) -> Scope {
        Scope::All
    }
}

/// Restart with a delay of `min(2^failures, cap)` seconds, jittered by
/// ±25%, resetting the failure count once the child has been quiet for
/// `idle_reset` (default one hour, per §4.3/§8's backoff bound).
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    /// Upper bound on the exponent; delay never exceeds `2^cap` seconds.
    pub cap: u32,
    /// How long a child must run failure-free before the counter resets.
    pub idle_reset: Duration,
}

impl ExponentialBackoff {
    /// A backoff strategy capped at `2^cap` seconds with a one-hour idle reset.
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            idle_reset: Duration::from_secs(3600),
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(6)
    }
}

impl SupervisionStrategy for ExponentialBackoff {
    fn handle_failure(&self, _supervisor: &Pid, failure: &Failure) -> Directive {
        let failures = failure.stats.consecutive_failures(self.idle_reset);
        let base = 2u64.saturating_pow(failures.min(self.cap));
        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        let seconds = (base as f64) * (1.0 + jitter);
        Directive::Restart {
            delay: Some(Duration::from_secs_f64(seconds)),
        }
    }
}

/// Always restart, with no delay, regardless of restart history.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRestart;

impl SupervisionStrategy for AlwaysRestart {
    fn handle_failure(&self, _supervisor: &Pid, _failure: &Failure) -> Directive {
        Directive::Restart { delay: None }
    }
}

/// Always stop the failed child; it is never recreated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStop;

impl SupervisionStrategy for AlwaysStop {
    fn handle_failure(&self, _supervisor: &Pid, _failure: &Failure) -> Directive {
        Directive::Stop
    }
}

/// Never decide locally; always forward the failure to the parent supervisor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Escalate;

impl SupervisionStrategy for Escalate {
    fn handle_failure(&self, _supervisor: &Pid, _failure: &Failure) -> Directive {
        Directive::Escalate
    }
}
