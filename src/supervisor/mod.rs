//! Supervision: restart statistics and the strategies that consult them to
//! decide a failed child's fate (resume, restart, stop, or escalate).
//!
//! # Components
//!
//! - [`RestartStatistics`] - sliding-window failure-timestamp counter
//! - [`SupervisionStrategy`] - `handle_failure` trait implemented by
//!   `OneForOne`, `AllForOne`, `ExponentialBackoff`, `AlwaysRestart`,
//!   `AlwaysStop`, and `Escalate`

pub mod error;
pub mod stats;
pub mod strategy;

pub use error::SupervisorError;
pub use stats::RestartStatistics;
pub use strategy::{
    AllForOne, AlwaysRestart, AlwaysStop, Directive, Escalate, ExponentialBackoff, OneForOne,
    SupervisionStrategy,
};
