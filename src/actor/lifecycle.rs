//! The actor incarnation state machine (§3 Data Model).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// An actor incarnation's position in its lifecycle.
///
/// ```text
/// Alive --(failure, strategy decides Restart)--> Restarting --> Alive
///   |                                                              |
///   +--(Stop / PoisonPill / parent terminating)--> Stopping -------+
///                                                       |
///                                                       v
///                                                   Stopped
/// ```
///
/// `Restarting` and `Stopping` are both transient: the context always
/// drives them back to `Alive` or forward to `Stopped` without waiting on
/// a second external trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Processing messages normally.
    Alive,
    /// Tearing down the old incarnation and producing a new one.
    Restarting,
    /// Draining children and running `on_stop` before going `Stopped`.
    Stopping,
    /// Terminal. The mailbox is closed and the `Pid` no longer resolves.
    Stopped,
}

impl ActorState {
    /// Whether the incarnation can still accept user messages.
    pub fn accepts_user_messages(&self) -> bool {
        matches!(self, ActorState::Alive)
    }

    /// Whether this is one of the two terminal-bound states.
    pub fn is_terminating(&self) -> bool {
        matches!(self, ActorState::Stopping | ActorState::Stopped)
    }
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Alive
    }
}
