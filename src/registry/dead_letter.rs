//! Bounded in-memory recorder for dead-letter events.
//!
//! Independent of whatever event-stream subscribers the system wires up —
//! this is the always-on diagnostic tail backing `DeadLetterRequestLogging`.

// Layer 1: Standard library imports
use std::collections::VecDeque;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tracing::debug;

// Layer 3: Internal module imports
use crate::process::DeadLetterEvent;

/// Keeps the most recent `capacity` dead-letter events.
pub struct DeadLetterRecorder {
    capacity: usize,
    events: Mutex<VecDeque<DeadLetterEvent>>,
}

impl DeadLetterRecorder {
    /// A recorder retaining at most `capacity` most-recent events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Record an event, evicting the oldest entry if at capacity.
    pub fn record(&self, event: DeadLetterEvent) {
        debug!(target = %event.target, message_type = event.message_type, "dead letter recorded");
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// A snapshot of the currently retained events, oldest first.
    pub fn snapshot(&self) -> Vec<DeadLetterEvent> {
        self.events.lock().iter().cloned().collect()
    }
}
