//! `RouterState`: the immutable routee set a running router fans out to (§4.6).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::pid::Pid;

/// The routee set a router dispatches to, plus the counter `RoundRobin`
/// needs. Changes never mutate the set in place — `add_routee`/
/// `remove_routee` build and publish a fresh `Arc<[Pid]>` so an in-flight
/// `routees()` snapshot a strategy is iterating never observes a torn view.
pub struct RouterState {
    routees: RwLock<Arc<[Pid]>>,
    round_robin: AtomicUsize,
}

impl RouterState {
    /// A router state seeded with the given routees.
    pub fn new(routees: Vec<Pid>) -> Self {
        Self {
            routees: RwLock::new(routees.into()),
            round_robin: AtomicUsize::new(0),
        }
    }

    /// A cheap snapshot of the current routee set.
    pub fn routees(&self) -> Arc<[Pid]> {
        self.routees.read().clone()
    }

    /// Add a routee, publishing a new immutable set. No-op if already present.
    pub fn add_routee(&self, pid: Pid) {
        let mut guard = self.routees.write();
        if guard.iter().any(|existing| *existing == pid) {
            return;
        }
        let mut next: Vec<Pid> = guard.to_vec();
        next.push(pid);
        *guard = next.into();
    }

    /// Remove a routee, publishing a new immutable set. No-op if absent.
    pub fn remove_routee(&self, pid: &Pid) {
        let mut guard = self.routees.write();
        let next: Vec<Pid> = guard.iter().filter(|existing| *existing != pid).cloned().collect();
        *guard = next.into();
    }

    /// The next round-robin index into a routee slice of length `len`.
    pub fn next_round_robin_index(&self, len: usize) -> usize {
        self.round_robin.fetch_add(1, Ordering::Relaxed) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::Address;
    use crate::util::ProcessId;

    fn pid() -> Pid {
        Pid::new(Address::local(), ProcessId::new())
    }

    #[test]
    fn test_add_routee_is_idempotent() {
        let state = RouterState::new(vec![]);
        let p = pid();
        state.add_routee(p.clone());
        state.add_routee(p.clone());
        assert_eq!(state.routees().len(), 1);
    }

    #[test]
    fn test_remove_routee() {
        let p1 = pid();
        let p2 = pid();
        let state = RouterState::new(vec![p1.clone(), p2.clone()]);
        state.remove_routee(&p1);
        assert_eq!(state.routees().as_ref(), &[p2]);
    }

    #[test]
    fn test_round_robin_wraps() {
        let state = RouterState::new(vec![pid(), pid(), pid()]);
        let indices: Vec<usize> = (0..4).map(|_| state.next_round_robin_index(3)).collect();
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }
}
