//! `ProcessRegistry`: the flat `ProcessId -> Process` map and the
//! `SystemHandle` implementation every `ActorContext::spawn` is driven
//! through (§4.4).

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::dead_letter::DeadLetterRecorder;
use super::error::RegistryError;
use crate::actor::SystemHandle;
use crate::message::StopReason;
use crate::pid::{Address, Pid};
use crate::process::{DeadLetterEvent, DeadLetterProcess, DeadLetterPublisher, Process};
use crate::supervisor::SupervisionStrategy;
use crate::util::ProcessId;

/// How many recently-terminated local ids the registry remembers so a
/// late `watch` still resolves to `Terminated` instead of going silent.
const TOMBSTONE_CAPACITY: usize = 1024;

/// Resolves a `Pid` whose `Address` is not the local system's own.
///
/// The registry consults this for any non-local lookup; cluster membership
/// is the intended implementor. With none configured, remote addresses
/// always fall through to the dead-letter sink.
pub trait RemoteHandler: Send + Sync {
    /// Resolve a remote `(address, id)` pair to a process handle, if reachable.
    fn resolve(&self, address: &Address, id: ProcessId) -> Option<Arc<dyn Process>>;
}

/// A flat, concurrent `ProcessId -> Process` map with `next_id()` minting
/// monotonically-unique local ids, a cached-handle-first resolution path,
/// and a bounded dead-letter recorder backing every unresolved delivery.
pub struct ProcessRegistry {
    processes: DashMap<ProcessId, Arc<dyn Process>>,
    remote: RwLock<Option<Arc<dyn RemoteHandler>>>,
    dead_letter: Arc<DeadLetterProcess>,
    recorder: Arc<DeadLetterRecorder>,
    tombstones: DashMap<ProcessId, StopReason>,
    tombstone_order: Mutex<VecDeque<ProcessId>>,
    ask_deadline: Duration,
    default_strategy: Arc<dyn SupervisionStrategy>,
}

impl ProcessRegistry {
    /// A registry with the given `ask` default deadline and the strategy
    /// applied to root-level actors (no parent to escalate failures to).
    pub fn new(ask_deadline: Duration, default_strategy: Arc<dyn SupervisionStrategy>) -> Arc<Self> {
        let recorder = Arc::new(DeadLetterRecorder::new(256));
        let for_publisher = recorder.clone();
        let publisher: DeadLetterPublisher = Arc::new(move |event: DeadLetterEvent| {
            for_publisher.record(event);
        });
        Arc::new(Self {
            processes: DashMap::new(),
            remote: RwLock::new(None),
            dead_letter: Arc::new(DeadLetterProcess::with_publisher(publisher)),
            recorder,
            tombstones: DashMap::new(),
            tombstone_order: Mutex::new(VecDeque::with_capacity(TOMBSTONE_CAPACITY)),
            ask_deadline,
            default_strategy,
        })
    }

    /// Wire a collaborator that resolves non-local `Pid`s, typically cluster
    /// membership. Replaces any previously configured handler.
    pub fn set_remote_handler(&self, handler: Arc<dyn RemoteHandler>) {
        *self.remote.write() = Some(handler);
    }

    /// Register `process` under a caller-chosen `id`, failing rather than
    /// overwriting if the id is already occupied. Used for named/singleton
    /// registration where the id isn't freshly minted by `next_id()`.
    pub fn register_named(&self, id: ProcessId, process: Arc<dyn Process>) -> Result<Pid, RegistryError> {
        if self.processes.contains_key(&id) {
            return Err(RegistryError::NameExists(id));
        }
        self.processes.insert(id, process.clone());
        Ok(Pid::with_handle(id, process))
    }

    /// The most recent dead-letter events, oldest first.
    pub fn recent_dead_letters(&self) -> Vec<DeadLetterEvent> {
        self.recorder.snapshot()
    }

    /// Number of currently registered processes.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }
}

impl SystemHandle for ProcessRegistry {
    fn next_id(&self) -> ProcessId {
        ProcessId::new()
    }

    fn register(&self, id: ProcessId, process: Arc<dyn Process>) -> Pid {
        match self.register_named(id, process.clone()) {
            Ok(pid) => pid,
            Err(_) => {
                // `id` is always freshly minted by `next_id()` on this path,
                // so collision here is unreachable in practice; keep the
                // registry usable rather than silently dropping the process.
                warn!(%id, "registry id collision on mint-fresh path; overwriting");
                self.processes.insert(id, process.clone());
                Pid::with_handle(id, process)
            }
        }
    }

    fn unregister(&self, pid: &Pid) {
        self.processes.remove(&pid.id());
    }

    fn resolve(&self, pid: &Pid) -> Arc<dyn Process> {
        if let Some(cached) = pid.cached() {
            return cached;
        }
        if pid.is_local() {
            return self
                .processes
                .get(&pid.id())
                .map(|entry| entry.clone())
                .unwrap_or_else(|| self.dead_letter.clone());
        }
        let remote = self.remote.read().clone();
        if let Some(handler) = remote {
            if let Some(process) = handler.resolve(pid.address(), pid.id()) {
                return process;
            }
        }
        debug!(%pid, "no remote handler or remote resolution miss; routing to dead letter");
        self.dead_letter.clone()
    }

    fn publish_dead_letter(&self, event: DeadLetterEvent) {
        self.recorder.record(event);
    }

    fn record_termination(&self, id: ProcessId, reason: StopReason) {
        self.tombstones.insert(id, reason);
        let mut order = self.tombstone_order.lock();
        if order.len() >= TOMBSTONE_CAPACITY {
            if let Some(evicted) = order.pop_front() {
                self.tombstones.remove(&evicted);
            }
        }
        order.push_back(id);
    }

    fn last_stop_reason(&self, id: ProcessId) -> Option<StopReason> {
        self.tombstones.get(&id).map(|entry| entry.clone())
    }

    fn ask_deadline(&self) -> Duration {
        self.ask_deadline
    }

    fn default_strategy(&self) -> Arc<dyn SupervisionStrategy> {
        self.default_strategy.clone()
    }
}
