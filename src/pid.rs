//! Process identifiers: the opaque, structural-equality addresses actors are known by.
//!
//! A [`Pid`] never owns or keeps alive the process it names. It is a value:
//! cheap to clone, safe to hold past the lifetime of the process it once
//! pointed to (sends to a dead `Pid` simply land on the dead-letter sink).

// Layer 1: Standard library imports
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::process::Process;
use crate::util::ProcessId;

/// Marks the local system's own address so [`Pid::is_local`] can short-circuit
/// registry lookups without going through the remote-handler chain.
pub const LOCAL_ADDRESS: &str = "nonhost";

/// Network location a [`Pid`] resolves through.
///
/// `Local` is the fast path: the owning `ActorSystem` consults its own
/// process registry directly. Any other value is handed to a remote-handler
/// collaborator (see the crate's `RemoteTransport` interface) keyed by this
/// string, typically `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// The address of the local system.
    pub fn local() -> Self {
        Self(LOCAL_ADDRESS.to_string())
    }

    /// Construct a remote address, e.g. `"10.0.0.4:8090"`.
    pub fn remote(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Whether this address denotes the local system.
    pub fn is_local(&self) -> bool {
        self.0 == LOCAL_ADDRESS
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable `(address, id)` pair plus an opaque, lazily-resolved local
/// process handle.
///
/// Equality and hashing are structural on `(address, id)` only — the cached
/// handle never participates, so two `Pid`s naming the same process are
/// always equal regardless of which one has already resolved its cache.
///
/// # Example
///
/// ```rust
/// use nexusrt::pid::{Address, Pid};
/// use nexusrt::util::ProcessId;
///
/// let id = ProcessId::new();
/// let a = Pid::new(Address::local(), id);
/// let b = Pid::new(Address::local(), id);
/// assert_eq!(a, b);
/// ```
#[derive(Clone)]
pub struct Pid {
    address: Address,
    id: ProcessId,
    cache: Arc<OnceLock<Weak<dyn Process>>>,
}

impl Pid {
    /// Construct a `Pid` with no cached handle.
    pub fn new(address: Address, id: ProcessId) -> Self {
        Self {
            address,
            id,
            cache: Arc::new(OnceLock::new()),
        }
    }

    /// Construct a local `Pid` already bound to its process handle, as done
    /// at spawn time — avoids a registry round trip on the very next send.
    pub fn with_handle(id: ProcessId, handle: Arc<dyn Process>) -> Self {
        let cache = Arc::new(OnceLock::new());
        let _ = cache.set(Arc::downgrade(&handle));
        Self {
            address: Address::local(),
            id,
            cache,
        }
    }

    /// The address this `Pid` resolves through.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The local process id component.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// True if this `Pid`'s address matches the local system's own address.
    pub fn is_local(&self) -> bool {
        self.address.is_local()
    }

    /// Return the cached process handle if it is set and still alive.
    pub fn cached(&self) -> Option<Arc<dyn Process>> {
        self.cache.get().and_then(Weak::upgrade)
    }

    /// Populate (or refresh) the cached handle. Subsequent clones of this
    /// `Pid` observe the update since the cache cell is shared.
    pub fn bind(&self, handle: Arc<dyn Process>) {
        // OnceLock can only be set once; once stale, the registry lookup
        // path in `ProcessRegistry::resolve` re-creates a fresh Pid rather
        // than rebinding this cell, so a silent no-op here is correct.
        let _ = self.cache.set(Arc::downgrade(&handle));
    }
}

impl PartialEq for Pid {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.id == other.id
    }
}

impl Eq for Pid {}

impl Hash for Pid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.id.hash(state);
    }
}

impl Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pid")
            .field("address", &self.address)
            .field("id", &self.id)
            .finish()
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.id)
    }
}

impl Serialize for Pid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Pid", 2)?;
        s.serialize_field("address", &self.address)?;
        s.serialize_field("id", &self.id)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Pid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wire {
            address: Address,
            id: ProcessId,
        }
        let wire = Wire::deserialize(deserializer)?;
        Ok(Pid::new(wire.address, wire.id))
    }
}

use serde::Deserializer;
