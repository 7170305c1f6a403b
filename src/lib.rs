//! An actor runtime with a virtual-actor cluster identity layer on top.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use nexusrt::prelude::*;
//!
//! #[derive(Debug)]
//! enum CounterMsg {
//!     Increment,
//!     GetCount(tokio::sync::oneshot::Sender<u64>),
//! }
//!
//! struct CounterActor {
//!     count: u64,
//! }
//!
//! #[async_trait::async_trait]
//! impl Actor for CounterActor {
//!     type Message = CounterMsg;
//!
//!     async fn receive(&mut self, msg: CounterMsg, ctx: &mut ActorContext<Self>) {
//!         match msg {
//!             CounterMsg::Increment => self.count += 1,
//!             CounterMsg::GetCount(reply) => {
//!                 let _ = reply.send(self.count);
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = ActorSystem::new(SystemConfig::default());
//!     let pid = system.spawn(Props::from_producer(|| CounterActor { count: 0 })).await.unwrap();
//!     system.send(&pid, CounterMsg::Increment).unwrap();
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Core actor system
//! - [`pid`] - process identity (`Pid`, `Address`)
//! - [`process`] - the `Process` trait and dead-letter sink
//! - [`message`] - `Message`, `Envelope`, the system-message protocol
//! - [`mailbox`] - the dual-queue, single-consumer dispatch loop
//! - [`actor`] - `Actor`, `ActorContext`, `Props`, the lifecycle state machine
//!
//! ## Fault tolerance
//! - [`supervisor`] - restart statistics and supervision strategies
//! - [`registry`] - process registry and dead-letter wiring
//! - [`futures`] - one-shot ask/request futures
//! - [`router`] - routee-set message distribution
//! - [`events`] - the process-wide event stream
//!
//! ## Distribution
//! - [`cluster`] - virtual-actor cluster identity layer
//!
//! ## Infrastructure
//! - [`system`] - `ActorSystem`, configuration, error types
//! - [`util`] - identifiers and serde helpers

pub mod actor;
pub mod cluster;
pub mod events;
pub mod futures;
pub mod mailbox;
pub mod message;
pub mod pid;
pub mod process;
pub mod registry;
pub mod router;
pub mod supervisor;
pub mod system;
pub mod util;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorState, Producer, Props, SystemHandle};
pub use cluster::{
    Activator, BlockList, ClusterContext, ClusterError, ClusterIdentity, Member, MembershipProvider,
    PartitionIdentityActor, PidCache, PlacementPolicy, Topology, TopologyApplied,
};
pub use events::{ActorLifecycleEvent, EventStream, MailboxEvent, Severity, Subscription, SupervisionEvent};
pub use futures::{ask, AskError, AskProcess};
pub use mailbox::{Dispatcher, Invoker, Mailbox, MailboxCapacity, MailboxError, TokioDispatcher};
pub use message::{downcast_message, AutoRespond, Envelope, EnvelopeMeta, Message};
pub use message::{Failure, StopReason, SystemEnvelope, SystemMessage};
pub use pid::{Address, Pid};
pub use process::{DeadLetterEvent, DeadLetterProcess, Process};
pub use registry::{ProcessRegistry, RegistryError, RemoteHandler};
pub use router::{GetRoutees, Router, RouterManagement, Routees, RoutingStrategy};
pub use supervisor::RestartStatistics;
pub use system::{ActorSystem, SystemBuilder, SystemConfig, SystemConfigBuilder, SystemError};
pub use util::{MessageId, ProcessId};
