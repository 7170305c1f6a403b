//! One-shot future processes backing `ActorContext::ask`/`cluster.request`.

pub mod ask;

pub use ask::{ask, AskError, AskProcess};
