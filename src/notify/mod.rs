//! Change notification orchestrator.
//!
//! The map raises one coarse "changed" signal per mutation. Consumers either
//! subscribe a callback or poll the dirty flag from their render loop.

mod core;

pub use self::core::{ChangeNotifier, Subscribers, SubscriptionId};
