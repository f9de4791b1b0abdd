//! Event bus for the Crawl dungeon generator.
//!
//! Systems talk to each other by raising [`GameEvent`]s instead of calling
//! each other directly. Delivery is synchronous: [`EventBus::raise`] runs
//! every listener before it returns and hands the event back, so the caller
//! can see whether any listener cancelled it.
//!
//! # Modules
//!
//! - [`bus`] -- [`EventBus`], subscription bookkeeping, and priorities.
//! - [`event`] -- [`GameEvent`], [`EventKind`], and concrete event payloads.

pub mod bus;
pub mod event;

pub use bus::{EventBus, Priority, SubscriptionId};
pub use event::{EventKind, GameEvent, WorldLockChangeEvent};
