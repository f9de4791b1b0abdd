//! Contact callbacks.
//!
//! A world reports a contact once when two bodies start touching and once
//! when they stop. Pairs are always reported with the lower handle first.

use std::collections::BTreeSet;

use tracing::trace;

use crate::body::BodyHandle;

/// An unordered pair of touching bodies, stored lower handle first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactPair {
    /// The body with the lower handle.
    pub a: BodyHandle,
    /// The body with the higher handle.
    pub b: BodyHandle,
}

impl ContactPair {
    /// Build a pair in canonical order.
    pub fn new(first: BodyHandle, second: BodyHandle) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// Whether `handle` is one of the two bodies.
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }
}

/// Receives begin/end contact notifications from a physics world.
pub trait ContactListener {
    /// Two bodies started touching.
    fn begin_contact(&mut self, pair: ContactPair);

    /// Two bodies stopped touching, or one of them was removed.
    fn end_contact(&mut self, pair: ContactPair);
}

/// Collision handler installed on every level's world.
///
/// Keeps the set of currently touching pairs and running totals, and logs
/// each transition at `trace` level.
#[derive(Debug, Clone, Default)]
pub struct DefaultCollisionHandler {
    active: BTreeSet<ContactPair>,
    began: u64,
    ended: u64,
}

impl DefaultCollisionHandler {
    /// Create a handler with no recorded contacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs currently touching.
    pub const fn active(&self) -> &BTreeSet<ContactPair> {
        &self.active
    }

    /// Total contacts begun since creation.
    pub const fn began(&self) -> u64 {
        self.began
    }

    /// Total contacts ended since creation.
    pub const fn ended(&self) -> u64 {
        self.ended
    }
}

impl ContactListener for DefaultCollisionHandler {
    fn begin_contact(&mut self, pair: ContactPair) {
        trace!(a = %pair.a, b = %pair.b, "Contact began");
        if self.active.insert(pair) {
            self.began = self.began.saturating_add(1);
        }
    }

    fn end_contact(&mut self, pair: ContactPair) {
        trace!(a = %pair.a, b = %pair.b, "Contact ended");
        if self.active.remove(&pair) {
            self.ended = self.ended.saturating_add(1);
        }
    }
}
