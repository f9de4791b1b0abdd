//! Event types carried by the [`EventBus`](crate::EventBus).

/// Discriminant used to route events to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The physics world was locked for stepping, or unlocked afterwards.
    WorldLockChange,
}

/// The physics world lock changed state.
///
/// Raised twice per level tick: once with `locked == true` right before the
/// physics step, once with `locked == false` after every room has ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldLockChangeEvent {
    locked: bool,
    cancelled: bool,
}

impl WorldLockChangeEvent {
    /// Create a new, uncancelled lock change event.
    pub const fn new(locked: bool) -> Self {
        Self {
            locked,
            cancelled: false,
        }
    }

    /// Whether the world is now locked.
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether a listener has cancelled this event.
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Cancel the event. Cancelling an unlock suppresses deferred cleanup
    /// for that frame; the lock state itself still changes.
    pub const fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Every event that can travel over the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// See [`WorldLockChangeEvent`].
    WorldLockChange(WorldLockChangeEvent),
}

impl GameEvent {
    /// The routing kind of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::WorldLockChange(_) => EventKind::WorldLockChange,
        }
    }

    /// Whether a listener cancelled the event.
    pub const fn is_cancelled(&self) -> bool {
        match self {
            Self::WorldLockChange(e) => e.is_cancelled(),
        }
    }

    /// Cancel the event.
    pub const fn cancel(&mut self) {
        match self {
            Self::WorldLockChange(e) => e.cancel(),
        }
    }

    /// Borrow the payload as a lock change, if it is one.
    pub const fn as_world_lock_change(&self) -> Option<&WorldLockChangeEvent> {
        match self {
            Self::WorldLockChange(e) => Some(e),
        }
    }
}

impl From<WorldLockChangeEvent> for GameEvent {
    fn from(event: WorldLockChangeEvent) -> Self {
        Self::WorldLockChange(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_event_starts_uncancelled() {
        let event = WorldLockChangeEvent::new(true);
        assert!(event.is_locked());
        assert!(!event.is_cancelled());
    }

    #[test]
    fn cancel_through_game_event() {
        let mut event = GameEvent::from(WorldLockChangeEvent::new(false));
        assert_eq!(event.kind(), EventKind::WorldLockChange);
        event.cancel();
        assert!(event.is_cancelled());
        assert!(
            event
                .as_world_lock_change()
                .is_some_and(|e| e.is_cancelled() && !e.is_locked())
        );
    }
}
