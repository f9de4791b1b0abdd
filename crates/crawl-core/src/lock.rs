//! The world-lock protocol.
//!
//! The lock is advisory. [`set_world_locked`] flips the flag held in
//! [`WorldHelper`] and broadcasts a [`WorldLockChangeEvent`] on the bus.
//! While the flag is up, body removals are queued in the helper instead of
//! touching the world. The cleanup listener drains that queue on every
//! unlock nobody cancelled.

use std::cell::RefCell;
use std::rc::Rc;

use crawl_events::{EventBus, GameEvent, WorldLockChangeEvent};
use crawl_physics::{BodyHandle, BodyRegistry, PhysicsWorld};
use tracing::{debug, warn};

/// The physics world shared between a level and its cleanup listener.
pub type SharedWorld = Rc<RefCell<Box<dyn PhysicsWorld>>>;

/// Lock state shared between a level, its cleanup listener, and any other
/// system that needs to defer world mutation.
pub type SharedHelper = Rc<RefCell<WorldHelper>>;

/// Lock flag plus work deferred until the world unlocks.
#[derive(Debug, Default)]
pub struct WorldHelper {
    locked: bool,
    pending: Vec<BodyHandle>,
    cleanups: u64,
    suppressed: u64,
}

impl WorldHelper {
    /// An unlocked helper with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the world is currently being stepped.
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Bodies waiting for the next cleanup.
    pub fn pending(&self) -> &[BodyHandle] {
        &self.pending
    }

    /// Number of cleanups that have run.
    pub const fn cleanups(&self) -> u64 {
        self.cleanups
    }

    /// Number of unlocks whose cleanup was cancelled.
    pub const fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// Queue a body for removal at the next uncancelled unlock.
    pub fn schedule_removal(&mut self, handle: BodyHandle) {
        if !self.pending.contains(&handle) {
            self.pending.push(handle);
        }
    }

    fn take_pending(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.pending)
    }
}

/// Flip the lock flag and broadcast the change.
///
/// The flag is updated before listeners run, so they observe the new state.
/// Returns the event as the last listener left it.
pub fn set_world_locked(
    helper: &RefCell<WorldHelper>,
    bus: &mut EventBus,
    locked: bool,
) -> WorldLockChangeEvent {
    helper.borrow_mut().locked = locked;
    let GameEvent::WorldLockChange(event) = bus.raise(WorldLockChangeEvent::new(locked));
    event
}

/// The listener a level subscribes for deferred cleanup.
///
/// Runs only on unlocks that arrive uncancelled. It removes every queued
/// body from the world.
pub fn cleanup_listener(
    helper: SharedHelper,
    world: SharedWorld,
) -> impl FnMut(&mut GameEvent) + 'static {
    move |event: &mut GameEvent| {
        let Some(change) = event.as_world_lock_change() else {
            return;
        };
        if change.is_locked() {
            return;
        }
        if change.is_cancelled() {
            let mut helper = helper.borrow_mut();
            helper.suppressed = helper.suppressed.saturating_add(1);
            debug!(pending = helper.pending.len(), "Deferred cleanup cancelled");
            return;
        }

        let pending = helper.borrow_mut().take_pending();
        let mut removed = 0_usize;
        {
            let mut world = world.borrow_mut();
            for handle in pending {
                match world.remove_body(handle) {
                    Ok(()) => removed = removed.saturating_add(1),
                    Err(err) => warn!(%handle, %err, "Queued body could not be removed"),
                }
            }
        }
        let mut helper = helper.borrow_mut();
        helper.cleanups = helper.cleanups.saturating_add(1);
        if removed > 0 {
            debug!(removed, "Deferred cleanup ran");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crawl_events::{EventKind, Priority};
    use crawl_physics::{BodyDef, RapierWorld};
    use glam::Vec2;

    use super::*;

    fn setup() -> (SharedHelper, SharedWorld, EventBus) {
        let helper: SharedHelper = Rc::new(RefCell::new(WorldHelper::new()));
        let boxed: Box<dyn PhysicsWorld> = Box::new(RapierWorld::default());
        let world: SharedWorld = Rc::new(RefCell::new(boxed));
        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::WorldLockChange,
            Priority::Monitor,
            cleanup_listener(Rc::clone(&helper), Rc::clone(&world)),
        );
        (helper, world, bus)
    }

    fn add_body(world: &SharedWorld) -> BodyHandle {
        world
            .borrow_mut()
            .add_body(BodyDef::fixed(Vec2::ZERO, Vec2::ONE))
            .unwrap()
    }

    #[test]
    fn flag_is_visible_to_listeners() {
        let (helper, _world, mut bus) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (h, s) = (Rc::clone(&helper), Rc::clone(&seen));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, move |_event: &mut GameEvent| {
            s.borrow_mut().push(h.borrow().is_locked());
        });

        set_world_locked(&helper, &mut bus, true);
        assert!(helper.borrow().is_locked());
        set_world_locked(&helper, &mut bus, false);
        assert!(!helper.borrow().is_locked());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn unlock_drains_queue() {
        let (helper, world, mut bus) = setup();
        let handle = add_body(&world);

        set_world_locked(&helper, &mut bus, true);
        helper.borrow_mut().schedule_removal(handle);
        helper.borrow_mut().schedule_removal(handle);
        assert_eq!(helper.borrow().pending().len(), 1);
        // Locking again does not clean up.
        set_world_locked(&helper, &mut bus, true);
        assert_eq!(world.borrow().body_count(), 1);

        set_world_locked(&helper, &mut bus, false);
        assert_eq!(world.borrow().body_count(), 0);
        assert!(helper.borrow().pending().is_empty());
        assert_eq!(helper.borrow().cleanups(), 1);
    }

    #[test]
    fn cancelled_unlock_keeps_queue() {
        let (helper, world, mut bus) = setup();
        let handle = add_body(&world);
        let cancel = bus.subscribe(
            EventKind::WorldLockChange,
            Priority::Normal,
            |event: &mut GameEvent| {
                if event.as_world_lock_change().is_some_and(|e| !e.is_locked()) {
                    event.cancel();
                }
            },
        );

        set_world_locked(&helper, &mut bus, true);
        helper.borrow_mut().schedule_removal(handle);
        let event = set_world_locked(&helper, &mut bus, false);

        assert!(event.is_cancelled());
        // The flag still drops; only the cleanup is skipped.
        assert!(!helper.borrow().is_locked());
        assert_eq!(world.borrow().body_count(), 1);
        assert_eq!(helper.borrow().suppressed(), 1);
        assert_eq!(helper.borrow().cleanups(), 0);

        bus.unsubscribe(cancel);
        set_world_locked(&helper, &mut bus, false);
        assert_eq!(world.borrow().body_count(), 0);
    }
}
