//! Observer registry keyed by [`EventKind`].
//!
//! Listeners are delivered in [`Priority`] order, and in registration order
//! within a priority. A [`Priority::Monitor`] listener runs after everyone
//! else and therefore sees the final cancellation state of an event.
//!
//! The bus is single-threaded and re-entrancy free: a listener receives the
//! event by `&mut` and cannot reach the bus itself during delivery.

use std::collections::BTreeMap;

use tracing::trace;

use crate::event::{EventKind, GameEvent};

/// Delivery order bucket for a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Runs before all other listeners.
    First,
    /// The default bucket.
    #[default]
    Normal,
    /// Runs after `Normal` listeners.
    Last,
    /// Runs after everything else. Intended for listeners that react to the
    /// final outcome (e.g. whether the event ended up cancelled).
    Monitor,
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

type Callback = Box<dyn FnMut(&mut GameEvent)>;

struct Subscriber {
    id: SubscriptionId,
    priority: Priority,
    callback: Callback,
}

/// Synchronous publish/subscribe hub.
#[derive(Default)]
pub struct EventBus {
    /// Listeners per kind, kept sorted by priority (stable within a bucket).
    subscribers: BTreeMap<EventKind, Vec<Subscriber>>,
    /// Next subscription id to hand out.
    next_id: u64,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let counts: BTreeMap<EventKind, usize> = self
            .subscribers
            .iter()
            .map(|(kind, subs)| (*kind, subs.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `kind`.
    pub fn subscribe<F>(
        &mut self,
        kind: EventKind,
        priority: Priority,
        callback: F,
    ) -> SubscriptionId
    where
        F: FnMut(&mut GameEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let list = self.subscribers.entry(kind).or_default();
        // Insert after the last listener of the same or earlier priority so
        // registration order is preserved inside a bucket.
        let at = list.partition_point(|s| s.priority <= priority);
        list.insert(
            at,
            Subscriber {
                id,
                priority,
                callback: Box::new(callback),
            },
        );

        trace!(%id, ?kind, ?priority, "Listener subscribed");
        id
    }

    /// Remove a listener. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                trace!(%id, "Listener unsubscribed");
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every listener of its kind, in order, and return
    /// it so the caller can inspect cancellation.
    ///
    /// Cancellation does not stop delivery; later listeners decide for
    /// themselves whether a cancelled event matters to them.
    pub fn raise(&mut self, event: impl Into<GameEvent>) -> GameEvent {
        let mut event = event.into();
        let kind = event.kind();
        if let Some(list) = self.subscribers.get_mut(&kind) {
            for subscriber in list.iter_mut() {
                (subscriber.callback)(&mut event);
            }
            trace!(?kind, listeners = list.len(), cancelled = event.is_cancelled(), "Event raised");
        }
        event
    }

    /// Number of listeners registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::event::WorldLockChangeEvent;

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl FnMut(&mut GameEvent) + 'static {
        let log = Rc::clone(log);
        move |_event: &mut GameEvent| log.borrow_mut().push(name)
    }

    #[test]
    fn delivers_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "a"));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "b"));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "c"));

        bus.raise(WorldLockChangeEvent::new(true));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn priority_beats_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(EventKind::WorldLockChange, Priority::Monitor, recorder(&log, "monitor"));
        bus.subscribe(EventKind::WorldLockChange, Priority::Last, recorder(&log, "last"));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "normal"));
        bus.subscribe(EventKind::WorldLockChange, Priority::First, recorder(&log, "first"));
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "normal2"));

        bus.raise(WorldLockChangeEvent::new(false));
        assert_eq!(
            *log.borrow(),
            vec!["first", "normal", "normal2", "last", "monitor"]
        );
    }

    #[test]
    fn monitor_sees_cancellation() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_in = Rc::clone(&seen);
        bus.subscribe(EventKind::WorldLockChange, Priority::Monitor, move |event| {
            *seen_in.borrow_mut() = Some(event.is_cancelled());
        });
        bus.subscribe(EventKind::WorldLockChange, Priority::Normal, |event| event.cancel());

        let out = bus.raise(WorldLockChangeEvent::new(false));
        assert!(out.is_cancelled());
        assert_eq!(*seen.borrow(), Some(true));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = bus.subscribe(EventKind::WorldLockChange, Priority::Normal, recorder(&log, "a"));
        assert_eq!(bus.subscriber_count(EventKind::WorldLockChange), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(EventKind::WorldLockChange), 0);

        bus.raise(WorldLockChangeEvent::new(true));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn raise_without_listeners_returns_event() {
        let mut bus = EventBus::new();
        let out = bus.raise(WorldLockChangeEvent::new(true));
        assert!(!out.is_cancelled());
        assert!(out.as_world_lock_change().unwrap().is_locked());
    }
}
