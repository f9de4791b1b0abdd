//! [`RapierWorld`]: the box world backed by `rapier2d`.
//!
//! Every body is one cuboid collider on a rigid body with rotations locked.
//! Rapier reports collision starts and stops through a
//! [`ChannelEventCollector`]; after each step the world drains the channel,
//! maps colliders back to [`BodyHandle`]s, and replays the transitions to
//! the installed [`ContactListener`].
//!
//! Pairs of static bodies never produce contacts.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroUsize;

use crossbeam::channel::{Receiver, unbounded};
use glam::Vec2;
use rapier2d::prelude::{
    ActiveEvents, CCDSolver, ChannelEventCollector, ColliderBuilder, ColliderHandle, ColliderSet,
    CollisionEvent, DefaultBroadPhase, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, NarrowPhase, PhysicsPipeline, RigidBody, RigidBodyBuilder,
    RigidBodyHandle, RigidBodySet, vector,
};
use tracing::{debug, warn};

use crate::body::{Body, BodyDef, BodyHandle, BodyType};
use crate::contact::{ContactListener, ContactPair, DefaultCollisionHandler};
use crate::error::PhysicsError;
use crate::world::{BodyRegistry, PhysicsWorld, StepStats};

/// Standard gravity, pointing down.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.8);

/// Where one of our bodies lives inside rapier.
#[derive(Debug, Clone, Copy)]
struct Slot {
    rigid: RigidBodyHandle,
    collider: ColliderHandle,
    half_extents: Vec2,
    allow_sleep: bool,
}

/// Rapier's pipeline and storage, replaced wholesale on dispose.
struct Simulation {
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl Simulation {
    fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    fn dynamic_bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter().map(|(_, rb)| rb).filter(|rb| rb.is_dynamic())
    }
}

/// A box physics world simulated by rapier.
pub struct RapierWorld {
    gravity: Vec2,
    allow_sleep: bool,
    sim: Simulation,
    events: ChannelEventCollector,
    collisions: Receiver<CollisionEvent>,
    /// Live bodies keyed by handle; handles are strictly increasing.
    slots: BTreeMap<BodyHandle, Slot>,
    owners: HashMap<ColliderHandle, BodyHandle>,
    next_handle: u32,
    /// Pairs touching as of the last step.
    contacts: BTreeSet<ContactPair>,
    listener: Option<Box<dyn ContactListener>>,
    disposed: bool,
}

impl core::fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RapierWorld")
            .field("gravity", &self.gravity)
            .field("allow_sleep", &self.allow_sleep)
            .field("bodies", &self.slots.len())
            .field("contacts", &self.contacts.len())
            .field("has_listener", &self.listener.is_some())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY, true)
    }
}

impl RapierWorld {
    /// Create an empty world with the given gravity and sleep policy.
    pub fn new(gravity: Vec2, allow_sleep: bool) -> Self {
        let (collision_send, collisions) = unbounded();
        let (force_send, _) = unbounded();
        Self {
            gravity,
            allow_sleep,
            sim: Simulation::new(),
            events: ChannelEventCollector::new(collision_send, force_send),
            collisions,
            slots: BTreeMap::new(),
            owners: HashMap::new(),
            next_handle: 0,
            contacts: BTreeSet::new(),
            listener: None,
            disposed: false,
        }
    }

    /// Create a world with a [`DefaultCollisionHandler`] already installed.
    pub fn with_default_handler(gravity: Vec2, allow_sleep: bool) -> Self {
        let mut world = Self::new(gravity, allow_sleep);
        world.set_contact_listener(Box::new(DefaultCollisionHandler::new()));
        world
    }

    /// Pairs touching as of the last step.
    pub const fn contacts(&self) -> &BTreeSet<ContactPair> {
        &self.contacts
    }

    /// Replay the collision events of the last step. Returns how many
    /// contacts began and ended.
    fn drain_collisions(&mut self) -> (usize, usize) {
        let (mut began, mut ended) = (0_usize, 0_usize);
        while let Ok(event) = self.collisions.try_recv() {
            // Colliders of bodies removed since the last step are unknown
            // here; their contacts were already ended by `remove_body`.
            let (Some(&a), Some(&b)) = (
                self.owners.get(&event.collider1()),
                self.owners.get(&event.collider2()),
            ) else {
                continue;
            };
            let pair = ContactPair::new(a, b);
            if event.started() {
                if self.contacts.insert(pair) {
                    began = began.saturating_add(1);
                    if let Some(listener) = self.listener.as_mut() {
                        listener.begin_contact(pair);
                    }
                }
            } else if self.contacts.remove(&pair) {
                ended = ended.saturating_add(1);
                if let Some(listener) = self.listener.as_mut() {
                    listener.end_contact(pair);
                }
            }
        }
        (began, ended)
    }
}

/// Iteration counts arrive as `u32` but rapier counts in `usize`.
fn iterations(count: u32) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

impl BodyRegistry for RapierWorld {
    fn add_body(&mut self, def: BodyDef) -> Result<BodyHandle, PhysicsError> {
        if self.disposed {
            return Err(PhysicsError::Disposed);
        }
        def.validate()?;
        let handle = BodyHandle::from_raw(self.next_handle);
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or(PhysicsError::HandleOverflow)?;

        let builder = match def.body_type {
            BodyType::Static => RigidBodyBuilder::fixed(),
            BodyType::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let rigid_body = builder
            .translation(vector![def.position.x, def.position.y])
            .linvel(vector![def.velocity.x, def.velocity.y])
            .lock_rotations()
            .can_sleep(self.allow_sleep && def.allow_sleep)
            .build();
        let collider = ColliderBuilder::cuboid(def.half_extents.x, def.half_extents.y)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let sim = &mut self.sim;
        let rigid = sim.bodies.insert(rigid_body);
        let collider = sim
            .colliders
            .insert_with_parent(collider, rigid, &mut sim.bodies);

        self.owners.insert(collider, handle);
        self.slots.insert(
            handle,
            Slot {
                rigid,
                collider,
                half_extents: def.half_extents,
                allow_sleep: def.allow_sleep,
            },
        );
        Ok(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let slot = self
            .slots
            .remove(&handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        self.owners.remove(&slot.collider);
        let sim = &mut self.sim;
        sim.bodies.remove(
            slot.rigid,
            &mut sim.islands,
            &mut sim.colliders,
            &mut sim.impulse_joints,
            &mut sim.multibody_joints,
            true,
        );

        let ended: Vec<ContactPair> = self
            .contacts
            .iter()
            .filter(|p| p.involves(handle))
            .copied()
            .collect();
        for pair in &ended {
            self.contacts.remove(pair);
            let other = if pair.a == handle { pair.b } else { pair.a };
            // Whatever rested on the removed body has to fall again.
            if let Some(partner) = self.slots.get(&other)
                && let Some(body) = self.sim.bodies.get_mut(partner.rigid)
                && body.is_dynamic()
            {
                body.wake_up(true);
            }
            if let Some(listener) = self.listener.as_mut() {
                listener.end_contact(*pair);
            }
        }
        Ok(())
    }

    fn body(&self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get(&handle)?;
        let rb = self.sim.bodies.get(slot.rigid)?;
        let (position, velocity) = (rb.translation(), rb.linvel());
        Some(Body {
            handle,
            body_type: if rb.is_dynamic() {
                BodyType::Dynamic
            } else {
                BodyType::Static
            },
            position: Vec2::new(position.x, position.y),
            velocity: Vec2::new(velocity.x, velocity.y),
            half_extents: slot.half_extents,
            allow_sleep: slot.allow_sleep,
            awake: rb.is_dynamic() && !rb.is_sleeping(),
        })
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self
            .slots
            .get(&handle)
            .and_then(|slot| self.sim.bodies.get_mut(slot.rigid))
            .ok_or(PhysicsError::UnknownBody(handle))?;
        body.set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    fn body_handles(&self) -> Vec<BodyHandle> {
        self.slots.keys().copied().collect()
    }

    fn body_count(&self) -> usize {
        self.slots.len()
    }
}

impl PhysicsWorld for RapierWorld {
    /// Advance the simulation.
    ///
    /// `velocity_iterations` becomes rapier's solver iteration count (at
    /// least one) and `position_iterations` its stabilization iteration
    /// count.
    fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
    ) -> StepStats {
        let mut stats = StepStats {
            dt,
            velocity_iterations,
            position_iterations,
            ..StepStats::default()
        };
        if self.disposed {
            warn!("Step requested on a disposed physics world, ignoring");
            return stats;
        }
        if !dt.is_finite() || dt <= 0.0 {
            stats.contacts = self.contacts.len();
            return stats;
        }

        stats.simulated = self
            .sim
            .dynamic_bodies()
            .filter(|rb| !rb.is_sleeping())
            .count();

        let params = IntegrationParameters {
            dt,
            num_solver_iterations: NonZeroUsize::new(iterations(velocity_iterations))
                .unwrap_or(NonZeroUsize::MIN),
            num_internal_stabilization_iterations: iterations(position_iterations),
            ..IntegrationParameters::default()
        };
        let gravity = vector![self.gravity.x, self.gravity.y];
        let sim = &mut self.sim;
        sim.pipeline.step(
            &gravity,
            &params,
            &mut sim.islands,
            &mut sim.broad_phase,
            &mut sim.narrow_phase,
            &mut sim.bodies,
            &mut sim.colliders,
            &mut sim.impulse_joints,
            &mut sim.multibody_joints,
            &mut sim.ccd,
            None,
            &(),
            &self.events,
        );

        let (began, ended) = self.drain_collisions();
        stats.began = began;
        stats.ended = ended;
        stats.contacts = self.contacts.len();
        stats.sleeping = self
            .sim
            .dynamic_bodies()
            .filter(|rb| rb.is_sleeping())
            .count();
        stats
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn allows_sleep(&self) -> bool {
        self.allow_sleep
    }

    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(bodies = self.slots.len(), "Disposing physics world");
        self.sim = Simulation::new();
        while self.collisions.try_recv().is_ok() {}
        self.slots.clear();
        self.owners.clear();
        self.contacts.clear();
        self.listener = None;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Long enough for a resting body to pass rapier's sleep timer.
    const SETTLE_STEPS: usize = 300;

    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<(bool, ContactPair)>>>,
    }

    impl ContactListener for Recorder {
        fn begin_contact(&mut self, pair: ContactPair) {
            self.log.borrow_mut().push((true, pair));
        }

        fn end_contact(&mut self, pair: ContactPair) {
            self.log.borrow_mut().push((false, pair));
        }
    }

    fn floor_and_crate(world: &mut RapierWorld, crate_y: f32) -> (BodyHandle, BodyHandle) {
        let floor = world
            .add_body(BodyDef::fixed(Vec2::ZERO, Vec2::new(10.0, 1.0)))
            .unwrap();
        let crate_body = world
            .add_body(BodyDef::dynamic(Vec2::new(0.0, crate_y), Vec2::ONE))
            .unwrap();
        (floor, crate_body)
    }

    fn run(world: &mut RapierWorld, steps: usize) {
        for _ in 0..steps {
            world.step(DT, 8, 3);
        }
    }

    #[test]
    fn dynamic_body_falls() {
        let mut world = RapierWorld::default();
        let body = world
            .add_body(BodyDef::dynamic(Vec2::new(0.0, 10.0), Vec2::ONE))
            .unwrap();

        let stats = world.step(DT, 8, 3);
        assert_eq!(stats.simulated, 1);

        let b = world.body(body).unwrap();
        assert!((b.velocity.y - (-9.8 * DT)).abs() < 1e-3, "velocity {}", b.velocity.y);
        assert!(b.position.y < 10.0);
    }

    #[test]
    fn static_body_stays_put() {
        let mut world = RapierWorld::default();
        let wall = world
            .add_body(BodyDef::fixed(Vec2::new(3.0, 3.0), Vec2::ONE))
            .unwrap();
        run(&mut world, 30);
        let b = world.body(wall).unwrap();
        assert_eq!(b.position, Vec2::new(3.0, 3.0));
        assert_eq!(b.body_type, BodyType::Static);
        assert!(!b.awake);
    }

    #[test]
    fn crate_lands_on_floor_and_sleeps() {
        let mut world = RapierWorld::default();
        let (_, crate_body) = floor_and_crate(&mut world, 3.0);

        run(&mut world, SETTLE_STEPS);

        let b = world.body(crate_body).unwrap();
        // Floor top is at 0.5, crate half height is 0.5.
        assert!((b.position.y - 1.0).abs() < 0.05, "crate at {}", b.position.y);
        assert!(!b.awake);
        assert!(b.velocity.length() < 1e-3);
    }

    #[test]
    fn crate_never_sleeps_when_world_forbids_it() {
        let mut world = RapierWorld::new(DEFAULT_GRAVITY, false);
        let (_, crate_body) = floor_and_crate(&mut world, 1.0);
        run(&mut world, SETTLE_STEPS);
        assert!(world.body(crate_body).unwrap().awake);
    }

    #[test]
    fn body_that_refuses_sleep_stays_awake() {
        let mut world = RapierWorld::default();
        world
            .add_body(BodyDef::fixed(Vec2::ZERO, Vec2::new(10.0, 1.0)))
            .unwrap();
        let player = world
            .add_body(BodyDef::dynamic(Vec2::new(0.0, 1.0), Vec2::ONE).with_allow_sleep(false))
            .unwrap();
        run(&mut world, SETTLE_STEPS);
        assert!(world.body(player).unwrap().awake);
    }

    #[test]
    fn contacts_begin_once() {
        let mut world = RapierWorld::default();
        let recorder = Recorder::default();
        let log = Rc::clone(&recorder.log);
        world.set_contact_listener(Box::new(recorder));
        let (floor, crate_body) = floor_and_crate(&mut world, 3.0);

        run(&mut world, 120);

        let events = log.borrow();
        assert_eq!(events.as_slice(), &[(true, ContactPair::new(floor, crate_body))]);
        assert_eq!(world.contacts().len(), 1);
    }

    #[test]
    fn static_neighbours_never_touch() {
        let mut world = RapierWorld::default();
        let recorder = Recorder::default();
        let log = Rc::clone(&recorder.log);
        world.set_contact_listener(Box::new(recorder));
        world
            .add_body(BodyDef::fixed(Vec2::ZERO, Vec2::ONE))
            .unwrap();
        world
            .add_body(BodyDef::fixed(Vec2::new(1.0, 0.0), Vec2::ONE))
            .unwrap();

        let stats = world.step(DT, 8, 3);
        assert_eq!(stats.contacts, 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn removing_body_ends_contact_and_wakes_partner() {
        let mut world = RapierWorld::default();
        let recorder = Recorder::default();
        let log = Rc::clone(&recorder.log);
        world.set_contact_listener(Box::new(recorder));
        let (floor, crate_body) = floor_and_crate(&mut world, 1.0);

        run(&mut world, SETTLE_STEPS);
        assert!(!world.body(crate_body).unwrap().awake);

        world.remove_body(floor).unwrap();
        assert!(world.body(floor).is_none());
        assert!(world.contacts().is_empty());
        assert!(world.body(crate_body).unwrap().awake);
        assert_eq!(
            log.borrow().last().copied(),
            Some((false, ContactPair::new(floor, crate_body)))
        );

        // Nothing holds the crate up any more.
        let ended_before = log.borrow().len();
        world.step(DT, 8, 3);
        assert!(world.body(crate_body).unwrap().velocity.y < 0.0);
        assert_eq!(log.borrow().len(), ended_before);
    }

    #[test]
    fn removing_unknown_body_fails() {
        let mut world = RapierWorld::default();
        let result = world.remove_body(BodyHandle::from_raw(99));
        assert!(matches!(result, Err(PhysicsError::UnknownBody(_))));
    }

    #[test]
    fn invalid_definition_is_rejected() {
        let mut world = RapierWorld::default();
        let result = world.add_body(BodyDef::dynamic(Vec2::ZERO, Vec2::new(-1.0, 1.0)));
        assert!(matches!(result, Err(PhysicsError::InvalidBody { .. })));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut world = RapierWorld::default();
        let first = world.add_body(BodyDef::fixed(Vec2::ZERO, Vec2::ONE)).unwrap();
        world.remove_body(first).unwrap();
        let second = world.add_body(BodyDef::fixed(Vec2::ZERO, Vec2::ONE)).unwrap();
        assert_ne!(first, second);
        assert_eq!(world.body_handles(), vec![second]);
    }

    #[test]
    fn zero_dt_does_nothing() {
        let mut world = RapierWorld::default();
        let body = world
            .add_body(BodyDef::dynamic(Vec2::new(0.0, 5.0), Vec2::ONE))
            .unwrap();
        let stats = world.step(0.0, 8, 3);
        assert_eq!(stats.simulated, 0);
        assert_eq!(world.body(body).unwrap().position, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn dispose_releases_everything() {
        let mut world = RapierWorld::with_default_handler(DEFAULT_GRAVITY, true);
        floor_and_crate(&mut world, 3.0);
        assert_eq!(world.body_count(), 2);

        world.dispose();
        assert!(world.is_disposed());
        assert_eq!(world.body_count(), 0);
        assert!(matches!(
            world.add_body(BodyDef::fixed(Vec2::ZERO, Vec2::ONE)),
            Err(PhysicsError::Disposed)
        ));

        let stats = world.step(DT, 8, 3);
        assert_eq!(stats.simulated, 0);

        // A second dispose is harmless.
        world.dispose();
        assert!(world.is_disposed());
    }

    #[test]
    fn set_velocity_wakes_sleeping_body() {
        let mut world = RapierWorld::default();
        let (_, crate_body) = floor_and_crate(&mut world, 1.0);
        run(&mut world, SETTLE_STEPS);
        assert!(!world.body(crate_body).unwrap().awake);

        world.set_velocity(crate_body, Vec2::new(2.0, 0.0)).unwrap();
        assert!(world.body(crate_body).unwrap().awake);
        world.step(DT, 8, 3);
        assert!(world.body(crate_body).unwrap().position.x > 0.0);
    }
}
