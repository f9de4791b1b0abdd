//! The [`Level`] orchestrator.
//!
//! # Lifecycle
//!
//! 1. [`Level::load`] reads the floor descriptor, discovers room templates,
//!    builds the physics world, and subscribes the deferred-cleanup listener.
//! 2. [`Level::create`] assembles the room grid once.
//! 3. [`Level::tick`] and [`Level::render`] run every frame.
//! 4. [`Level::dispose`] consumes the level and releases the world.
//!
//! # Grid assembly
//!
//! For a floor with `roomAmountXY = (X, Y)` the grid spans `[-X, X) × [-Y, Y)`,
//! filled row by row from `y = -Y`. Within a row the horizontal offset starts
//! at zero and grows by each room's width. Rows stack upwards by the tallest
//! room of the row below. Cell `(0, 0)` always holds the spawn room.

use std::cell::RefCell;
use std::rc::Rc;

use crawl_events::{EventBus, EventKind, Priority, SubscriptionId, WorldLockChangeEvent};
use crawl_physics::{BodyRegistry, DefaultCollisionHandler, PhysicsWorld, RapierWorld, StepStats};
use crawl_types::{FloorDescriptor, Vec2I};
use crawl_world::{Camera, GameObject, Room, RoomBuilder, WorldError};
use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use crate::config::LevelConfig;
use crate::discovery;
use crate::error::LevelError;
use crate::lock::{self, SharedHelper, SharedWorld, WorldHelper};
use crate::render::DebugRenderer;

/// Non-owning reference to an object: room index in placement order, then
/// object index inside the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    /// Index into [`Level::rooms`].
    pub room: usize,
    /// Index into [`Room::objects`].
    pub object: usize,
}

/// Outcome of one [`Level::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// What the physics step did.
    pub step: StepStats,
    /// Whether a listener cancelled the unlock, suppressing cleanup.
    pub unlock_cancelled: bool,
}

/// One loaded floor.
pub struct Level {
    floor: u32,
    descriptor: FloorDescriptor,
    config: LevelConfig,
    pool: Vec<RoomBuilder>,
    spawn: RoomBuilder,
    rooms: Vec<Room>,
    world: SharedWorld,
    helper: SharedHelper,
    player: Option<ObjectRef>,
    subscription: SubscriptionId,
    assembled: bool,
}

impl core::fmt::Debug for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Level")
            .field("floor", &self.floor)
            .field("name", &self.descriptor.name)
            .field("pool", &self.pool.len())
            .field("rooms", &self.rooms.len())
            .field("player", &self.player)
            .field("subscription", &self.subscription)
            .field("assembled", &self.assembled)
            .finish_non_exhaustive()
    }
}

impl Level {
    /// Load floor `floor` with a fresh [`RapierWorld`] configured from
    /// `config.physics`.
    ///
    /// # Errors
    ///
    /// See [`with_world`](Self::with_world).
    pub fn load(floor: u32, config: &LevelConfig, bus: &mut EventBus) -> Result<Self, LevelError> {
        let world = RapierWorld::new(config.physics.gravity(), config.physics.allow_sleep);
        Self::with_world(floor, config, Box::new(world), bus)
    }

    /// Load floor `floor` on top of a caller-supplied physics world.
    ///
    /// A [`DefaultCollisionHandler`] is installed on the world either way.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Configuration`] for a missing or malformed
    /// `level.json`, [`LevelError::RoomParse`] for any unreadable room file,
    /// and [`LevelError::MissingSpawnRoom`] without `room-spawn.json`.
    pub fn with_world(
        floor: u32,
        config: &LevelConfig,
        mut world: Box<dyn PhysicsWorld>,
        bus: &mut EventBus,
    ) -> Result<Self, LevelError> {
        let dir = config.floor_dir(floor);
        let descriptor = discovery::load_descriptor(&dir)?;
        let pool = discovery::discover_pool(&dir)?;
        let spawn = discovery::load_spawn(&dir, floor)?;

        world.set_contact_listener(Box::new(DefaultCollisionHandler::new()));
        let world: SharedWorld = Rc::new(RefCell::new(world));
        let helper: SharedHelper = Rc::new(RefCell::new(WorldHelper::new()));

        // Monitor priority so the listener sees whether anyone cancelled.
        let subscription = bus.subscribe(
            EventKind::WorldLockChange,
            Priority::Monitor,
            lock::cleanup_listener(Rc::clone(&helper), Rc::clone(&world)),
        );

        info!(
            floor,
            name = descriptor.name,
            grid = %descriptor.room_amount_xy,
            pool = pool.len(),
            "Floor loaded"
        );

        Ok(Self {
            floor,
            descriptor,
            config: config.clone(),
            pool,
            spawn,
            rooms: Vec::new(),
            world,
            helper,
            player: None,
            subscription,
            assembled: false,
        })
    }

    /// Assemble the room grid and register every object with the world.
    ///
    /// Non-spawn cells draw uniformly, with replacement, from the room pool.
    /// When several rooms hold a player, the last one placed is tracked.
    ///
    /// Assembly is all or nothing: if any room fails to place, every body
    /// added so far is removed again and the level stays unassembled.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::AlreadyAssembled`] on a second call,
    /// [`LevelError::NoRoomTypesAvailable`] when a non-spawn cell exists
    /// but the pool is empty, and [`LevelError::World`] when an object
    /// cannot be placed.
    pub fn create<R>(&mut self, rng: &mut R) -> Result<(), LevelError>
    where
        R: Rng + ?Sized,
    {
        if self.assembled {
            return Err(LevelError::AlreadyAssembled);
        }
        let Vec2I { x: half_x, y: half_y } = self.descriptor.room_amount_xy;
        let has_spawn_cell = half_x > 0 && half_y > 0;
        let needs_pool = self.descriptor.cell_count() > u64::from(has_spawn_cell);
        if needs_pool && self.pool.is_empty() {
            return Err(LevelError::NoRoomTypesAvailable { floor: self.floor });
        }

        let mut world = self.world.borrow_mut();
        let mut rooms = Vec::new();
        let mut player = None;
        if let Err(err) = self.assemble(rng, &mut **world, &mut rooms, &mut player) {
            let removed = rollback(&mut **world, &rooms);
            warn!(floor = self.floor, removed, error = %err, "Floor assembly rolled back");
            return Err(err);
        }

        self.rooms = rooms;
        self.player = player;
        self.assembled = true;
        info!(
            floor = self.floor,
            rooms = self.rooms.len(),
            bodies = world.body_count(),
            player = self.player.is_some(),
            "Floor assembled"
        );
        Ok(())
    }

    /// Walk the grid row by row, pushing every room it creates into
    /// `rooms`, including one that failed halfway through placement.
    fn assemble<R>(
        &self,
        rng: &mut R,
        world: &mut dyn PhysicsWorld,
        rooms: &mut Vec<Room>,
        player: &mut Option<ObjectRef>,
    ) -> Result<(), LevelError>
    where
        R: Rng + ?Sized,
    {
        let Vec2I { x: half_x, y: half_y } = self.descriptor.room_amount_xy;
        let mut offset_y = 0.0_f32;
        for y in -half_y..half_y {
            let mut offset_x = 0.0_f32;
            let mut row_height = 0.0_f32;
            for x in -half_x..half_x {
                let cell = Vec2I::new(x, y);
                let builder = if cell == Vec2I::ZERO {
                    &self.spawn
                } else {
                    self.pool
                        .choose(rng)
                        .ok_or(LevelError::NoRoomTypesAvailable { floor: self.floor })?
                };

                let mut room = builder.create_room(cell, Vec2::new(offset_x, offset_y));
                let placed = room.place_objects(&mut *world);
                offset_x += room.width();
                row_height = row_height.max(room.height());
                let index = rooms.len();
                rooms.push(room);

                if let Some(&object) = placed?.last() {
                    *player = Some(ObjectRef { room: index, object });
                }
            }
            offset_y += row_height;
        }
        Ok(())
    }

    /// Advance the floor by `delta` seconds.
    ///
    /// Locks the world, steps physics, ticks every room in placement order,
    /// then unlocks. The unlock is raised even if a room tick fails, and the
    /// failure is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::World`] when a live object's body has gone
    /// missing from the world.
    pub fn tick(
        &mut self,
        delta: f32,
        camera: &Camera,
        bus: &mut EventBus,
    ) -> Result<TickReport, LevelError> {
        self.lock_world(bus);
        let step = self.world.borrow_mut().step(
            delta,
            self.config.physics.velocity_iterations,
            self.config.physics.position_iterations,
        );
        let rooms = self.tick_rooms(delta, camera);
        let unlock = self.unlock_world(bus);
        rooms?;
        Ok(TickReport {
            step,
            unlock_cancelled: unlock.is_cancelled(),
        })
    }

    fn tick_rooms(&mut self, delta: f32, camera: &Camera) -> Result<(), WorldError> {
        let world = self.world.borrow();
        for room in &mut self.rooms {
            room.tick(delta, camera, &**world)?;
        }
        Ok(())
    }

    /// Move the camera towards the player, refresh its matrices, and draw
    /// the debug overlay if enabled.
    pub fn render(
        &self,
        _delta: f32,
        camera: &mut Camera,
        debug_renderer: Option<&mut dyn DebugRenderer>,
    ) {
        if let Some(target) = self.player().map(GameObject::position) {
            camera.follow(target, self.config.camera.follow_factor);
        }
        camera.update();

        if self.config.debug
            && let Some(renderer) = debug_renderer
        {
            let world = self.world.borrow();
            renderer.render(&**world, camera.combined());
        }
    }

    /// Raise the world lock.
    pub fn lock_world(&self, bus: &mut EventBus) -> WorldLockChangeEvent {
        lock::set_world_locked(&self.helper, bus, true)
    }

    /// Lower the world lock. Deferred cleanup runs unless a listener
    /// cancels the returned event.
    pub fn unlock_world(&self, bus: &mut EventBus) -> WorldLockChangeEvent {
        lock::set_world_locked(&self.helper, bus, false)
    }

    /// Destroy an object.
    ///
    /// The object is marked dead at once. Its body is removed immediately
    /// when the world is unlocked, or queued for the next cleanup otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::World`] if `target` names no object or the
    /// world no longer knows its body.
    pub fn destroy_object(&mut self, target: ObjectRef) -> Result<(), LevelError> {
        let object = self
            .rooms
            .get_mut(target.room)
            .and_then(|room| room.object_mut(target.object))
            .ok_or(WorldError::ObjectNotFound {
                room: target.room,
                object: target.object,
            })?;
        let body = object.kill();
        if self.player == Some(target) {
            self.player = None;
        }
        let Some(handle) = body else {
            return Ok(());
        };

        if self.helper.borrow().is_locked() {
            self.helper.borrow_mut().schedule_removal(handle);
            debug!(
                room = target.room,
                object = target.object,
                body = %handle,
                "Body removal deferred"
            );
        } else {
            self.world.borrow_mut().remove_body(handle)?;
            debug!(room = target.room, object = target.object, body = %handle, "Body removed");
        }
        Ok(())
    }

    /// Release the physics world and detach from the bus.
    pub fn dispose(self, bus: &mut EventBus) {
        bus.unsubscribe(self.subscription);
        let mut world = self.world.borrow_mut();
        let bodies = world.body_count();
        world.dispose();
        info!(floor = self.floor, rooms = self.rooms.len(), bodies, "Level disposed");
    }

    /// Floor number.
    pub const fn floor(&self) -> u32 {
        self.floor
    }

    /// Human-readable floor name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The parsed `level.json`.
    pub const fn descriptor(&self) -> &FloorDescriptor {
        &self.descriptor
    }

    /// Nominal room size from the descriptor.
    pub const fn room_dimensions(&self) -> Vec2 {
        self.descriptor.room_dimensions.to_vec2()
    }

    /// Configuration the level was loaded with.
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Pool builders in discovery order.
    pub fn pool(&self) -> &[RoomBuilder] {
        &self.pool
    }

    /// The spawn room builder.
    pub const fn spawn_builder(&self) -> &RoomBuilder {
        &self.spawn
    }

    /// Placed rooms in grid traversal order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Whether [`create`](Self::create) has run.
    pub const fn is_assembled(&self) -> bool {
        self.assembled
    }

    /// Reference to the tracked player, if any.
    pub const fn player_ref(&self) -> Option<ObjectRef> {
        self.player
    }

    /// The tracked player object, if any.
    pub fn player(&self) -> Option<&GameObject> {
        self.object(self.player?)
    }

    /// Resolve an object reference.
    pub fn object(&self, target: ObjectRef) -> Option<&GameObject> {
        self.rooms.get(target.room)?.object(target.object)
    }

    /// The shared physics world.
    pub fn world(&self) -> SharedWorld {
        Rc::clone(&self.world)
    }

    /// The shared lock state.
    pub fn world_helper(&self) -> SharedHelper {
        Rc::clone(&self.helper)
    }

    /// The cleanup listener's subscription.
    pub const fn subscription(&self) -> SubscriptionId {
        self.subscription
    }
}

/// Remove every body the given rooms registered. Returns how many went.
fn rollback(world: &mut dyn PhysicsWorld, rooms: &[Room]) -> usize {
    let mut removed = 0_usize;
    let bodies = rooms
        .iter()
        .flat_map(|room| room.objects().iter().filter_map(GameObject::body));
    for handle in bodies {
        match world.remove_body(handle) {
            Ok(()) => removed = removed.saturating_add(1),
            Err(err) => warn!(body = %handle, error = %err, "Rollback could not remove body"),
        }
    }
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn object_ref_orders_by_room_then_object() {
        let a = ObjectRef { room: 0, object: 9 };
        let b = ObjectRef { room: 1, object: 0 };
        assert!(a < b);
    }
}
