//! Placed rooms.

use std::sync::Arc;

use crawl_physics::{Aabb, BodyRegistry};
use crawl_types::{RoomTemplate, Vec2I};
use glam::Vec2;
use tracing::debug;

use crate::camera::Camera;
use crate::error::WorldError;
use crate::object::GameObject;

/// A live room at a fixed place on the floor.
///
/// The room owns its objects. Their bodies live in the shared physics world
/// and are registered by [`place_objects`](Self::place_objects).
#[derive(Debug, Clone)]
pub struct Room {
    template: Arc<RoomTemplate>,
    cell: Vec2I,
    /// Bottom-left corner in world space.
    offset: Vec2,
    objects: Vec<GameObject>,
    ticks: u64,
    elapsed: f32,
}

impl Room {
    pub(crate) fn new(template: Arc<RoomTemplate>, cell: Vec2I, offset: Vec2) -> Self {
        let objects = template
            .all_objects()
            .iter()
            .map(|d| GameObject::from_descriptor(d, offset))
            .collect();
        Self {
            template,
            cell,
            offset,
            objects,
            ticks: 0,
            elapsed: 0.0,
        }
    }

    /// The template this room was stamped from.
    pub const fn template(&self) -> &Arc<RoomTemplate> {
        &self.template
    }

    /// Grid cell the room occupies.
    pub const fn cell(&self) -> Vec2I {
        self.cell
    }

    /// Whether this room sits on the spawn cell.
    pub fn is_spawn_cell(&self) -> bool {
        self.cell == Vec2I::ZERO
    }

    /// Bottom-left corner in world space.
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Width and height, taken from the template.
    pub fn dimensions(&self) -> Vec2 {
        self.template.dimensions.to_vec2()
    }

    /// Room width.
    pub fn width(&self) -> f32 {
        self.template.width()
    }

    /// Room height.
    pub fn height(&self) -> f32 {
        self.template.height()
    }

    /// The room's rectangle in world space.
    pub fn bounds(&self) -> Aabb {
        Aabb {
            min: self.offset,
            max: self.offset + self.dimensions(),
        }
    }

    /// Objects in declaration order (tile walls first).
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    /// One object by index.
    pub fn object(&self, index: usize) -> Option<&GameObject> {
        self.objects.get(index)
    }

    /// One object by index, mutably.
    pub fn object_mut(&mut self, index: usize) -> Option<&mut GameObject> {
        self.objects.get_mut(index)
    }

    /// Number of completed ticks.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds this room has been ticked for.
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Register every object's body with the world.
    ///
    /// Returns the indices of player objects in placement order.
    ///
    /// # Errors
    ///
    /// Stops at the first object that cannot be placed. Objects placed
    /// before it keep their bodies.
    pub fn place_objects<R>(&mut self, registry: &mut R) -> Result<Vec<usize>, WorldError>
    where
        R: BodyRegistry + ?Sized,
    {
        let mut players = Vec::new();
        for (index, object) in self.objects.iter_mut().enumerate() {
            object.place_into(registry)?;
            if object.is_player() {
                players.push(index);
            }
        }
        debug!(
            cell = %self.cell,
            x = self.offset.x,
            y = self.offset.y,
            objects = self.objects.len(),
            players = players.len(),
            "Room placed"
        );
        Ok(players)
    }

    /// Per-tick hook: pull simulated positions into the objects and refresh
    /// their visibility against the camera.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingBody`] if a live object lost its body.
    pub fn tick<R>(&mut self, delta: f32, camera: &Camera, registry: &R) -> Result<(), WorldError>
    where
        R: BodyRegistry + ?Sized,
    {
        for object in self.objects.iter_mut().filter(|o| o.is_alive()) {
            object.sync_from(registry)?;
            object.set_visible(camera.sees(&object.aabb()));
        }
        self.ticks = self.ticks.saturating_add(1);
        self.elapsed += delta;
        Ok(())
    }
}
