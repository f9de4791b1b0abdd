//! Game objects placed in rooms.
//!
//! A [`GameObject`] is plain data plus an optional body handle. The kind
//! decides how it is simulated: players and crates get dynamic bodies,
//! everything else is static.

use std::collections::BTreeMap;

use crawl_physics::{Aabb, BodyDef, BodyHandle, BodyRegistry};
use crawl_types::{ObjectDescriptor, ObjectKind};
use glam::Vec2;
use tracing::trace;

use crate::error::WorldError;

/// One live object inside a room.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    kind: ObjectKind,
    /// Center of the object's box, in world space.
    position: Vec2,
    size: Vec2,
    params: BTreeMap<String, serde_json::Value>,
    body: Option<BodyHandle>,
    alive: bool,
    visible: bool,
}

impl GameObject {
    /// Create an object at a world position.
    pub const fn new(kind: ObjectKind, position: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            position,
            size,
            params: BTreeMap::new(),
            body: None,
            alive: true,
            visible: false,
        }
    }

    /// Instantiate a descriptor, translating its local position by `offset`.
    pub fn from_descriptor(descriptor: &ObjectDescriptor, offset: Vec2) -> Self {
        Self {
            params: descriptor.params.clone(),
            ..Self::new(
                descriptor.kind,
                descriptor.position.to_vec2() + offset,
                descriptor.size.to_vec2(),
            )
        }
    }

    /// What the object is.
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether this object is the player.
    pub fn is_player(&self) -> bool {
        self.kind == ObjectKind::Player
    }

    /// Center of the object in world space.
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Width and height.
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Free-form parameters copied from the room file.
    pub const fn params(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.params
    }

    /// A single parameter by name.
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }

    /// The object's body, once placed.
    pub const fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// Whether the object has not been destroyed.
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the object overlapped the camera view on the last room tick.
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// The object's box in world space.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.size * 0.5)
    }

    /// The body definition this object registers.
    pub fn body_def(&self) -> BodyDef {
        if self.kind.is_dynamic() {
            // The player must keep reacting to input velocity.
            BodyDef::dynamic(self.position, self.size).with_allow_sleep(!self.is_player())
        } else {
            BodyDef::fixed(self.position, self.size)
        }
    }

    /// Register this object's body with the world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AlreadyPlaced`] if the object already has a
    /// body, or [`WorldError::Physics`] if the world rejects it.
    pub fn place_into<R>(&mut self, registry: &mut R) -> Result<BodyHandle, WorldError>
    where
        R: BodyRegistry + ?Sized,
    {
        if let Some(existing) = self.body {
            return Err(WorldError::AlreadyPlaced(existing));
        }
        let handle = registry.add_body(self.body_def())?;
        trace!(
            kind = %self.kind,
            body = %handle,
            x = self.position.x,
            y = self.position.y,
            "Object placed"
        );
        self.body = Some(handle);
        Ok(handle)
    }

    /// Copy the simulated position back from the object's body.
    ///
    /// Dead or unplaced objects are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingBody`] if a live object's body is gone.
    pub fn sync_from<R>(&mut self, registry: &R) -> Result<(), WorldError>
    where
        R: BodyRegistry + ?Sized,
    {
        if !self.alive {
            return Ok(());
        }
        let Some(handle) = self.body else {
            return Ok(());
        };
        let body = registry.body(handle).ok_or(WorldError::MissingBody(handle))?;
        self.position = body.position;
        Ok(())
    }

    pub(crate) const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Mark the object dead and hand back its body so the caller can remove
    /// it from the world at a safe time.
    pub const fn kill(&mut self) -> Option<BodyHandle> {
        self.alive = false;
        self.visible = false;
        self.body.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use crawl_physics::{BodyType, RapierWorld};
    use crawl_types::Point;

    use super::*;

    fn descriptor(kind: ObjectKind, x: f32, y: f32) -> ObjectDescriptor {
        ObjectDescriptor {
            kind,
            position: Point::new(x, y),
            size: Point::new(1.0, 2.0),
            params: BTreeMap::from([("hp".to_owned(), serde_json::json!(3))]),
        }
    }

    #[test]
    fn descriptor_is_translated() {
        let desc = descriptor(ObjectKind::Crate, 1.0, 2.0);
        let obj = GameObject::from_descriptor(&desc, Vec2::new(10.0, 20.0));
        assert_eq!(obj.position(), Vec2::new(11.0, 22.0));
        assert_eq!(obj.size(), Vec2::new(1.0, 2.0));
        assert_eq!(obj.param("hp"), Some(&serde_json::json!(3)));
        assert!(obj.is_alive());
        assert!(obj.body().is_none());
    }

    #[test]
    fn player_and_crate_are_dynamic() {
        let player = GameObject::new(ObjectKind::Player, Vec2::ZERO, Vec2::ONE);
        let wall = GameObject::new(ObjectKind::Wall, Vec2::ZERO, Vec2::ONE);
        assert!(player.is_player());
        assert!(!wall.is_player());
        assert_eq!(player.body_def().body_type, BodyType::Dynamic);
        assert_eq!(wall.body_def().body_type, BodyType::Static);
    }

    #[test]
    fn place_into_registers_once() {
        let mut world = RapierWorld::default();
        let mut obj = GameObject::new(ObjectKind::Generic, Vec2::new(2.0, 2.0), Vec2::ONE);

        let handle = obj.place_into(&mut world).unwrap();
        assert_eq!(obj.body(), Some(handle));
        assert_eq!(world.body(handle).unwrap().position, Vec2::new(2.0, 2.0));

        let again = obj.place_into(&mut world);
        assert!(matches!(again, Err(WorldError::AlreadyPlaced(h)) if h == handle));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn sync_follows_body() {
        let mut world = RapierWorld::default();
        let mut obj = GameObject::new(ObjectKind::Crate, Vec2::new(0.0, 5.0), Vec2::ONE);
        obj.place_into(&mut world).unwrap();

        crawl_physics::PhysicsWorld::step(&mut world, 0.1, 8, 3);
        obj.sync_from(&world).unwrap();
        assert!(obj.position().y < 5.0);
    }

    #[test]
    fn sync_reports_missing_body() {
        let mut world = RapierWorld::default();
        let mut obj = GameObject::new(ObjectKind::Crate, Vec2::ZERO, Vec2::ONE);
        let handle = obj.place_into(&mut world).unwrap();
        world.remove_body(handle).unwrap();
        assert!(matches!(obj.sync_from(&world), Err(WorldError::MissingBody(_))));
    }

    #[test]
    fn kill_releases_body_handle() {
        let mut world = RapierWorld::default();
        let mut obj = GameObject::new(ObjectKind::Crate, Vec2::ZERO, Vec2::ONE);
        let handle = obj.place_into(&mut world).unwrap();

        assert_eq!(obj.kill(), Some(handle));
        assert!(!obj.is_alive());
        assert_eq!(obj.kill(), None);
        // Dead objects no longer sync.
        assert!(obj.sync_from(&world).is_ok());
    }
}
