//! [`RoomBuilder`]: stamps one template into any number of rooms.

use std::sync::Arc;

use crawl_types::{RoomTemplate, Vec2I};
use glam::Vec2;

use crate::room::Room;

/// Factory bound to a single room template.
///
/// Building is pure: every call yields an independent [`Room`] whose objects
/// have not been placed into any world yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomBuilder {
    template: Arc<RoomTemplate>,
}

impl RoomBuilder {
    /// Wrap a parsed template.
    pub fn new(template: RoomTemplate) -> Self {
        Self {
            template: Arc::new(template),
        }
    }

    /// The wrapped template.
    pub const fn template(&self) -> &Arc<RoomTemplate> {
        &self.template
    }

    /// Width and height of rooms this builder produces.
    pub fn dimensions(&self) -> Vec2 {
        self.template.dimensions.to_vec2()
    }

    /// Build a room for grid `cell` with its bottom-left corner at `offset`.
    pub fn create_room(&self, cell: Vec2I, offset: Vec2) -> Room {
        Room::new(Arc::clone(&self.template), cell, offset)
    }
}

impl From<RoomTemplate> for RoomBuilder {
    fn from(template: RoomTemplate) -> Self {
        Self::new(template)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use crawl_physics::{BodyRegistry, PhysicsWorld, RapierWorld};
    use crawl_types::ObjectKind;

    use super::*;
    use crate::camera::Camera;

    fn builder(json: &str) -> RoomBuilder {
        RoomBuilder::new(RoomTemplate::from_json(json).unwrap())
    }

    const ROOM: &str = r#####"{
        "dimensions": { "x": 4.0, "y": 3.0 },
        "tiles": [ "....", "....", "####" ],
        "objects": [
            { "type": "player", "position": { "x": 1.5, "y": 1.5 } },
            { "type": "crate", "position": { "x": 2.5, "y": 1.5 } }
        ]
    }"#####;

    #[test]
    fn rooms_share_template_but_not_objects() {
        let b = builder(ROOM);
        let first = b.create_room(Vec2I::new(-1, 0), Vec2::ZERO);
        let mut second = b.create_room(Vec2I::new(0, 0), Vec2::new(4.0, 0.0));

        assert!(Arc::ptr_eq(first.template(), second.template()));
        assert_eq!(Arc::strong_count(b.template()), 3);

        second.object_mut(0).unwrap().kill();
        assert!(first.object(0).unwrap().is_alive());
    }

    #[test]
    fn objects_are_offset() {
        let room = builder(ROOM).create_room(Vec2I::new(1, 1), Vec2::new(10.0, 20.0));
        assert_eq!(room.objects().len(), 6);
        assert_eq!(room.dimensions(), Vec2::new(4.0, 3.0));
        assert_eq!(room.bounds().max, Vec2::new(14.0, 23.0));

        let first_wall = room.object(0).unwrap();
        assert_eq!(first_wall.kind(), ObjectKind::Wall);
        assert_eq!(first_wall.position(), Vec2::new(10.5, 20.5));

        let player = room.objects().iter().find(|o| o.is_player()).unwrap();
        assert_eq!(player.position(), Vec2::new(11.5, 21.5));
    }

    #[test]
    fn place_objects_reports_players() {
        let mut world = RapierWorld::default();
        let mut room = builder(ROOM).create_room(Vec2I::ZERO, Vec2::ZERO);
        assert!(room.is_spawn_cell());

        let players = room.place_objects(&mut world).unwrap();
        assert_eq!(players, vec![4]);
        assert_eq!(world.body_count(), 6);
        assert!(room.objects().iter().all(|o| o.body().is_some()));
    }

    #[test]
    fn player_rests_on_tile_floor() {
        let mut world = RapierWorld::default();
        let camera = Camera::default();
        let mut room = builder(ROOM).create_room(Vec2I::ZERO, Vec2::ZERO);
        let players = room.place_objects(&mut world).unwrap();
        let player = *players.first().unwrap();

        for _ in 0..120 {
            world.step(1.0 / 60.0, 8, 3);
            room.tick(1.0 / 60.0, &camera, &world).unwrap();
        }

        // Floor tiles span y in [0, 1], the player is one unit tall.
        let y = room.object(player).unwrap().position().y;
        assert!((y - 1.5).abs() < 0.05, "player at {y}");
        assert_eq!(room.ticks(), 120);
        assert!((room.elapsed() - 2.0).abs() < 1e-3);
        assert!(room.object(player).unwrap().is_visible());
    }

    #[test]
    fn tick_marks_offscreen_objects_invisible() {
        let mut world = RapierWorld::default();
        let camera = Camera::default();
        let mut room = builder(ROOM).create_room(Vec2I::new(3, 3), Vec2::new(100.0, 100.0));
        room.place_objects(&mut world).unwrap();
        room.tick(0.0, &camera, &world).unwrap();
        assert!(room.objects().iter().all(|o| !o.is_visible()));
    }
}
