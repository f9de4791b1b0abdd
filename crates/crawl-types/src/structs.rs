//! Floor and room definitions as stored in `assets/levels/floor-<N>/`.
//!
//! A floor folder holds one `level.json` ([`FloorDescriptor`]) and any number
//! of room files ([`RoomTemplate`]). Both are parsed once at load time and
//! never mutated afterwards.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::enums::ObjectKind;
use crate::geometry::{Point, Vec2I};

/// Character marking a solid tile in a room's tile layout.
pub const SOLID_TILE: char = '#';

/// Contents of a floor's `level.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorDescriptor {
    /// Human-readable floor name.
    pub name: String,

    /// Half-extent of the room grid. The grid spans `[-x, x) × [-y, y)`.
    #[serde(rename = "roomAmountXY")]
    pub room_amount_xy: Vec2I,

    /// Nominal room size. Only a hint; layout uses each placed room's own
    /// dimensions.
    #[serde(rename = "roomDimensions")]
    pub room_dimensions: Point,
}

impl FloorDescriptor {
    /// Parse a floor descriptor from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or missing keys.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Total number of grid cells, i.e. rooms a full assembly places.
    ///
    /// A zero or negative extent on either axis spans no cells.
    pub fn cell_count(&self) -> u64 {
        let span = |half: i32| u64::try_from(half).unwrap_or(0).saturating_mul(2);
        span(self.room_amount_xy.x).saturating_mul(span(self.room_amount_xy.y))
    }
}

/// One object declared inside a room file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// What the object is.
    #[serde(rename = "type")]
    pub kind: ObjectKind,

    /// Center of the object's box, relative to the room origin (the room's
    /// bottom-left corner).
    pub position: Point,

    /// Extent of the object's box.
    #[serde(default = "default_object_size")]
    pub size: Point,

    /// Free-form parameters passed through to the live object.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl ObjectDescriptor {
    fn validate(&self) -> Result<(), String> {
        let Point { x, y } = self.position;
        if !(x.is_finite() && y.is_finite()) {
            return Err(format!("position ({x}, {y}) must be finite"));
        }
        let Point { x: width, y: height } = self.size;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(format!("size ({width}, {height}) must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Parsed content of a `room_<i>.json` or `room-spawn.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTemplate {
    /// Width and height of the room. Drives grid layout offsets.
    pub dimensions: Point,

    /// Objects placed in the room.
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,

    /// Optional tile layout, first row at the top of the room.
    #[serde(default)]
    pub tiles: Vec<String>,

    /// Edge length of one tile.
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
}

impl RoomTemplate {
    /// Parse a room template from JSON text.
    ///
    /// # Errors
    ///
    /// Besides malformed JSON, rejects non-finite or negative dimensions, a
    /// tile size that is not positive, and any object whose position is not
    /// finite or whose size is not finite and non-negative.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let template: Self = serde_json::from_str(text)?;
        let Point { x: width, y: height } = template.dimensions;
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(serde_json::Error::custom(format!(
                "room dimensions must be finite and non-negative, got ({width}, {height})"
            )));
        }
        if !template.tile_size.is_finite() || template.tile_size <= 0.0 {
            return Err(serde_json::Error::custom(format!(
                "tile_size must be positive, got {}",
                template.tile_size
            )));
        }
        for (index, object) in template.objects.iter().enumerate() {
            object.validate().map_err(|reason| {
                serde_json::Error::custom(format!("object {index} ({}): {reason}", object.kind))
            })?;
        }
        Ok(template)
    }

    /// Room width.
    pub const fn width(&self) -> f32 {
        self.dimensions.x
    }

    /// Room height.
    pub const fn height(&self) -> f32 {
        self.dimensions.y
    }

    /// Expand the tile layout into wall descriptors.
    ///
    /// Row `i` of `n` covers `y` from `(n - 1 - i) * tile_size` upwards,
    /// column `j` covers `x` from `j * tile_size`. Each wall is centered on
    /// its tile.
    pub fn tile_objects(&self) -> Vec<ObjectDescriptor> {
        let size = self.tile_size;
        let half = size * 0.5;
        let mut walls = Vec::new();
        let mut row_y = 0.0_f32;
        for row in self.tiles.iter().rev() {
            let mut col_x = 0.0_f32;
            for tile in row.chars() {
                if tile == SOLID_TILE {
                    walls.push(ObjectDescriptor {
                        kind: ObjectKind::Wall,
                        position: Point::new(col_x + half, row_y + half),
                        size: Point::new(size, size),
                        params: BTreeMap::new(),
                    });
                }
                col_x += size;
            }
            row_y += size;
        }
        walls
    }

    /// All objects the room will contain: tile walls first, then the
    /// declared objects in file order.
    pub fn all_objects(&self) -> Vec<ObjectDescriptor> {
        let mut objects = self.tile_objects();
        objects.extend(self.objects.iter().cloned());
        objects
    }
}

const fn default_object_size() -> Point {
    Point::new(1.0, 1.0)
}

const fn default_tile_size() -> f32 {
    1.0
}
