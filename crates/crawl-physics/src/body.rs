//! Bodies: handles, definitions, runtime state, and bounding boxes.
//!
//! Every body is an axis-aligned box described by its center and half
//! extents. Rotation is not simulated. Worlds hand out [`Body`] snapshots
//! rather than references into their storage.

use glam::Vec2;

use crate::error::PhysicsError;

/// Opaque identifier for a body inside one physics world.
///
/// Handles are never reused within a world, so a handle to a removed body
/// stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Wrap a raw handle value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Never moves. Infinite mass.
    Static,
    /// Affected by gravity and contacts.
    Dynamic,
}

/// Everything needed to create a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    /// Static or dynamic.
    pub body_type: BodyType,
    /// Center of the box in world space.
    pub position: Vec2,
    /// Half the box's width and height.
    pub half_extents: Vec2,
    /// Initial linear velocity.
    pub velocity: Vec2,
    /// Whether this body may fall asleep when it comes to rest.
    pub allow_sleep: bool,
}

impl BodyDef {
    /// A static box centered at `position` with the given full `size`.
    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            body_type: BodyType::Static,
            position,
            half_extents: size * 0.5,
            velocity: Vec2::ZERO,
            allow_sleep: true,
        }
    }

    /// A dynamic box centered at `position` with the given full `size`.
    pub fn dynamic(position: Vec2, size: Vec2) -> Self {
        Self {
            body_type: BodyType::Dynamic,
            ..Self::fixed(position, size)
        }
    }

    /// Builder-style toggle for sleeping.
    #[must_use]
    pub const fn with_allow_sleep(mut self, allow_sleep: bool) -> Self {
        self.allow_sleep = allow_sleep;
        self
    }

    /// Check that the definition describes a simulable box.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidBody`] for non-finite values or
    /// negative extents.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Err(PhysicsError::InvalidBody {
                reason: format!(
                    "position {} and velocity {} must be finite",
                    self.position, self.velocity
                ),
            });
        }
        if !self.half_extents.is_finite() || self.half_extents.min_element() < 0.0 {
            return Err(PhysicsError::InvalidBody {
                reason: format!(
                    "half extents {} must be finite and non-negative",
                    self.half_extents
                ),
            });
        }
        Ok(())
    }
}

/// Snapshot of a body's state, read out of a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// This body's handle.
    pub handle: BodyHandle,
    /// Static or dynamic.
    pub body_type: BodyType,
    /// Current center.
    pub position: Vec2,
    /// Current linear velocity.
    pub velocity: Vec2,
    /// Half the box's width and height.
    pub half_extents: Vec2,
    /// Whether the body may sleep.
    pub allow_sleep: bool,
    /// Whether the body is dynamic and not asleep.
    pub awake: bool,
}

impl Body {
    /// Whether the body is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// The body's current bounding box.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Aabb {
    /// Box centered at `center` with `half_extents`.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Center of the box.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether the two boxes overlap or touch.
    pub fn touches(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn defs_halve_size() {
        let def = BodyDef::dynamic(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert_eq!(def.half_extents, Vec2::new(1.0, 2.0));
        assert_eq!(def.body_type, BodyType::Dynamic);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn non_finite_def_rejected() {
        let def = BodyDef::fixed(Vec2::new(f32::NAN, 0.0), Vec2::ONE);
        assert!(def.validate().is_err());
        let def = BodyDef::fixed(Vec2::ZERO, Vec2::new(-1.0, 1.0));
        assert!(def.validate().is_err());
    }

    #[test]
    fn touching_boxes_touch() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(0.5));
        let b = Aabb::from_center(Vec2::new(1.0, 0.0), Vec2::splat(0.5));
        let c = Aabb::from_center(Vec2::new(1.5, 0.0), Vec2::splat(0.25));
        assert!(a.touches(&b));
        assert!(!a.touches(&c));
        assert_eq!(b.center(), Vec2::new(1.0, 0.0));
    }
}
