//! Orthographic 2D camera.
//!
//! The camera looks down the negative Z axis at the XY plane. `viewport` is
//! the visible area in world units at zoom 1.

use crawl_physics::Aabb;
use glam::{Mat4, Vec2, Vec3};

/// Near clipping plane distance.
const NEAR: f32 = -1.0;
/// Far clipping plane distance.
const FAR: f32 = 1.0;

/// A camera with cached view, projection, and combined matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position. `z` is ignored by the orthographic projection.
    pub position: Vec3,
    /// Visible width and height in world units.
    pub viewport: Vec2,
    /// Scale factor applied to the viewport. Larger shows more.
    pub zoom: f32,
    view: Mat4,
    projection: Mat4,
    combined: Mat4,
}

impl Camera {
    /// Create a camera at the origin and compute its matrices.
    pub fn new(viewport: Vec2) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            viewport,
            zoom: 1.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            combined: Mat4::IDENTITY,
        };
        camera.update();
        camera
    }

    /// Recompute view, projection, and combined matrices from the current
    /// position, viewport, and zoom.
    pub fn update(&mut self) {
        let half = self.viewport * self.zoom * 0.5;
        self.projection = Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, NEAR, FAR);
        self.view = Mat4::from_translation(-self.position);
        self.combined = self.projection * self.view;
    }

    /// Move `factor` of the remaining distance towards `target` on the XY
    /// plane. `z` moves towards zero.
    ///
    /// Matrices are not updated; call [`update`](Self::update) afterwards.
    pub fn follow(&mut self, target: Vec2, factor: f32) {
        self.position = self.position.lerp(target.extend(0.0), factor);
    }

    /// World to view matrix.
    pub const fn view(&self) -> &Mat4 {
        &self.view
    }

    /// View to clip matrix.
    pub const fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// `projection * view`, as of the last [`update`](Self::update).
    pub const fn combined(&self) -> &Mat4 {
        &self.combined
    }

    /// The world-space rectangle currently in view.
    pub fn visible_bounds(&self) -> Aabb {
        Aabb::from_center(self.position.truncate(), self.viewport * self.zoom * 0.5)
    }

    /// Whether any part of `aabb` is in view.
    pub fn sees(&self, aabb: &Aabb) -> bool {
        self.visible_bounds().touches(aabb)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::new(16.0, 9.0))
    }
}
