//! Debug overlay seam.

use crawl_physics::{BodyRegistry, PhysicsWorld};
use glam::Mat4;
use tracing::trace;

/// Draws physics bodies on top of the scene.
pub trait DebugRenderer {
    /// Draw `world` using the camera's combined matrix.
    fn render(&mut self, world: &dyn PhysicsWorld, combined: &Mat4);
}

/// A renderer that emits one `trace` event per body instead of drawing.
///
/// Used by the headless engine so `debug: true` has a visible effect.
#[derive(Debug, Clone, Default)]
pub struct TracingDebugRenderer {
    frames: u64,
}

impl TracingDebugRenderer {
    /// Create a renderer that has drawn nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl DebugRenderer for TracingDebugRenderer {
    fn render(&mut self, world: &dyn PhysicsWorld, combined: &Mat4) {
        for handle in world.body_handles() {
            if let Some(body) = world.body(handle) {
                let clip = combined.project_point3(body.position.extend(0.0));
                trace!(body = %handle, x = clip.x, y = clip.y, awake = body.awake, "Debug body");
            }
        }
        self.frames = self.frames.saturating_add(1);
    }
}
