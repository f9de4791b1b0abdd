//! Error types for the `crawl-world` crate.

use crawl_physics::{BodyHandle, PhysicsError};

/// Errors that can occur while placing or ticking room content.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An object index does not exist in its room.
    #[error("object {object} not found in room {room}")]
    ObjectNotFound {
        /// Index of the room in placement order.
        room: usize,
        /// Index of the object inside the room.
        object: usize,
    },

    /// The object already has a body in the world.
    #[error("object is already placed as {0}")]
    AlreadyPlaced(BodyHandle),

    /// A live object's body is gone from the world.
    #[error("live object lost its body {0}")]
    MissingBody(BodyHandle),

    /// The physics world refused the operation.
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
}
