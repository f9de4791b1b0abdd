//! Error types for the `crawl-physics` crate.

use crate::body::BodyHandle;

/// Errors that can occur when registering or looking up bodies.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// No body with this handle exists in the world.
    #[error("unknown body: {0}")]
    UnknownBody(BodyHandle),

    /// The world has been disposed and accepts no more bodies.
    #[error("physics world has been disposed")]
    Disposed,

    /// The body definition cannot be simulated.
    #[error("invalid body definition: {reason}")]
    InvalidBody {
        /// What is wrong with the definition.
        reason: String,
    },

    /// Body handle counter is exhausted.
    #[error("body handle space exhausted")]
    HandleOverflow,
}
