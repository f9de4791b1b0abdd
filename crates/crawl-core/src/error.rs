//! Error types for the `crawl-core` crate.
//!
//! Everything that can go wrong while loading a floor is fatal: a
//! [`Level`](crate::Level) is either fully constructed or not at all.

use std::path::PathBuf;

use crawl_physics::PhysicsError;
use crawl_world::WorldError;

/// Why a floor resource file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for its schema.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading, assembling, or running a floor.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The floor descriptor is missing, unreadable, or malformed.
    #[error("cannot load floor descriptor {}: {source}", path.display())]
    Configuration {
        /// Path of the descriptor.
        path: PathBuf,
        /// What went wrong.
        source: ResourceError,
    },

    /// The floor has no `room-spawn.json`.
    #[error("floor {floor} has no spawn room")]
    MissingSpawnRoom {
        /// The floor number.
        floor: u32,
    },

    /// The grid has non-spawn cells but the room pool is empty.
    #[error("floor {floor} has no room types for non-spawn cells")]
    NoRoomTypesAvailable {
        /// The floor number.
        floor: u32,
    },

    /// A room file is unreadable or malformed.
    #[error("cannot load room {}: {source}", path.display())]
    RoomParse {
        /// Path of the room file.
        path: PathBuf,
        /// What went wrong.
        source: ResourceError,
    },

    /// `create` was called on a floor that is already assembled.
    #[error("floor is already assembled")]
    AlreadyAssembled,

    /// Placing, ticking, or destroying room content failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

impl From<PhysicsError> for LevelError {
    fn from(source: PhysicsError) -> Self {
        Self::World {
            source: WorldError::Physics(source),
        }
    }
}
