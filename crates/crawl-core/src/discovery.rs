//! Floor resource layout and template discovery.
//!
//! ```text
//! <assets_root>/levels/floor-<N>/
//!     level.json        floor descriptor
//!     room_0.json       pool templates, contiguous from 0
//!     room_1.json
//!     ...
//!     room-spawn.json   spawn template (mandatory)
//! ```
//!
//! Pool discovery stops at the first missing index, so a gap in the
//! numbering hides every room after it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crawl_types::{FloorDescriptor, RoomTemplate};
use crawl_world::RoomBuilder;
use tracing::debug;

use crate::error::{LevelError, ResourceError};

/// Floor descriptor file name.
pub const LEVEL_FILE: &str = "level.json";

/// Spawn room file name.
pub const SPAWN_FILE: &str = "room-spawn.json";

/// File name of pool room `index`.
pub fn room_file_name(index: usize) -> String {
    format!("room_{index}.json")
}

/// Read and parse `level.json` from a floor directory.
///
/// # Errors
///
/// Returns [`LevelError::Configuration`] if the file is missing, unreadable,
/// or malformed.
pub fn load_descriptor(dir: &Path) -> Result<FloorDescriptor, LevelError> {
    let path = dir.join(LEVEL_FILE);
    let parsed = std::fs::read_to_string(&path)
        .map_err(ResourceError::from)
        .and_then(|text| FloorDescriptor::from_json(&text).map_err(ResourceError::from));
    parsed.map_err(|source| LevelError::Configuration { path, source })
}

/// Load `room_0.json`, `room_1.json`, ... until the first missing index.
///
/// # Errors
///
/// Any read failure other than a missing file, or a malformed file, fails
/// the whole discovery with [`LevelError::RoomParse`].
pub fn discover_pool(dir: &Path) -> Result<Vec<RoomBuilder>, LevelError> {
    let mut pool = Vec::new();
    loop {
        let path = dir.join(room_file_name(pool.len()));
        let Some(template) = read_template(&path)? else {
            break;
        };
        debug!(path = %path.display(), "Room template loaded");
        pool.push(RoomBuilder::new(template));
    }
    Ok(pool)
}

/// Load the mandatory `room-spawn.json`.
///
/// # Errors
///
/// Returns [`LevelError::MissingSpawnRoom`] if the file does not exist and
/// [`LevelError::RoomParse`] if it cannot be read or parsed.
pub fn load_spawn(dir: &Path, floor: u32) -> Result<RoomBuilder, LevelError> {
    let path = dir.join(SPAWN_FILE);
    read_template(&path)?
        .map(RoomBuilder::new)
        .ok_or(LevelError::MissingSpawnRoom { floor })
}

/// Parse a room file, or `None` if it does not exist.
fn read_template(path: &Path) -> Result<Option<RoomTemplate>, LevelError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(room_error(path, err.into())),
    };
    RoomTemplate::from_json(&text)
        .map(Some)
        .map_err(|err| room_error(path, err.into()))
}

fn room_error(path: &Path, source: ResourceError) -> LevelError {
    LevelError::RoomParse {
        path: PathBuf::from(path),
        source,
    }
}
