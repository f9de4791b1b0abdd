//! Floor orchestration for the Crawl dungeon generator.
//!
//! A [`Level`] loads one floor's room templates, assembles them into a grid
//! of rooms around a spawn room, and drives the shared physics world once
//! per tick under the world-lock protocol.
//!
//! # Modules
//!
//! - [`config`] -- [`LevelConfig`] loaded from `crawl-config.yaml`.
//! - [`discovery`] -- Floor resource layout and template discovery.
//! - [`error`] -- [`LevelError`] and [`ResourceError`].
//! - [`level`] -- The [`Level`] orchestrator: create, tick, render, dispose.
//! - [`lock`] -- [`WorldHelper`] and the world-lock event protocol.
//! - [`render`] -- [`DebugRenderer`] seam for debug overlays.

pub mod config;
pub mod discovery;
pub mod error;
pub mod level;
pub mod lock;
pub mod render;

pub use config::{ConfigError, LevelConfig};
pub use error::{LevelError, ResourceError};
pub use level::{Level, ObjectRef, TickReport};
pub use lock::{SharedHelper, SharedWorld, WorldHelper, set_world_locked};
pub use render::{DebugRenderer, TracingDebugRenderer};
