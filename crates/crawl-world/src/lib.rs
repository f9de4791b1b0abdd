//! Live floor content for the Crawl dungeon generator.
//!
//! Room templates from `crawl-types` are stamped into [`Room`]s by a
//! [`RoomBuilder`]. Each room owns its [`GameObject`]s; the physics world
//! only holds their bodies.
//!
//! # Modules
//!
//! - [`builder`] -- [`RoomBuilder`], a factory bound to one room template.
//! - [`camera`] -- [`Camera`] with orthographic view/projection matrices.
//! - [`error`] -- Error types for object placement and room ticking.
//! - [`object`] -- [`GameObject`] and its body registration.
//! - [`room`] -- [`Room`], a placed instance with a per-tick hook.

pub mod builder;
pub mod camera;
pub mod error;
pub mod object;
pub mod room;

pub use builder::RoomBuilder;
pub use camera::Camera;
pub use error::WorldError;
pub use object::GameObject;
pub use room::Room;
