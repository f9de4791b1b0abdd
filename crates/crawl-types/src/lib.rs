//! Shared type definitions for the Crawl dungeon generator.
//!
//! This crate holds the plain data read from floor resource files. Nothing
//! here touches the physics simulation; live rooms and objects are built
//! from these definitions by `crawl-world`.
//!
//! # Modules
//!
//! - [`enums`] -- Object kind discriminant used by room templates
//! - [`geometry`] -- Integer grid vectors and JSON-friendly float points
//! - [`structs`] -- Floor descriptor, room template, and object descriptors

pub mod enums;
pub mod geometry;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::ObjectKind;
pub use geometry::{Point, Vec2I};
pub use structs::{FloorDescriptor, ObjectDescriptor, RoomTemplate, SOLID_TILE};
