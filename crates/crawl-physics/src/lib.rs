//! Physics simulation for the Crawl dungeon generator.
//!
//! The level treats physics as a black box it steps once per tick with a
//! `(dt, velocity_iterations, position_iterations)` budget. This crate
//! defines that contract and implements it on top of `rapier2d`.
//!
//! # Modules
//!
//! - [`body`] -- Body handles, definitions, live body state, and AABBs.
//! - [`contact`] -- [`ContactListener`] trait and the default handler.
//! - [`error`] -- Error types for body registration and lookup.
//! - [`world`] -- [`BodyRegistry`] and [`PhysicsWorld`] traits, step stats.
//! - [`rapier`] -- [`RapierWorld`], boxes simulated by rapier with contact
//!   events and body sleeping.
//!
//! The split between [`BodyRegistry`] and [`PhysicsWorld`] is what keeps
//! rooms and objects from stepping or disposing the shared world: they only
//! ever receive the registry half.

pub mod body;
pub mod contact;
pub mod error;
pub mod rapier;
pub mod world;

pub use body::{Aabb, Body, BodyDef, BodyHandle, BodyType};
pub use contact::{ContactListener, ContactPair, DefaultCollisionHandler};
pub use error::PhysicsError;
pub use rapier::{DEFAULT_GRAVITY, RapierWorld};
pub use world::{BodyRegistry, PhysicsWorld, StepStats};
