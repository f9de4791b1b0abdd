//! The physics world contract.
//!
//! [`BodyRegistry`] is what rooms and objects may touch: adding, removing,
//! and reading bodies. [`PhysicsWorld`] adds the operations reserved for the
//! level that owns the world: stepping, listener installation, disposal.

use glam::Vec2;

use crate::body::{Body, BodyDef, BodyHandle};
use crate::contact::ContactListener;
use crate::error::PhysicsError;

/// What happened during one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepStats {
    /// Time advanced, in seconds.
    pub dt: f32,
    /// Velocity solver iterations used.
    pub velocity_iterations: u32,
    /// Position solver iterations used.
    pub position_iterations: u32,
    /// Dynamic bodies that were awake and integrated.
    pub simulated: usize,
    /// Dynamic bodies asleep after the step.
    pub sleeping: usize,
    /// Pairs touching after the step.
    pub contacts: usize,
    /// Contacts that began during the step.
    pub began: usize,
    /// Contacts that ended during the step.
    pub ended: usize,
}

/// Body registration and lookup.
pub trait BodyRegistry {
    /// Create a body and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidBody`] for a definition that cannot be
    /// simulated and [`PhysicsError::Disposed`] once the world is disposed.
    fn add_body(&mut self, def: BodyDef) -> Result<BodyHandle, PhysicsError>;

    /// Destroy a body. Ends any contacts it was part of.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if the handle is not live.
    fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Snapshot a body's current state.
    fn body(&self, handle: BodyHandle) -> Option<Body>;

    /// Overwrite a body's linear velocity and wake it.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] if the handle is not live.
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;

    /// Handles of every live body, in creation order.
    fn body_handles(&self) -> Vec<BodyHandle>;

    /// Number of live bodies.
    fn body_count(&self) -> usize;
}

/// A steppable simulation owned by a level.
pub trait PhysicsWorld: BodyRegistry {
    /// Advance the simulation by `dt` seconds.
    fn step(
        &mut self,
        dt: f32,
        velocity_iterations: u32,
        position_iterations: u32,
    ) -> StepStats;

    /// Constant acceleration applied to dynamic bodies.
    fn gravity(&self) -> Vec2;

    /// Whether resting bodies may fall asleep.
    fn allows_sleep(&self) -> bool;

    /// Replace the contact listener.
    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>);

    /// Release every body and refuse further work.
    fn dispose(&mut self);

    /// Whether [`dispose`](Self::dispose) has run.
    fn is_disposed(&self) -> bool;
}
