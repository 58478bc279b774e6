//! Fixed-step simulation core for a single-player mass-absorption game.
//!
//! A [`world::World`] owns the player's cells and the food field. Each call to
//! [`world::World::step`] consumes at most one move target and one split toggle,
//! then spawns, resolves eating, integrates motion and reaps dead entities.

pub mod config;
pub mod entity;
pub mod geometry;
pub mod input;
pub mod spatial;
pub mod spawner;
pub mod world;

pub use config::{SimConfig, SimConfigError};
pub use input::{Command, InputScript, TickInput};
pub use world::{Snapshot, SplitState, World};
