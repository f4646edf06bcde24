//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body index)
//! - No rendering or platform dependencies

pub mod body;
pub mod grid;
pub mod state;
pub mod tick;
pub mod vecmath;

pub use body::{Body, BodySet};
pub use grid::{GridStats, UniformGrid};
pub use state::{BodyTransform, Simulation};
pub use tick::{
    apply_drag, apply_gravity, clamp_to_box, collide_walls, integrate, resolve_collisions,
    resolve_pair, tick,
};
