//! Ball Pit - bouncing spheres in a box
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, broad-phase grid, physics tick)
//! - `config`: Scene configuration, validation and persistence
//! - `renderer`: Per-instance draw data for a host render loop
//! - `platform`: Browser/native timing helpers

pub mod config;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use config::{ConfigError, SimConfig, SizeTier};
pub use sim::{BodyTransform, Simulation, tick};

/// Demo configuration constants
pub mod consts {
    /// Fixed simulation timestep (time units per tick, not wall-clock)
    pub const SIM_DT: f32 = 0.01;
    /// Requested period of the physics timer in milliseconds
    pub const TICK_INTERVAL_MS: i32 = 1;

    /// Axis gravity pulls along (z is up)
    pub const VERTICAL_AXIS: usize = 2;

    /// Half-extent of the default box on every axis
    pub const DEFAULT_BOUND: f32 = 1.5;
    /// Default number of spheres
    pub const DEFAULT_BODY_COUNT: usize = 50;

    /// Downward acceleration
    pub const GRAVITY_STRENGTH: f32 = 0.8;
    /// Fraction of velocity kept per unit of time
    pub const DRAG_FACTOR: f32 = 0.9;
    /// Fraction of axis speed kept after a wall bounce
    pub const WALL_ELASTICITY: f32 = 0.9;
    /// Over-detection margin on the contact distance
    pub const COLLISION_SLACK: f32 = 1.3;

    /// Largest broad-phase grid a scene may allocate
    pub const MAX_GRID_CELLS: usize = 2_000_000;

    /// Frames kept for the moving FPS average
    pub const FPS_HISTORY_LEN: usize = 100;
}
