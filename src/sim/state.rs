//! Simulation context
//!
//! One owned value holding the config, the body set and the broad-phase
//! grid. The host drives it with [`tick`](super::tick::tick) and reads it
//! back through the accessors below.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::BodySet;
use super::grid::{GridStats, UniformGrid};
use crate::config::{ConfigError, SimConfig};

/// What a renderer needs to place one sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub position: Vec3,
    pub radius: f32,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) bodies: BodySet,
    /// Rebuilt every tick, so never persisted
    #[serde(skip)]
    pub(crate) grid: UniformGrid,
    #[serde(skip)]
    pub(crate) scratch: Vec<usize>,
    pub(crate) time_ticks: u64,
}

impl Simulation {
    /// Validate `config` and populate a fresh scene from its seed
    pub fn configure(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = Pcg32::seed_from_u64(config.seed);
        let bodies = BodySet::initialize(&config, &mut rng);
        log::info!(
            "Configured {} bodies in box {:?} (seed {})",
            bodies.len(),
            config.bounds,
            config.seed
        );

        Self::from_bodies(config, bodies)
    }

    /// Run a hand-built body set under `config`'s physics constants
    ///
    /// `config.body_count` and the size tiers are ignored; every body must
    /// have a positive radius and mass and fit inside the box.
    pub fn from_bodies(mut config: SimConfig, bodies: BodySet) -> Result<Self, ConfigError> {
        config.validate_physics()?;
        if bodies.is_empty() {
            return Err(ConfigError::EmptyBodySet);
        }
        for (index, body) in bodies.iter().enumerate() {
            let valid = body.radius.is_finite()
                && body.radius > 0.0
                && body.mass.is_finite()
                && body.mass > 0.0;
            if !valid {
                return Err(ConfigError::InvalidBody {
                    index,
                    radius: body.radius,
                    mass: body.mass,
                });
            }
            config.check_fits(body.radius)?;
        }
        config.body_count = bodies.len();

        let mut sim = Self {
            config,
            bodies,
            grid: UniformGrid::default(),
            scratch: Vec::new(),
            time_ticks: 0,
        };
        sim.ensure_grid()?;
        sim.grid.rebuild(&sim.bodies);
        Ok(sim)
    }

    /// Restore a scene saved with [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let saved: Simulation = serde_json::from_str(json)?;
        let mut sim = Self::from_bodies(saved.config, saved.bodies)?;
        sim.time_ticks = saved.time_ticks;
        Ok(sim)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Side of a grid cell: the widest possible contact distance
    pub fn contact_cell_size(&self) -> f32 {
        2.0 * self.bodies.max_radius() * self.config.collision_slack
    }

    /// Size the grid for the current box if it has not been built yet
    pub(crate) fn ensure_grid(&mut self) -> Result<(), ConfigError> {
        if self.grid.cell_count() == 0 {
            let cell_size = self.contact_cell_size();
            self.grid = UniformGrid::new(Vec3::from(self.config.bounds), cell_size)?;
        }
        Ok(())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_transform(&self, index: usize) -> BodyTransform {
        let body = self.bodies.get(index);
        BodyTransform {
            position: body.position,
            radius: body.radius,
        }
    }

    pub fn body_color(&self, index: usize) -> [f32; 4] {
        self.bodies.color(index)
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Grid as of the last tick
    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    pub fn grid_stats(&self) -> GridStats {
        self.grid.stats()
    }

    pub fn tick_count(&self) -> u64 {
        self.time_ticks
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.bodies.iter().map(|b| b.kinetic_energy()).sum()
    }

    pub fn momentum(&self) -> Vec3 {
        self.bodies.iter().map(|b| b.momentum()).sum()
    }
}
