//! Scene configuration
//!
//! Validated once, up front; the simulation never clamps a bad value.
//! Persisted in LocalStorage on the web build.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a configuration was rejected
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("body set is empty")]
    EmptyBodySet,
    #[error("bound on axis {axis} must be positive and finite, got {value}")]
    InvalidBound { axis: usize, value: f32 },
    #[error("at least one size tier is required")]
    NoSizeTiers,
    #[error("size tier {tier} has non-positive radius {radius}")]
    InvalidRadius { tier: usize, radius: f32 },
    #[error("radius {radius} does not fit inside bound {bound} on axis {axis}")]
    RadiusExceedsBound { radius: f32, axis: usize, bound: f32 },
    #[error("body {index} has invalid radius {radius} or mass {mass}")]
    InvalidBody { index: usize, radius: f32, mass: f32 },
    #[error("gravity must be finite and non-negative, got {0}")]
    InvalidGravity(f32),
    #[error("drag factor must lie in (0, 1], got {0}")]
    InvalidDrag(f32),
    #[error("elasticity must lie in [0, 1], got {0}")]
    InvalidElasticity(f32),
    #[error("collision slack must be at least 1, got {0}")]
    InvalidSlack(f32),
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    #[error("spawn margin {margin} must be non-negative and smaller than every bound")]
    InvalidSpawnMargin { margin: f32 },
    #[error("spawn speed must be finite and non-negative, got {0}")]
    InvalidSpawnSpeed(f32),
    #[error("mass exponent must be finite and non-negative, got {0}")]
    InvalidMassExponent(f32),
    #[error("broad-phase grid needs {cells} cells, limit is {max}")]
    GridTooLarge { cells: usize, max: usize },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Radius shared by a run of consecutive bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTier {
    pub radius: f32,
    /// Bodies in this tier; the last tier takes whatever is left
    pub count: usize,
}

impl SizeTier {
    pub const fn new(radius: f32, count: usize) -> Self {
        Self { radius, count }
    }
}

/// Everything needed to build a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub body_count: usize,
    /// Half-extent of the box per axis
    pub bounds: [f32; 3],
    /// Radius assigned by rank, largest first
    pub size_tiers: Vec<SizeTier>,
    pub gravity: f32,
    pub drag: f32,
    pub elasticity: f32,
    pub collision_slack: f32,
    pub dt: f32,
    pub seed: u64,

    /// Keep-out distance from the walls for initial positions
    pub spawn_margin: f32,
    /// Initial velocity components are drawn from `[-max, max]`
    pub max_spawn_speed: f32,
    /// `mass = radius ^ mass_exponent`
    pub mass_exponent: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            body_count: DEFAULT_BODY_COUNT,
            bounds: [DEFAULT_BOUND; 3],
            size_tiers: vec![
                SizeTier::new(0.3, 4),
                SizeTier::new(0.15, 21),
                SizeTier::new(0.08, 0),
            ],
            gravity: GRAVITY_STRENGTH,
            drag: DRAG_FACTOR,
            elasticity: WALL_ELASTICITY,
            collision_slack: COLLISION_SLACK,
            dt: SIM_DT,
            seed: 0,

            spawn_margin: 0.2,
            max_spawn_speed: DEFAULT_BOUND - 0.2,
            mass_exponent: 3.0,
        }
    }
}

impl SimConfig {
    /// Build a config from the host-facing knobs, defaults for the rest
    pub fn new(
        body_count: usize,
        bounds: [f32; 3],
        size_tiers: Vec<SizeTier>,
        gravity: f32,
        drag: f32,
        elasticity: f32,
        collision_slack: f32,
    ) -> Self {
        Self {
            body_count,
            bounds,
            size_tiers,
            gravity,
            drag,
            elasticity,
            collision_slack,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every rule needed to populate and run a scene
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_physics()?;

        if self.body_count == 0 {
            return Err(ConfigError::EmptyBodySet);
        }
        if self.size_tiers.is_empty() {
            return Err(ConfigError::NoSizeTiers);
        }
        for (tier, size) in self.size_tiers.iter().enumerate() {
            if !(size.radius.is_finite() && size.radius > 0.0) {
                return Err(ConfigError::InvalidRadius {
                    tier,
                    radius: size.radius,
                });
            }
            self.check_fits(size.radius)?;
        }

        let min_bound = self.bounds.iter().copied().fold(f32::INFINITY, f32::min);
        if !(self.spawn_margin >= 0.0 && self.spawn_margin < min_bound) {
            return Err(ConfigError::InvalidSpawnMargin {
                margin: self.spawn_margin,
            });
        }
        if !(self.max_spawn_speed.is_finite() && self.max_spawn_speed >= 0.0) {
            return Err(ConfigError::InvalidSpawnSpeed(self.max_spawn_speed));
        }
        if !(self.mass_exponent.is_finite() && self.mass_exponent >= 0.0) {
            return Err(ConfigError::InvalidMassExponent(self.mass_exponent));
        }
        Ok(())
    }

    /// Check the rules the physics tick depends on (box and force constants)
    pub fn validate_physics(&self) -> Result<(), ConfigError> {
        for (axis, &value) in self.bounds.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidBound { axis, value });
            }
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(ConfigError::InvalidGravity(self.gravity));
        }
        if !(self.drag > 0.0 && self.drag <= 1.0) {
            return Err(ConfigError::InvalidDrag(self.drag));
        }
        if !(0.0..=1.0).contains(&self.elasticity) {
            return Err(ConfigError::InvalidElasticity(self.elasticity));
        }
        if !(self.collision_slack.is_finite() && self.collision_slack >= 1.0) {
            return Err(ConfigError::InvalidSlack(self.collision_slack));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.dt));
        }
        Ok(())
    }

    /// A sphere of this radius must have room to sit inside the box
    pub fn check_fits(&self, radius: f32) -> Result<(), ConfigError> {
        for (axis, &bound) in self.bounds.iter().enumerate() {
            if radius >= bound {
                return Err(ConfigError::RadiusExceedsBound {
                    radius,
                    axis,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Radius for the body at `rank` (tiers fill in order)
    pub fn tier_radius(&self, rank: usize) -> f32 {
        let mut end = 0;
        for tier in &self.size_tiers {
            end += tier.count;
            if rank < end {
                return tier.radius;
            }
        }
        self.size_tiers.last().map(|t| t.radius).unwrap_or(0.0)
    }

    /// Mass of a sphere with the given radius
    #[inline]
    pub fn mass_for(&self, radius: f32) -> f32 {
        radius.powf(self.mass_exponent)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ball_pit_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
