//! Rigid spheres and the fixed-size set holding them
//!
//! Indices are stable for the life of a scene: the set is populated once
//! and never resized.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// One rigid sphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub radius: f32,
    /// RGBA, cosmetic only
    pub color: [f32; 4],
}

impl Body {
    pub fn new(position: Vec3, velocity: Vec3, radius: f32, mass: f32) -> Self {
        Self {
            position,
            velocity,
            mass,
            radius,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    #[inline]
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}

/// Ordered collection of bodies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySet {
    bodies: Vec<Body>,
}

impl BodySet {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    /// Populate `config.body_count` bodies with random state
    ///
    /// Radius comes from the body's rank in the tier list; position is
    /// uniform inside the box minus the spawn margin (and never closer to a
    /// wall than the radius).
    pub fn initialize(config: &SimConfig, rng: &mut Pcg32) -> Self {
        let speed = config.max_spawn_speed;
        let bodies = (0..config.body_count)
            .map(|rank| {
                let radius = config.tier_radius(rank);
                let mut position = Vec3::ZERO;
                for axis in 0..3 {
                    let bound = config.bounds[axis];
                    let extent = (bound - config.spawn_margin).min(bound - radius).max(0.0);
                    position[axis] = rng.random_range(-extent..=extent);
                }
                let velocity = Vec3::new(
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                    rng.random_range(-speed..=speed),
                );
                let color = [rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>(), 1.0];

                Body::new(position, velocity, radius, config.mass_for(radius)).with_color(color)
            })
            .collect();

        Self { bodies }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Body> {
        self.bodies.iter_mut()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Body {
        self.check(index);
        &self.bodies[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut Body {
        self.check(index);
        &mut self.bodies[index]
    }

    pub fn position(&self, index: usize) -> Vec3 {
        self.get(index).position
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.get_mut(index).position = position;
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        self.get(index).velocity
    }

    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        self.get_mut(index).velocity = velocity;
    }

    pub fn mass(&self, index: usize) -> f32 {
        self.get(index).mass
    }

    pub fn radius(&self, index: usize) -> f32 {
        self.get(index).radius
    }

    pub fn color(&self, index: usize) -> [f32; 4] {
        self.get(index).color
    }

    /// Largest radius in the set (0 when empty)
    pub fn max_radius(&self) -> f32 {
        self.bodies.iter().map(|b| b.radius).fold(0.0, f32::max)
    }

    /// Two distinct bodies, mutably
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Body, &mut Body) {
        assert_ne!(i, j, "pair_mut needs two distinct bodies");
        self.check(i);
        self.check(j);
        if i < j {
            let (lo, hi) = self.bodies.split_at_mut(j);
            (&mut lo[i], &mut hi[0])
        } else {
            let (lo, hi) = self.bodies.split_at_mut(i);
            (&mut hi[0], &mut lo[j])
        }
    }

    #[inline]
    fn check(&self, index: usize) {
        assert!(
            index < self.bodies.len(),
            "body index {} out of range (n = {})",
            index,
            self.bodies.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_tiers_and_bounds() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let set = BodySet::initialize(&config, &mut rng);

        assert_eq!(set.len(), config.body_count);
        assert_eq!(set.radius(0), 0.3);
        assert_eq!(set.radius(4), 0.15);
        assert_eq!(set.radius(config.body_count - 1), 0.08);

        for body in set.iter() {
            for axis in 0..3 {
                let limit = config.bounds[axis] - config.spawn_margin;
                assert!(body.position[axis].abs() <= limit + 1e-6);
                assert!(body.position[axis].abs() + body.radius <= config.bounds[axis] + 1e-6);
                assert!(body.velocity[axis].abs() <= config.max_spawn_speed + 1e-6);
            }
            assert!((body.mass - body.radius.powi(3)).abs() < 1e-6);
            assert_eq!(body.color[3], 1.0);
        }
    }

    #[test]
    fn test_initialize_is_seeded() {
        let config = SimConfig::default();
        let a = BodySet::initialize(&config, &mut Pcg32::seed_from_u64(42));
        let b = BodySet::initialize(&config, &mut Pcg32::seed_from_u64(42));
        let c = BodySet::initialize(&config, &mut Pcg32::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_accessors() {
        let mut set = BodySet::new(vec![
            Body::new(Vec3::ZERO, Vec3::X, 0.5, 1.0),
            Body::new(Vec3::ONE, Vec3::ZERO, 0.2, 2.0),
        ]);
        set.set_velocity(1, Vec3::Y);
        set.set_position(0, Vec3::Z);

        assert_eq!(set.velocity(1), Vec3::Y);
        assert_eq!(set.position(0), Vec3::Z);
        assert_eq!(set.mass(1), 2.0);
        assert_eq!(set.max_radius(), 0.5);

        let (a, b) = set.pair_mut(1, 0);
        assert_eq!(a.mass, 2.0);
        assert_eq!(b.mass, 1.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_panics() {
        let set = BodySet::new(vec![Body::new(Vec3::ZERO, Vec3::ZERO, 0.1, 1.0)]);
        let _ = set.position(1);
    }
}
