//! Fixed timestep simulation tick
//!
//! Advances every body by one `dt`: gravity, drag, broad-phase rebuild,
//! ball-ball impulses, wall bounces, clamp, then explicit Euler
//! integration. Velocity is final before positions move.

use glam::Vec3;

use super::body::{Body, BodySet};
use super::grid::UniformGrid;
use super::state::Simulation;
use super::vecmath::{dot, scale, sub};
use crate::consts::VERTICAL_AXIS;

/// Pairs closer than this are treated as coincident and skipped
const MIN_SEPARATION_SQ: f32 = 1e-12;

/// Advance the simulation by one fixed timestep
pub fn tick(sim: &mut Simulation) {
    let dt = sim.config.dt;
    let bounds = Vec3::from(sim.config.bounds);

    apply_gravity(&mut sim.bodies, sim.config.gravity, dt);
    apply_drag(&mut sim.bodies, sim.config.drag, dt);

    if let Err(e) = sim.ensure_grid() {
        log::error!("Cannot build broad-phase grid: {}", e);
        return;
    }
    sim.grid.rebuild(&sim.bodies);
    let contacts = resolve_collisions(
        &mut sim.bodies,
        &sim.grid,
        sim.config.collision_slack,
        &mut sim.scratch,
    );
    if contacts > 0 {
        log::trace!("tick {}: {} contacts", sim.time_ticks, contacts);
    }

    collide_walls(&mut sim.bodies, bounds, sim.config.elasticity);
    clamp_to_box(&mut sim.bodies, bounds);
    integrate(&mut sim.bodies, dt);

    sim.time_ticks += 1;
}

/// Constant downward acceleration
pub fn apply_gravity(bodies: &mut BodySet, strength: f32, dt: f32) {
    for body in bodies.iter_mut() {
        body.velocity[VERTICAL_AXIS] -= strength * dt;
    }
}

/// Exponential decay: `drag` is the fraction kept per unit of time
pub fn apply_drag(bodies: &mut BodySet, drag: f32, dt: f32) {
    let keep = drag.powf(dt);
    for body in bodies.iter_mut() {
        body.velocity = scale(body.velocity, keep);
    }
}

/// Resolve every approaching contact the grid turns up
///
/// Bodies are visited in index order and each pair is handled once, from
/// its lower index. Impulses apply immediately, so a body in several
/// contacts sees the velocity left by the previous one. Returns the number
/// of impulses applied.
pub fn resolve_collisions(
    bodies: &mut BodySet,
    grid: &UniformGrid,
    slack: f32,
    scratch: &mut Vec<usize>,
) -> usize {
    let mut contacts = 0;
    for i in 0..bodies.len() {
        grid.neighbors_into(i, scratch);
        for &j in scratch.iter().filter(|&&j| j > i) {
            let (a, b) = bodies.pair_mut(i, j);
            if resolve_pair(a, b, slack) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Elastic impulse along the line of centers
///
/// Applies only when the spheres are within `(r_a + r_b) * slack` and
/// closing on each other. Coincident centers have no defined normal and
/// are left alone. Returns whether an impulse was applied.
pub fn resolve_pair(a: &mut Body, b: &mut Body, slack: f32) -> bool {
    let dx = sub(a.position, b.position);
    let dist_sq = dot(dx, dx);
    if dist_sq < MIN_SEPARATION_SQ {
        return false;
    }

    let reach = (a.radius + b.radius) * slack;
    if dist_sq > reach * reach {
        return false;
    }

    let closing = dot(sub(a.velocity, b.velocity), dx);
    if closing >= 0.0 {
        return false;
    }

    let total_mass = a.mass + b.mass;
    let along = closing / dist_sq;
    a.velocity = sub(a.velocity, scale(dx, 2.0 * b.mass / total_mass * along));
    b.velocity = sub(b.velocity, scale(dx, -2.0 * a.mass / total_mass * along));
    true
}

/// Bounce off the box walls, losing `1 - elasticity` of the axis speed
///
/// Only bodies overlapping a wall and still heading into it are reflected.
pub fn collide_walls(bodies: &mut BodySet, bounds: Vec3, elasticity: f32) {
    for body in bodies.iter_mut() {
        for axis in 0..3 {
            let p = body.position[axis];
            let v = body.velocity[axis];
            if p.abs() + body.radius > bounds[axis] && p * v > 0.0 {
                body.velocity[axis] = -v * elasticity;
            }
        }
    }
}

/// Pull every body back inside `bound - radius` on each axis
pub fn clamp_to_box(bodies: &mut BodySet, bounds: Vec3) {
    for body in bodies.iter_mut() {
        let limit = (bounds - Vec3::splat(body.radius)).max(Vec3::ZERO);
        body.position = body.position.clamp(-limit, limit);
    }
}

/// Explicit Euler step
pub fn integrate(bodies: &mut BodySet, dt: f32) {
    for body in bodies.iter_mut() {
        body.position += scale(body.velocity, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn config(bound: f32, gravity: f32, drag: f32, dt: f32) -> SimConfig {
        SimConfig {
            bounds: [bound; 3],
            gravity,
            drag,
            dt,
            ..SimConfig::default()
        }
    }

    fn sim_with(config: SimConfig, bodies: Vec<Body>) -> Simulation {
        Simulation::from_bodies(config, BodySet::new(bodies)).unwrap()
    }

    #[test]
    fn test_gravity_then_integrate() {
        let mut sim = sim_with(
            config(1.5, 0.8, 1.0, 0.01),
            vec![Body::new(Vec3::ZERO, Vec3::ZERO, 0.1, 1.0)],
        );
        tick(&mut sim);

        let body = sim.bodies().get(0);
        assert!((body.velocity.z + 0.008).abs() < 1e-7);
        assert_eq!(body.velocity.x, 0.0);
        // Position moves with the already-updated velocity
        assert!((body.position.z - (-0.008 * 0.01)).abs() < 1e-8);
        assert!(body.position.length() < 1e-3);
    }

    #[test]
    fn test_gravity_with_default_drag() {
        let mut sim = sim_with(
            config(1.5, 0.8, 0.9, 0.01),
            vec![Body::new(Vec3::ZERO, Vec3::ZERO, 0.1, 1.0)],
        );
        tick(&mut sim);
        let expected = -0.008 * 0.9f32.powf(0.01);
        assert!((sim.bodies().velocity(0).z - expected).abs() < 1e-7);
    }

    #[test]
    fn test_drag_decays_per_unit_time() {
        let mut bodies = BodySet::new(vec![Body::new(Vec3::ZERO, Vec3::X, 0.1, 1.0)]);
        for _ in 0..100 {
            apply_drag(&mut bodies, 0.9, 0.01);
        }
        assert!((bodies.velocity(0).x - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_contact_threshold_boundary() {
        // Centers 2 apart, reach (0.5 + 0.5) * 1.3 = 1.3: no contact yet
        let mut sim = sim_with(
            config(5.0, 0.0, 1.0, 0.5),
            vec![
                Body::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X, 0.5, 1.0),
                Body::new(Vec3::new(1.0, 0.0, 0.0), -Vec3::X, 0.5, 1.0),
            ],
        );
        tick(&mut sim);
        assert_eq!(sim.bodies().velocity(0), Vec3::X);
        assert_eq!(sim.bodies().velocity(1), -Vec3::X);
        assert!((sim.bodies().position(0).x + 0.5).abs() < 1e-6);
        assert!((sim.bodies().position(1).x - 0.5).abs() < 1e-6);

        // Now 1 apart, inside the 1.3 reach and closing: equal masses swap
        tick(&mut sim);
        assert!((sim.bodies().velocity(0).x + 1.0).abs() < 1e-6);
        assert!((sim.bodies().velocity(1).x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_reach_counts_as_contact() {
        let mut a = Body::new(Vec3::new(-0.65, 0.0, 0.0), Vec3::X, 0.5, 1.0);
        let mut b = Body::new(Vec3::new(0.65, 0.0, 0.0), -Vec3::X, 0.5, 1.0);
        assert!(resolve_pair(&mut a, &mut b, 1.3));

        let mut a = Body::new(Vec3::new(-0.66, 0.0, 0.0), Vec3::X, 0.5, 1.0);
        let mut b = Body::new(Vec3::new(0.66, 0.0, 0.0), -Vec3::X, 0.5, 1.0);
        assert!(!resolve_pair(&mut a, &mut b, 1.3));
    }

    #[test]
    fn test_separating_pair_untouched() {
        let mut a = Body::new(Vec3::new(-0.2, 0.0, 0.0), -Vec3::X, 0.5, 1.0);
        let mut b = Body::new(Vec3::new(0.2, 0.0, 0.0), Vec3::X, 0.5, 1.0);
        assert!(!resolve_pair(&mut a, &mut b, 1.3));
        assert_eq!(a.velocity, -Vec3::X);
        assert_eq!(b.velocity, Vec3::X);
    }

    #[test]
    fn test_coincident_pair_skipped() {
        let mut a = Body::new(Vec3::ONE, Vec3::X, 0.5, 1.0);
        let mut b = Body::new(Vec3::ONE, -Vec3::X, 0.5, 1.0);
        assert!(!resolve_pair(&mut a, &mut b, 1.3));
        assert!(a.velocity.is_finite() && b.velocity.is_finite());
    }

    #[test]
    fn test_heavy_body_barely_moves() {
        let mut heavy = Body::new(Vec3::new(-0.3, 0.0, 0.0), Vec3::ZERO, 0.3, 0.027);
        let mut light = Body::new(Vec3::new(0.1, 0.0, 0.0), -Vec3::X, 0.1, 0.001);
        assert!(resolve_pair(&mut heavy, &mut light, 1.3));

        assert!(heavy.velocity.x < 0.0 && heavy.velocity.x > -0.1);
        assert!(light.velocity.x > 0.9);
        let before = Vec3::new(-0.001, 0.0, 0.0);
        assert!((heavy.momentum() + light.momentum() - before).length() < 1e-6);
    }

    #[test]
    fn test_oblique_impulse_is_along_centers() {
        let mut a = Body::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), 0.5, 1.0);
        let mut b = Body::new(Vec3::new(0.8, 0.0, 0.0), Vec3::ZERO, 0.5, 1.0);
        assert!(resolve_pair(&mut a, &mut b, 1.0));
        // Tangential component survives, normal component transfers
        assert!((a.velocity - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert!((b.velocity - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_wall_bounce_reflects_outward_motion() {
        let mut bodies = BodySet::new(vec![
            Body::new(Vec3::new(1.45, 0.0, -1.45), Vec3::new(2.0, 0.5, -1.0), 0.1, 1.0),
            // Overlapping the wall but already heading back in
            Body::new(Vec3::new(-1.45, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0), 0.1, 1.0),
        ]);
        collide_walls(&mut bodies, Vec3::splat(1.5), 0.9);

        assert!((bodies.velocity(0) - Vec3::new(-1.8, 0.5, 0.9)).length() < 1e-6);
        assert_eq!(bodies.velocity(1), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_clamp_to_box() {
        let mut bodies = BodySet::new(vec![Body::new(
            Vec3::new(2.0, -3.0, 0.5),
            Vec3::ZERO,
            0.25,
            1.0,
        )]);
        clamp_to_box(&mut bodies, Vec3::splat(1.5));
        assert_eq!(bodies.position(0), Vec3::new(1.25, -1.25, 0.5));
    }

    #[test]
    fn test_empty_set_is_noop() {
        let mut bodies = BodySet::default();
        let grid = UniformGrid::new(Vec3::ONE, 0.5).unwrap();
        apply_gravity(&mut bodies, 0.8, 0.01);
        apply_drag(&mut bodies, 0.9, 0.01);
        assert_eq!(resolve_collisions(&mut bodies, &grid, 1.3, &mut Vec::new()), 0);
        collide_walls(&mut bodies, Vec3::ONE, 0.9);
        clamp_to_box(&mut bodies, Vec3::ONE);
        integrate(&mut bodies, 0.01);
        assert!(bodies.is_empty());
    }

    #[test]
    fn test_tick_counts() {
        let mut sim = Simulation::configure(SimConfig::default()).unwrap();
        for _ in 0..10 {
            tick(&mut sim);
        }
        assert_eq!(sim.tick_count(), 10);
    }
}
