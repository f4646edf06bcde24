//! Per-sphere instance data

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::sim::{BodyTransform, Simulation};

/// World matrix and color for one sphere
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    /// Column-major `translate(position) * scale(radius)`
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl BallInstance {
    /// Floats per instance when flattened
    pub const FLOATS: usize = 20;

    pub fn new(transform: BodyTransform, color: [f32; 4]) -> Self {
        let model = Mat4::from_translation(transform.position)
            * Mat4::from_scale(Vec3::splat(transform.radius));
        Self {
            model: model.to_cols_array_2d(),
            color,
        }
    }
}

/// One instance per body, in body order
pub fn instances(sim: &Simulation) -> Vec<BallInstance> {
    (0..sim.body_count())
        .map(|i| BallInstance::new(sim.body_transform(i), sim.body_color(i)))
        .collect()
}

/// View instances as a flat float buffer
pub fn instance_floats(instances: &[BallInstance]) -> &[f32] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_model_matrix_places_unit_sphere() {
        let instance = BallInstance::new(
            BodyTransform {
                position: Vec3::new(1.0, -2.0, 0.5),
                radius: 0.25,
            },
            [1.0, 0.373, 0.02, 1.0],
        );
        let model = Mat4::from_cols_array_2d(&instance.model);

        // Center maps to the body position, a surface point lands one radius out
        assert_eq!(model.transform_point3(Vec3::ZERO), Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(model.transform_point3(Vec3::X), Vec3::new(1.25, -2.0, 0.5));
        assert_eq!(instance.color, [1.0, 0.373, 0.02, 1.0]);
    }

    #[test]
    fn test_instances_flatten() {
        let sim = Simulation::configure(SimConfig::default()).unwrap();
        let list = instances(&sim);
        assert_eq!(list.len(), sim.body_count());

        let floats = instance_floats(&list);
        assert_eq!(floats.len(), list.len() * BallInstance::FLOATS);
        // Translation sits in the fourth column
        let p = sim.body_transform(3).position;
        let base = 3 * BallInstance::FLOATS;
        assert_eq!(&floats[base + 12..base + 15], &[p.x, p.y, p.z]);
        assert_eq!(&floats[base + 16..base + 20], &sim.body_color(3));
    }
}
