//! Render-side view of the simulation
//!
//! No GPU code lives here: the host owns the context and the sphere mesh.
//! This module flattens the body set into per-instance data it can upload.

pub mod instance;

pub use instance::{BallInstance, instance_floats, instances};
