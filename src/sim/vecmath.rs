//! Small fixed-size vector helpers
//!
//! Free functions over 3- and 4-component glam vectors, so the physics
//! formulas read the way they are written on paper.

use std::ops::{Add, Mul, Sub};

use glam::{Vec3, Vec4};

/// A fixed-length float vector
pub trait Vector:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    /// Number of components
    const DIM: usize;

    fn inner(self, other: Self) -> f32;

    fn component(self, index: usize) -> f32;
}

impl Vector for Vec3 {
    const DIM: usize = 3;

    #[inline]
    fn inner(self, other: Self) -> f32 {
        self.dot(other)
    }

    #[inline]
    fn component(self, index: usize) -> f32 {
        self[index]
    }
}

impl Vector for Vec4 {
    const DIM: usize = 4;

    #[inline]
    fn inner(self, other: Self) -> f32 {
        self.dot(other)
    }

    #[inline]
    fn component(self, index: usize) -> f32 {
        self[index]
    }
}

#[inline]
pub fn add<V: Vector>(a: V, b: V) -> V {
    a + b
}

#[inline]
pub fn sub<V: Vector>(a: V, b: V) -> V {
    a - b
}

#[inline]
pub fn scale<V: Vector>(a: V, k: f32) -> V {
    a * k
}

#[inline]
pub fn dot<V: Vector>(a: V, b: V) -> f32 {
    a.inner(b)
}

/// Euclidean length (zero for the zero vector)
#[inline]
pub fn norm<V: Vector>(a: V) -> f32 {
    dot(a, a).sqrt()
}

/// Euclidean length of the first `len` components
///
/// `len == 0` means the whole vector; lengths past the end are truncated.
pub fn norm_prefix<V: Vector>(a: V, len: usize) -> f32 {
    let len = if len == 0 { V::DIM } else { len.min(V::DIM) };
    (0..len)
        .map(|i| {
            let c = a.component(i);
            c * c
        })
        .sum::<f32>()
        .sqrt()
}

/// Squared distance between two points
#[inline]
pub fn distance_squared<V: Vector>(a: V, b: V) -> f32 {
    let d = sub(a, b);
    dot(d, d)
}
