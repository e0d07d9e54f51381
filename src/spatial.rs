//! Spatial primitives shared by collision snapshots and velocity sampling.
//!
//! These stay deliberately small: the host's transform system owns real scene poses, the
//! interactor only carries copies of them in payloads.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A simple 3D vector wrapper.
///
/// Internally uses [`nalgebra::Vector3<f32>`] for downstream math convenience.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3D(pub Vector3<f32>);

impl Vector3D {
    /// Convenience constructor.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn zeros() -> Self {
        Self(Vector3::zeros())
    }

    /// Uniform vector, handy for multipliers.
    pub fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn x(&self) -> f32 {
        self.0.x
    }

    pub fn y(&self) -> f32 {
        self.0.y
    }

    pub fn z(&self) -> f32 {
        self.0.z
    }

    /// Component-wise product (`(a.x * b.x, a.y * b.y, a.z * b.z)`).
    pub fn component_mul(&self, other: &Vector3D) -> Vector3D {
        Self(self.0.component_mul(&other.0))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

impl Default for Vector3D {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<[f32; 3]> for Vector3D {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3<f32>> for Vector3D {
    fn from(v: Vector3<f32>) -> Self {
        Self(v)
    }
}

/// World-space position and orientation of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3D,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3D, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vector3D) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(Vector3D::zeros())
    }
}
