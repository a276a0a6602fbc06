//! Conversion from the source frame into the render frame

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Axis convention that incoming positions and normals are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisConvention {
    /// Already in the render frame
    Native,
    /// X forward, Y left, Z up; mapped to Y up with -Z forward
    #[default]
    ZUpToYUp,
}

impl AxisConvention {
    /// Apply the convention to a point
    pub fn transform_point(self, point: &Point3<f32>) -> Point3<f32> {
        match self {
            AxisConvention::Native => *point,
            AxisConvention::ZUpToYUp => Point3::new(-point.y, point.z, -point.x),
        }
    }

    /// Apply the convention to a direction
    pub fn transform_vector(self, vector: &Vector3<f32>) -> Vector3<f32> {
        match self {
            AxisConvention::Native => *vector,
            AxisConvention::ZUpToYUp => Vector3::new(-vector.y, vector.z, -vector.x),
        }
    }
}

/// Shortest rotation taking +Z onto `normal`.
///
/// A normal pointing straight down -Z has no unique shortest rotation; it
/// gets a half turn about +X. A zero normal yields the identity.
pub fn orientation_from_normal(normal: &Vector3<f32>) -> UnitQuaternion<f32> {
    if normal.norm_squared() <= f32::EPSILON {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::rotation_between(&Vector3::z(), normal)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI))
}
