//! Axis-aligned bounding boxes

use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box that may be null (contain nothing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    extents: Option<(Point3f, Point3f)>,
}

impl Aabb {
    /// The empty box
    pub const fn null() -> Self {
        Self { extents: None }
    }

    /// Box spanning two corners
    pub fn from_corners(min: Point3f, max: Point3f) -> Self {
        let mut aabb = Self::null();
        aabb.merge_point(&min);
        aabb.merge_point(&max);
        aabb
    }

    pub fn is_null(&self) -> bool {
        self.extents.is_none()
    }

    pub fn set_null(&mut self) {
        self.extents = None;
    }

    pub fn min(&self) -> Option<Point3f> {
        self.extents.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<Point3f> {
        self.extents.map(|(_, max)| max)
    }

    /// Grow the box to contain `point`
    pub fn merge_point(&mut self, point: &Point3f) {
        self.extents = Some(match self.extents {
            None => (*point, *point),
            Some((min, max)) => (min.inf(point), max.sup(point)),
        });
    }

    /// Grow the box to contain `other`
    pub fn merge(&mut self, other: &Aabb) {
        if let Some((min, max)) = other.extents {
            self.merge_point(&min);
            self.merge_point(&max);
        }
    }

    pub fn center(&self) -> Option<Point3f> {
        self.extents.map(|(min, max)| nalgebra::center(&min, &max))
    }

    /// Radius of the origin-centred sphere enclosing the box; 0 when null
    pub fn radius(&self) -> f32 {
        match self.extents {
            None => 0.0,
            Some((min, max)) => min.coords.norm_squared().max(max.coords.norm_squared()).sqrt(),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::null()
    }
}
