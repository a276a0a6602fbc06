//! Core traits for pointslab

use crate::backend::BufferHandle;
use crate::bounds::Aabb;
use crate::point::{Classification, Vector3f};
use crate::slab::SlabId;

/// Primitive topology of a vertex range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    PointList,
    TriangleList,
}

/// Everything a draw list needs to issue a draw for one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryView {
    pub buffer: BufferHandle,
    pub classification: Classification,
    pub topology: Topology,
    /// Vertices written so far, tombstoned ones included
    pub vertex_count: u32,
    pub vertex_stride: usize,
    /// Point size for the material
    pub scale: Vector3f,
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Geometry to bind and draw
    fn geometry(&self) -> GeometryView;

    /// Get the bounding box of the object
    fn bounding_box(&self) -> Aabb;

    /// Radius of the origin-centred sphere enclosing the object
    fn bounding_radius(&self) -> f32 {
        self.bounding_box().radius()
    }
}

/// Scene-side consumer of drawables
///
/// `attach` is an upsert: it is called when a slab is created and again
/// whenever its written range grows, always with the current geometry.
pub trait DrawList {
    fn attach(&mut self, id: SlabId, geometry: GeometryView);

    fn detach(&mut self, id: SlabId);

    /// The aggregate bounds of everything attached changed
    fn notify_bounds_changed(&mut self, bounds: &Aabb, radius: f32);
}

/// Draw list that ignores everything, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDrawList;

impl DrawList for NullDrawList {
    fn attach(&mut self, _id: SlabId, _geometry: GeometryView) {}

    fn detach(&mut self, _id: SlabId) {}

    fn notify_bounds_changed(&mut self, _bounds: &Aabb, _radius: f32) {}
}
