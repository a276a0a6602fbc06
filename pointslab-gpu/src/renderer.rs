//! Draw list that turns attached slabs into wgpu draw calls

use crate::backend::WgpuBackend;
use pointslab_core::{
    Aabb, Classification, DrawList, GeometryView, RenderConfig, SlabId, Topology, VertexLayout,
};
use std::collections::BTreeMap;

/// Vertex buffer layout descriptor for slab buffers.
///
/// `attributes` must come from [`VertexLayout::vertex_attributes`] of the
/// same layout.
pub fn vertex_buffer_layout<'a>(
    layout: &VertexLayout,
    attributes: &'a [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
        array_stride: layout.stride() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Primitive topology to build the pipeline with
pub fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
    }
}

/// Point scale as a `vec4` uniform for the caller's material
pub fn scale_uniform(config: &RenderConfig) -> [f32; 4] {
    [config.scale.x, config.scale.y, config.scale.z, 0.0]
}

/// Records attached slabs and encodes their draws.
///
/// Opaque geometry should be drawn before alpha geometry, each with its own
/// pipeline; [`draw`](Self::draw) takes the classification to encode.
#[derive(Debug, Default)]
pub struct SlabDrawList {
    items: BTreeMap<SlabId, GeometryView>,
    bounds: Aabb,
    radius: f32,
    bounds_changed: bool,
}

impl SlabDrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached slabs
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn geometry(&self, id: SlabId) -> Option<&GeometryView> {
        self.items.get(&id)
    }

    /// Attached geometry of one classification, in slab creation order
    pub fn items(&self, classification: Classification) -> impl Iterator<Item = (SlabId, &GeometryView)> {
        self.items
            .iter()
            .filter(move |(_, g)| g.classification == classification)
            .map(|(id, g)| (*id, g))
    }

    /// Last aggregate bounds reported by the store
    pub fn bounds(&self) -> (Aabb, f32) {
        (self.bounds, self.radius)
    }

    /// True once after each bounds change, so the scene can refit its culling volume
    pub fn take_bounds_changed(&mut self) -> bool {
        std::mem::take(&mut self.bounds_changed)
    }

    /// Encode draws for every attached slab of `classification`.
    ///
    /// Returns the number of draw calls issued.
    pub fn draw<'a>(
        &self,
        pass: &mut wgpu::RenderPass<'a>,
        backend: &'a WgpuBackend,
        classification: Classification,
    ) -> usize {
        let mut draws = 0;
        for (id, geometry) in self.items(classification) {
            if geometry.vertex_count == 0 {
                continue;
            }
            let Some(buffer) = backend.buffer(geometry.buffer) else {
                log::warn!("slab {:?} is attached but its buffer is gone", id);
                continue;
            };

            let written = geometry.vertex_count as u64 * geometry.vertex_stride as u64;
            pass.set_vertex_buffer(0, buffer.slice(..written));
            pass.draw(0..geometry.vertex_count, 0..1);
            draws += 1;
        }
        draws
    }
}

impl DrawList for SlabDrawList {
    fn attach(&mut self, id: SlabId, geometry: GeometryView) {
        self.items.insert(id, geometry);
    }

    fn detach(&mut self, id: SlabId) {
        self.items.remove(&id);
    }

    fn notify_bounds_changed(&mut self, bounds: &Aabb, radius: f32) {
        self.bounds = *bounds;
        self.radius = radius;
        self.bounds_changed = true;
    }
}
