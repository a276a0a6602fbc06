//! Fixed-capacity vertex buffers holding points of one classification
//!
//! Points are appended at a cursor that only moves forward. Removing points
//! overwrites their vertex positions with a far-away sentinel instead of
//! compacting the buffer, so freed offsets are not reused until the whole
//! slab is reclaimed. Which offsets are live is tracked beside the buffer,
//! never inferred from the vertex bytes.

use crate::backend::{with_locked, BufferBackend, BufferHandle, LockMode};
use crate::bounds::Aabb;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::layout::{Attribute, VertexLayout};
use crate::point::{Classification, Point3f, PointBatch, Vector3f};
use crate::traits::{Drawable, GeometryView, Topology};
use crate::transform::orientation_from_normal;
use std::ops::Range;

/// Points per slab
pub const CAPACITY: usize = 8192;

/// Coordinate written over removed vertices, outside any sane view volume
pub const TOMBSTONE: f32 = 99_999_999.0;

/// Identifier of a slab within its store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlabId(pub u64);

/// Attributes of one point, converted into the render frame
struct ResolvedPoint {
    position: Point3f,
    normal: Vector3f,
    orientation: [f32; 4],
    color: u32,
}

impl ResolvedPoint {
    fn resolve(batch: &PointBatch, index: usize, config: &RenderConfig, from_normal: bool) -> Self {
        let frame = config.frame;
        let position = frame.transform_point(&batch.positions[index]);

        let normal = if config.has_normals || from_normal {
            frame.transform_vector(&batch.normals[index])
        } else {
            Vector3f::z()
        };

        let orientation = if !config.has_orientations {
            [0.0, 0.0, 0.0, 1.0]
        } else {
            let q = if from_normal {
                orientation_from_normal(&normal)
            } else {
                batch.orientations[index]
            };
            let c = q.quaternion().coords;
            [c.x, c.y, c.z, c.w]
        };

        Self {
            position,
            normal,
            orientation,
            color: batch.colors[index].pack_rgba8(),
        }
    }
}

fn put(vertex: &mut [u8], offset: usize, values: &[f32]) {
    let bytes: &[u8] = bytemuck::cast_slice(values);
    vertex[offset..offset + bytes.len()].copy_from_slice(bytes);
}

/// Write all vertices of one point into `out`, which spans exactly one point
fn write_point(layout: &VertexLayout, out: &mut [u8], point: &ResolvedPoint) {
    let position = [point.position.x, point.position.y, point.position.z];
    let normal = [point.normal.x, point.normal.y, point.normal.z];

    for (j, vertex) in out.chunks_exact_mut(layout.stride()).enumerate() {
        for &(attribute, offset) in layout.attributes() {
            match attribute {
                Attribute::Position => put(vertex, offset, &position),
                Attribute::ShapeNormal => {
                    if let Some(n) = layout.shape_normal(j) {
                        put(vertex, offset, &n);
                    }
                }
                Attribute::ShapeOffset => put(vertex, offset, &layout.shape_offset(j)),
                Attribute::PointNormal => put(vertex, offset, &normal),
                Attribute::Orientation => put(vertex, offset, &point.orientation),
                Attribute::Color => {
                    vertex[offset..offset + 4].copy_from_slice(&point.color.to_le_bytes())
                }
            }
        }
    }
}

/// A block of backend vertex storage for up to [`CAPACITY`] points
#[derive(Debug)]
pub struct Slab {
    id: SlabId,
    classification: Classification,
    buffer: BufferHandle,
    layout: VertexLayout,
    scale: Vector3f,
    occupied: usize,
    append_cursor: usize,
    /// Live point offsets, sorted and disjoint
    live: Vec<Range<usize>>,
    bounds: Aabb,
    /// Points were removed since `bounds` was computed
    bounds_stale: bool,
}

impl Slab {
    /// Allocate backend storage for a new, empty slab
    pub fn new<B: BufferBackend + ?Sized>(
        backend: &mut B,
        id: SlabId,
        classification: Classification,
        layout: &VertexLayout,
        config: &RenderConfig,
    ) -> Result<Self> {
        let buffer = backend.create_buffer(layout.stride(), CAPACITY * layout.vertices_per_point())?;
        log::debug!(
            "created {:?} slab {:?} ({} bytes)",
            classification,
            id,
            CAPACITY * layout.point_stride()
        );

        Ok(Self {
            id,
            classification,
            buffer,
            layout: layout.clone(),
            scale: config.scale,
            occupied: 0,
            append_cursor: 0,
            live: Vec::new(),
            bounds: Aabb::null(),
            bounds_stale: false,
        })
    }

    /// Append the points of `batch` at `indices`, as many as still fit.
    ///
    /// Every index must name a point of this slab's classification. Returns
    /// the point offset of the first written point and how many were taken;
    /// fewer than `indices.len()` means the slab is now full.
    pub fn append<B: BufferBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        batch: &PointBatch,
        indices: &[usize],
        config: &RenderConfig,
    ) -> Result<(usize, usize)> {
        let start = self.append_cursor;
        let accepted = indices.len().min(CAPACITY - self.append_cursor);
        if accepted == 0 {
            return Ok((start, 0));
        }

        let accepted_indices = &indices[..accepted];
        debug_assert!(accepted_indices
            .iter()
            .all(|&i| Classification::of(&batch.colors[i]) == self.classification));

        let point_stride = self.layout.point_stride();
        let range = start * point_stride..(start + accepted) * point_stride;
        let from_normal = batch.orientation_from_normal(config);
        let layout = &self.layout;
        let mut bounds = self.bounds;

        with_locked(backend, self.buffer, range, LockMode::NoOverwrite, |region| {
            for (out, &index) in region.chunks_exact_mut(point_stride).zip(accepted_indices) {
                let point = ResolvedPoint::resolve(batch, index, config, from_normal);
                bounds.merge_point(&point.position);
                write_point(layout, out, &point);
            }
        })?;

        self.bounds = bounds;
        self.append_cursor += accepted;
        self.occupied += accepted;
        match self.live.last_mut() {
            Some(last) if last.end == start => last.end += accepted,
            _ => self.live.push(start..start + accepted),
        }
        log::trace!("slab {:?}: appended {} points at {}", self.id, accepted, start);

        Ok((start, accepted))
    }

    /// Tombstone `count` points starting at point offset `start`.
    ///
    /// The range must lie below the append cursor and be entirely live.
    /// Offsets are not reused.
    pub fn remove<B: BufferBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        start: usize,
        count: usize,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if start + count > self.append_cursor {
            return Err(Error::InvalidInput(format!(
                "remove of {}..{} beyond append cursor {} of slab {:?}",
                start,
                start + count,
                self.append_cursor,
                self.id
            )));
        }
        let end = start + count;
        let Some(index) = self.live.iter().position(|r| r.start <= start && end <= r.end) else {
            return Err(Error::InvalidInput(format!(
                "remove of {}..{} from slab {:?} covers points that are not live",
                start, end, self.id
            )));
        };

        let point_stride = self.layout.point_stride();
        let stride = self.layout.stride();
        let range = start * point_stride..(start + count) * point_stride;
        let position = self.layout.offset_of(Attribute::Position).unwrap_or(0);

        with_locked(backend, self.buffer, range, LockMode::NoOverwrite, |region| {
            for vertex in region.chunks_exact_mut(stride) {
                put(vertex, position, &[TOMBSTONE; 3]);
            }
        })?;

        let live = self.live.remove(index);
        for piece in [live.start..start, end..live.end].into_iter().rev() {
            if !piece.is_empty() {
                self.live.insert(index, piece);
            }
        }

        self.occupied -= count;
        if self.occupied == 0 {
            self.bounds.set_null();
            self.bounds_stale = false;
        } else {
            self.bounds_stale = true;
        }
        log::trace!("slab {:?}: tombstoned {} points at {}", self.id, count, start);

        Ok(())
    }

    /// Recompute the bounds from the live vertices if points were removed
    /// since they were last computed.
    pub fn refresh_bounds<B: BufferBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        if !self.bounds_stale {
            return Ok(());
        }

        let bounds = match (self.live.first(), self.live.last()) {
            (Some(first), Some(last)) => {
                let point_stride = self.layout.point_stride();
                let position = self.layout.offset_of(Attribute::Position).unwrap_or(0);
                let base = first.start;
                let range = base * point_stride..last.end * point_stride;
                let live = &self.live;

                with_locked(backend, self.buffer, range, LockMode::ReadOnly, |region| {
                    let mut bounds = Aabb::null();
                    for offset in live.iter().flat_map(|r| r.clone()) {
                        let at = (offset - base) * point_stride + position;
                        let p: [f32; 3] = bytemuck::pod_read_unaligned(&region[at..at + 12]);
                        bounds.merge_point(&Point3f::from(p));
                    }
                    bounds
                })?
            }
            _ => Aabb::null(),
        };

        self.bounds = bounds;
        self.bounds_stale = false;
        Ok(())
    }

    /// Move the append cursor back to `start` if nothing live lies at or
    /// beyond it. Returns whether the cursor moved.
    pub fn rewind(&mut self, start: usize) -> bool {
        let clear = self.live.last().map_or(true, |r| r.end <= start);
        if !clear || start >= self.append_cursor {
            return false;
        }
        self.append_cursor = start;
        true
    }

    /// Release the backend storage
    pub fn destroy<B: BufferBackend + ?Sized>(self, backend: &mut B) {
        log::debug!("destroying {:?} slab {:?}", self.classification, self.id);
        backend.destroy(self.buffer);
    }

    pub fn id(&self) -> SlabId {
        self.id
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Live points
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Next free point offset
    pub fn append_cursor(&self) -> usize {
        self.append_cursor
    }

    pub fn is_full(&self) -> bool {
        self.append_cursor == CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Live point offset ranges, in order
    pub fn live_ranges(&self) -> &[Range<usize>] {
        &self.live
    }
}

impl Drawable for Slab {
    fn geometry(&self) -> GeometryView {
        GeometryView {
            buffer: self.buffer,
            classification: self.classification,
            topology: if self.layout.is_triangle_list() {
                Topology::TriangleList
            } else {
                Topology::PointList
            },
            vertex_count: (self.append_cursor * self.layout.vertices_per_point()) as u32,
            vertex_stride: self.layout.stride(),
            scale: self.scale,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bounds
    }
}
