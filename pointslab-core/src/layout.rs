//! Per-vertex layout of slab buffers
//!
//! Each logical point expands into `V` vertices. The layout depends only on
//! the [`RenderConfig`]: which primitive is drawn, which per-point attributes
//! are copied through, and whether expansion happens here or in a GPU stage.
//!
//! Attributes are laid out in this order, each present or absent as noted:
//!
//! | attribute      | format | present when                         |
//! |----------------|--------|--------------------------------------|
//! | position       | f32x3  | always                               |
//! | shape normal   | f32x3  | boxes expanded locally               |
//! | shape offset   | f32x3  | any non-point primitive expanded locally |
//! | point normal   | f32x3  | `has_normals`                        |
//! | orientation    | f32x4  | `has_orientations`                   |
//! | color          | u32    | always, packed RGBA8                 |

use crate::config::{PrimitiveKind, RenderConfig};

const FLOAT3: usize = 3 * std::mem::size_of::<f32>();
const FLOAT4: usize = 4 * std::mem::size_of::<f32>();
const COLOR: usize = std::mem::size_of::<u32>();

const POINT_OFFSETS: [[f32; 3]; 1] = [[0.0, 0.0, 0.0]];

/// Unit quad as two triangles
const QUAD_OFFSETS: [[f32; 3]; 6] = [
    [-0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
    [0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
];

/// Unit cube, six faces of two triangles each
const BOX_OFFSETS: [[f32; 3]; 36] = [
    // front
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    // back
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5],
    // right
    [0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, -0.5, 0.5],
    // left
    [-0.5, 0.5, 0.5],
    [-0.5, -0.5, 0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [-0.5, -0.5, -0.5],
    // top
    [-0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, -0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
    // bottom
    [-0.5, -0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
];

/// Outward normal of each cube face, in the face order of [`BOX_OFFSETS`]
const BOX_FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
];

/// A vertex attribute a layout may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    ShapeNormal,
    ShapeOffset,
    PointNormal,
    Orientation,
    Color,
}

impl Attribute {
    /// Size of the attribute in bytes
    pub fn size(self) -> usize {
        match self {
            Attribute::Position
            | Attribute::ShapeNormal
            | Attribute::ShapeOffset
            | Attribute::PointNormal => FLOAT3,
            Attribute::Orientation => FLOAT4,
            Attribute::Color => COLOR,
        }
    }

    #[cfg(feature = "gpu")]
    fn format(self) -> wgpu::VertexFormat {
        match self {
            Attribute::Position
            | Attribute::ShapeNormal
            | Attribute::ShapeOffset
            | Attribute::PointNormal => wgpu::VertexFormat::Float32x3,
            Attribute::Orientation => wgpu::VertexFormat::Float32x4,
            Attribute::Color => wgpu::VertexFormat::Unorm8x4,
        }
    }
}

/// Vertex geometry for one render configuration
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    primitive: PrimitiveKind,
    local_expansion: bool,
    attributes: Vec<(Attribute, usize)>,
    stride: usize,
}

impl VertexLayout {
    pub fn new(config: &RenderConfig) -> Self {
        let local_expansion = !config.gpu_expansion;
        let mut attributes = Vec::with_capacity(6);
        let mut offset = 0;
        let mut push = |attribute: Attribute| {
            attributes.push((attribute, offset));
            offset += attribute.size();
        };

        push(Attribute::Position);
        if local_expansion && config.primitive == PrimitiveKind::Box {
            push(Attribute::ShapeNormal);
        }
        if local_expansion && config.primitive != PrimitiveKind::Point {
            push(Attribute::ShapeOffset);
        }
        if config.has_normals {
            push(Attribute::PointNormal);
        }
        if config.has_orientations {
            push(Attribute::Orientation);
        }
        push(Attribute::Color);

        Self {
            primitive: config.primitive,
            local_expansion,
            attributes,
            stride: offset,
        }
    }

    /// Vertices written per logical point
    pub fn vertices_per_point(&self) -> usize {
        self.shape_offsets().len()
    }

    /// Bytes per vertex
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per logical point
    pub fn point_stride(&self) -> usize {
        self.stride * self.vertices_per_point()
    }

    /// Byte offset of `attribute` within a vertex, if the layout carries it
    pub fn offset_of(&self, attribute: Attribute) -> Option<usize> {
        self.attributes
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|&(_, offset)| offset)
    }

    /// Attributes in layout order with their byte offsets
    pub fn attributes(&self) -> &[(Attribute, usize)] {
        &self.attributes
    }

    /// True when vertices form triangles rather than points
    pub fn is_triangle_list(&self) -> bool {
        self.vertices_per_point() > 1
    }

    /// Local shape coordinate of vertex `j` of a point
    pub fn shape_offset(&self, j: usize) -> [f32; 3] {
        self.shape_offsets()[j]
    }

    /// Per-vertex shading normal of vertex `j`; only boxes carry one
    pub fn shape_normal(&self, j: usize) -> Option<[f32; 3]> {
        if self.local_expansion && self.primitive == PrimitiveKind::Box {
            Some(BOX_FACE_NORMALS[j / 6])
        } else {
            None
        }
    }

    fn shape_offsets(&self) -> &'static [[f32; 3]] {
        if !self.local_expansion {
            return &POINT_OFFSETS;
        }
        match self.primitive {
            PrimitiveKind::Point => &POINT_OFFSETS,
            PrimitiveKind::Billboard | PrimitiveKind::BillboardSphere => &QUAD_OFFSETS,
            PrimitiveKind::Box => &BOX_OFFSETS,
        }
    }

    /// Vertex attributes for a wgpu pipeline, numbered from shader location 0
    #[cfg(feature = "gpu")]
    pub fn vertex_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .enumerate()
            .map(|(location, &(attribute, offset))| wgpu::VertexAttribute {
                offset: offset as wgpu::BufferAddress,
                shader_location: location as u32,
                format: attribute.format(),
            })
            .collect()
    }
}
