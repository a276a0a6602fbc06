//! Render and store configuration

use crate::error::{Error, Result};
use crate::point::Vector3f;
use crate::transform::AxisConvention;
use serde::{Deserialize, Serialize};

/// How each point is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Point,
    Billboard,
    BillboardSphere,
    Box,
}

impl PrimitiveKind {
    /// Wire code of this primitive
    pub fn code(self) -> u8 {
        match self {
            PrimitiveKind::Point => 0,
            PrimitiveKind::Billboard => 1,
            PrimitiveKind::BillboardSphere => 2,
            PrimitiveKind::Box => 3,
        }
    }
}

impl TryFrom<u8> for PrimitiveKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(PrimitiveKind::Point),
            1 => Ok(PrimitiveKind::Billboard),
            2 => Ok(PrimitiveKind::BillboardSphere),
            3 => Ok(PrimitiveKind::Box),
            other => Err(Error::UnknownPrimitive(other)),
        }
    }
}

/// Rendering configuration, fixed for the lifetime of a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub primitive: PrimitiveKind,
    pub has_normals: bool,
    pub has_orientations: bool,
    /// Size of one point, handed to the material
    pub scale: Vector3f,
    /// Points are expanded to geometry by a GPU stage rather than here
    pub gpu_expansion: bool,
    /// Frame convention positions and normals arrive in
    pub frame: AxisConvention,
}

impl RenderConfig {
    pub fn new(primitive: PrimitiveKind) -> Self {
        Self {
            primitive,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, has_normals: bool) -> Self {
        self.has_normals = has_normals;
        self
    }

    pub fn with_orientations(mut self, has_orientations: bool) -> Self {
        self.has_orientations = has_orientations;
        self
    }

    pub fn with_scale(mut self, scale: Vector3f) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_gpu_expansion(mut self, gpu_expansion: bool) -> Self {
        self.gpu_expansion = gpu_expansion;
        self
    }

    pub fn with_frame(mut self, frame: AxisConvention) -> Self {
        self.frame = frame;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            primitive: PrimitiveKind::Point,
            has_normals: false,
            has_orientations: false,
            scale: Vector3f::new(0.05, 0.05, 0.05),
            gpu_expansion: false,
            frame: AxisConvention::default(),
        }
    }
}

/// What to do with slabs whose points have all been removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReclaimPolicy {
    /// Keep one empty slab per classification that can still take points
    #[default]
    RetainOne,
    /// Destroy every empty slab
    RetainNone,
}

/// Configuration of a [`BatchStore`](crate::store::BatchStore)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub render: RenderConfig,
    pub reclaim: ReclaimPolicy,
}

impl StoreConfig {
    pub fn new(render: RenderConfig) -> Self {
        Self {
            render,
            reclaim: ReclaimPolicy::default(),
        }
    }

    pub fn with_reclaim(mut self, reclaim: ReclaimPolicy) -> Self {
        self.reclaim = reclaim;
        self
    }
}
