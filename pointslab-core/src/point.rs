//! Point types and batches of point attributes

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Alpha values below this are drawn with blending
pub const ALPHA_THRESHOLD: f32 = 0.99;

/// An RGBA color with floating point channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB channels
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Pack into a `u32` laid out as RGBA8 in memory, the layout of
    /// `Unorm8x4` vertex attributes.
    pub fn pack_rgba8(&self) -> u32 {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        u32::from_le_bytes([to_byte(self.r), to_byte(self.g), to_byte(self.b), to_byte(self.a)])
    }

    /// Classification implied by this color's alpha
    pub fn classification(&self) -> Classification {
        Classification::of(self)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

/// Whether a point is drawn opaque or alpha-blended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Classification {
    Opaque,
    Alpha,
}

impl Classification {
    pub const ALL: [Classification; 2] = [Classification::Opaque, Classification::Alpha];

    pub fn of(color: &Rgba) -> Self {
        if color.a < ALPHA_THRESHOLD {
            Classification::Alpha
        } else {
            Classification::Opaque
        }
    }

    pub fn is_alpha(self) -> bool {
        self == Classification::Alpha
    }
}

/// A batch of points given as parallel attribute sequences.
///
/// `normals` and `orientations` may be left empty when the render
/// configuration does not declare them. When orientations are declared but
/// absent, they are derived from the normals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    pub positions: Vec<Point3f>,
    pub colors: Vec<Rgba>,
    pub normals: Vec<Vector3f>,
    pub orientations: Vec<UnitQuaternion<f32>>,
}

impl PointBatch {
    /// Create a new empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch from positions and colors
    pub fn from_parts(positions: Vec<Point3f>, colors: Vec<Rgba>) -> Self {
        Self {
            positions,
            colors,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_orientations(mut self, orientations: Vec<UnitQuaternion<f32>>) -> Self {
        self.orientations = orientations;
        self
    }

    /// Add a point with only position and color
    pub fn push(&mut self, position: Point3f, color: Rgba) {
        self.positions.push(position);
        self.colors.push(color);
    }

    /// Number of points in the batch
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check the attribute sequences against what `config` declares.
    pub fn validate(&self, config: &RenderConfig) -> Result<()> {
        let n = self.positions.len();
        if self.colors.len() != n {
            return Err(Error::InvalidInput(format!(
                "{} positions but {} colors",
                n,
                self.colors.len()
            )));
        }

        if config.has_normals && self.normals.len() != n {
            return Err(Error::InvalidInput(format!(
                "normals declared: expected {} normals, got {}",
                n,
                self.normals.len()
            )));
        }

        if config.has_orientations
            && self.orientations.len() != n
            && !(self.orientations.is_empty() && self.normals.len() == n)
        {
            return Err(Error::InvalidInput(format!(
                "orientations declared: expected {} orientations (or {} normals to derive them from), got {} orientations and {} normals",
                n,
                n,
                self.orientations.len(),
                self.normals.len()
            )));
        }

        Ok(())
    }

    /// True when orientations must be derived from normals
    pub fn orientation_from_normal(&self, config: &RenderConfig) -> bool {
        config.has_orientations && self.orientations.is_empty() && self.normals.len() == self.len()
    }

    /// Split point indices by classification, keeping input order.
    ///
    /// Returns `[opaque, alpha]`.
    pub fn partition(&self) -> [Vec<usize>; 2] {
        let mut opaque = Vec::new();
        let mut alpha = Vec::new();
        for (i, color) in self.colors.iter().enumerate() {
            match Classification::of(color) {
                Classification::Opaque => opaque.push(i),
                Classification::Alpha => alpha.push(i),
            }
        }
        [opaque, alpha]
    }
}
