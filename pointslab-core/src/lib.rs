//! Core data structures and traits for pointslab
//!
//! This crate batches points into fixed-capacity vertex buffers ("slabs"),
//! expands each point into the vertices its primitive needs, and hands out
//! handles for removing whole batches again.
//!
//! ```rust
//! use pointslab_core::*;
//!
//! let config = StoreConfig::new(RenderConfig::new(PrimitiveKind::Billboard));
//! let mut store = BatchStore::headless(HostBackend::new(), config);
//!
//! let mut batch = PointBatch::new();
//! batch.push(Point3f::new(0.0, 0.0, 0.0), Rgba::rgb(1.0, 0.0, 0.0));
//! batch.push(Point3f::new(1.0, 0.0, 0.0), Rgba::new(0.0, 0.0, 1.0, 0.5));
//!
//! let handle = store.add(&batch)?;
//! assert_eq!(store.point_count(), 2);
//!
//! store.remove(handle);
//! assert_eq!(store.point_count(), 0);
//! # Ok::<(), pointslab_core::Error>(())
//! ```

pub mod backend;
pub mod bounds;
pub mod config;
pub mod error;
pub mod layout;
pub mod point;
pub mod slab;
pub mod store;
pub mod traits;
pub mod transform;

pub use backend::*;
pub use bounds::*;
pub use config::*;
pub use error::*;
pub use layout::*;
pub use point::*;
pub use slab::*;
pub use store::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, UnitQuaternion, Vector3};
