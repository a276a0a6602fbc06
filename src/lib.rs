//! # pointslab
//!
//! Slab-allocated vertex buffers for large, changing point clouds.
//!
//! This is the umbrella crate that provides convenient access to all pointslab
//! functionality. You can use this crate to get everything in one place, or use
//! individual crates for more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: point batches, vertex layouts, slabs and the batch store
//! - **GPU**: a wgpu buffer backend and a draw list that encodes slab draws
//!
//! ## Quick Start
//!
//! ```rust
//! use pointslab::prelude::*;
//!
//! let config = StoreConfig::new(RenderConfig::new(PrimitiveKind::Box));
//! let mut store = BatchStore::headless(HostBackend::new(), config);
//!
//! let batch = PointBatch::from_parts(
//!     vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 2.0, 3.0)],
//!     vec![Rgba::rgb(1.0, 0.0, 0.0), Rgba::new(0.0, 1.0, 0.0, 0.5)],
//! );
//! let handle = store.add(&batch).unwrap();
//! store.remove(handle);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: core only
//! - `gpu`: wgpu backend and draw list
//! - `all`: Enables all features

// Re-export core functionality
pub use pointslab_core::*;

// Re-export sub-crates
#[cfg(feature = "gpu")]
pub use pointslab_gpu as gpu;

/// Convenient imports for common use cases
pub mod prelude {
    pub use pointslab_core::*;

    #[cfg(feature = "gpu")]
    pub use pointslab_gpu::{GpuContext, SlabDrawList, WgpuBackend};
}
