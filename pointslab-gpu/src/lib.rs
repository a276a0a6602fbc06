//! # pointslab GPU
//!
//! wgpu implementations of the collaborators a `BatchStore` needs: a buffer
//! backend that owns the slab vertex buffers, and a draw list that encodes
//! draws for them.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pointslab_gpu::{GpuContext, SlabDrawList, WgpuBackend};
//! use pointslab_core::{BatchStore, PointBatch, PrimitiveKind, RenderConfig, StoreConfig};
//!
//! async fn example(batch: PointBatch) -> pointslab_core::Result<()> {
//!     let gpu_context = GpuContext::new().await?;
//!     let config = StoreConfig::new(RenderConfig::new(PrimitiveKind::Billboard));
//!     let mut store = BatchStore::new(WgpuBackend::new(gpu_context), SlabDrawList::new(), config);
//!
//!     let handle = store.add(&batch)?;
//!     // ... draw with store.draw_list().draw(&mut pass, store.backend(), Classification::Opaque)
//!     store.remove(handle);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod device;
pub mod renderer;

// Re-export commonly used items
pub use backend::WgpuBackend;
pub use device::GpuContext;
pub use renderer::{primitive_topology, scale_uniform, vertex_buffer_layout, SlabDrawList};
