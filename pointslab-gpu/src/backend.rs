//! wgpu implementation of the slab buffer backend
//!
//! wgpu has no persistent host mapping for vertex buffers that are also being
//! drawn from, so every buffer keeps a host shadow copy. `lock` hands out a
//! range of the shadow and `unlock` uploads exactly that range through the
//! queue, which wgpu orders before any later submission.

use crate::device::GpuContext;
use pointslab_core::{BufferBackend, BufferHandle, Error, LockMode, Result};
use std::collections::HashMap;
use std::ops::Range;

struct ShadowedBuffer {
    buffer: wgpu::Buffer,
    shadow: Vec<u8>,
    locked: Option<(Range<usize>, LockMode)>,
}

/// Buffer backend allocating `VERTEX | COPY_DST` wgpu buffers
pub struct WgpuBackend {
    context: GpuContext,
    buffers: HashMap<BufferHandle, ShadowedBuffer>,
    next_handle: u64,
}

impl WgpuBackend {
    pub fn new(context: GpuContext) -> Self {
        Self {
            context,
            buffers: HashMap::new(),
            next_handle: 0,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// The wgpu buffer behind `handle`, for binding in a render pass
    pub fn buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&handle).map(|b| &b.buffer)
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }
}

impl BufferBackend for WgpuBackend {
    fn create_buffer(&mut self, vertex_stride: usize, capacity_vertices: usize) -> Result<BufferHandle> {
        let size = vertex_stride
            .checked_mul(capacity_vertices)
            .ok_or_else(|| Error::ResourceExhausted("buffer size overflows".to_string()))?;

        if size as u64 > self.context.max_buffer_size() {
            return Err(Error::ResourceExhausted(format!(
                "{} byte buffer exceeds device limit of {}",
                size,
                self.context.max_buffer_size()
            )));
        }
        if size as u64 % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(Error::Backend(format!(
                "buffer size {} is not a multiple of {}",
                size,
                wgpu::COPY_BUFFER_ALIGNMENT
            )));
        }

        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        let label = format!("pointslab slab {}", handle.0);
        let buffer = self.context.create_vertex_buffer(&label, size as u64);

        self.buffers.insert(
            handle,
            ShadowedBuffer {
                buffer,
                shadow: vec![0; size],
                locked: None,
            },
        );
        log::debug!("allocated wgpu buffer {:?} ({} bytes)", handle, size);
        Ok(handle)
    }

    fn lock(
        &mut self,
        buffer: BufferHandle,
        byte_offset: usize,
        byte_length: usize,
        mode: LockMode,
    ) -> Result<&mut [u8]> {
        let shadowed = self
            .buffers
            .get_mut(&buffer)
            .ok_or_else(|| Error::Backend(format!("lock of unknown buffer {:?}", buffer)))?;

        if shadowed.locked.is_some() {
            return Err(Error::Backend(format!("buffer {:?} is already locked", buffer)));
        }

        let end = byte_offset + byte_length;
        if end > shadowed.shadow.len() {
            return Err(Error::Backend(format!(
                "lock range {}..{} exceeds buffer of {} bytes",
                byte_offset,
                end,
                shadowed.shadow.len()
            )));
        }

        shadowed.locked = Some((byte_offset..end, mode));
        Ok(&mut shadowed.shadow[byte_offset..end])
    }

    fn unlock(&mut self, buffer: BufferHandle) {
        let Some(shadowed) = self.buffers.get_mut(&buffer) else {
            return;
        };
        let Some((range, mode)) = shadowed.locked.take() else {
            return;
        };
        if mode == LockMode::ReadOnly || range.is_empty() {
            return;
        }

        self.context
            .queue
            .write_buffer(&shadowed.buffer, range.start as u64, &shadowed.shadow[range]);
    }

    fn destroy(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(shadowed) => {
                shadowed.buffer.destroy();
                log::debug!("destroyed wgpu buffer {:?}", buffer);
            }
            None => log::warn!("destroy of unknown buffer {:?}", buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointslab_core::{
        BatchStore, Classification, Point3f, PointBatch, PrimitiveKind, RenderConfig, Rgba, StoreConfig,
    };

    /// Try to create a GPU context, return None if not available
    async fn try_create_gpu_context() -> Option<GpuContext> {
        match GpuContext::new().await {
            Ok(gpu) => Some(gpu),
            Err(_) => {
                println!("GPU not available, skipping GPU-dependent test");
                None
            }
        }
    }

    #[test]
    fn test_lock_unlock_round() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut backend = WgpuBackend::new(gpu);

            let handle = backend.create_buffer(16, 64).unwrap();
            assert!(backend.buffer(handle).is_some());
            assert_eq!(backend.buffer(handle).unwrap().size(), 1024);

            let region = backend.lock(handle, 16, 32, LockMode::NoOverwrite).unwrap();
            region.fill(0xAB);
            assert!(backend.lock(handle, 0, 4, LockMode::NoOverwrite).is_err());
            backend.unlock(handle);
            assert!(backend.lock(handle, 0, 4, LockMode::ReadOnly).is_ok());
            backend.unlock(handle);

            backend.destroy(handle);
            assert!(backend.buffer(handle).is_none());
            assert_eq!(backend.live_buffers(), 0);
        });
    }

    #[test]
    fn test_out_of_range_lock() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut backend = WgpuBackend::new(gpu);
            let handle = backend.create_buffer(16, 4).unwrap();
            assert!(backend.lock(handle, 48, 32, LockMode::NoOverwrite).is_err());
            assert!(backend.lock(BufferHandle(999), 0, 4, LockMode::NoOverwrite).is_err());
        });
    }

    #[test]
    fn test_store_over_wgpu() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let config = StoreConfig::new(RenderConfig::new(PrimitiveKind::Billboard));
            let mut store = BatchStore::headless(WgpuBackend::new(gpu), config);

            let batch = PointBatch::from_parts(
                vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0)],
                vec![Rgba::rgb(1.0, 0.0, 0.0), Rgba::new(0.0, 0.0, 1.0, 0.25)],
            );
            let handle = store.add(&batch).unwrap();
            assert_eq!(store.slab_count(Classification::Opaque), 1);
            assert_eq!(store.slab_count(Classification::Alpha), 1);
            assert_eq!(store.backend().live_buffers(), 2);

            store.remove(handle);
            store.clear();
            assert_eq!(store.backend().live_buffers(), 0);
        });
    }
}
