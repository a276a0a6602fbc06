//! Vertex buffer storage behind slabs
//!
//! A [`BufferBackend`] hands out fixed-size buffers and lets the caller lock a
//! byte range for writing. [`HostBackend`] keeps everything in host memory;
//! `pointslab-gpu` provides a wgpu implementation.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::ops::Range;

/// Opaque identifier of a backend buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// How a locked range will be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// The range is not in use by pending draws; write without synchronising
    NoOverwrite,
    /// General read-write access
    ReadWrite,
    /// The range is only read; nothing needs publishing on unlock
    ReadOnly,
}

/// Storage provider for slab vertex buffers
pub trait BufferBackend {
    /// Allocate a buffer of `capacity_vertices` vertices of `vertex_stride` bytes
    fn create_buffer(&mut self, vertex_stride: usize, capacity_vertices: usize) -> Result<BufferHandle>;

    /// Lock a byte range of `buffer` and return it for writing
    fn lock(
        &mut self,
        buffer: BufferHandle,
        byte_offset: usize,
        byte_length: usize,
        mode: LockMode,
    ) -> Result<&mut [u8]>;

    /// Release the lock taken by [`lock`](Self::lock), publishing the writes
    fn unlock(&mut self, buffer: BufferHandle);

    /// Free `buffer`; the handle must not be used again
    fn destroy(&mut self, buffer: BufferHandle);
}

/// Lock a range, run `write` on it and unlock again.
///
/// The unlock happens on every path once the lock succeeded.
pub fn with_locked<B, F, R>(
    backend: &mut B,
    buffer: BufferHandle,
    range: Range<usize>,
    mode: LockMode,
    write: F,
) -> Result<R>
where
    B: BufferBackend + ?Sized,
    F: FnOnce(&mut [u8]) -> R,
{
    let region = backend.lock(buffer, range.start, range.len(), mode)?;
    let out = write(region);
    backend.unlock(buffer);
    Ok(out)
}

#[derive(Debug)]
struct HostBuffer {
    bytes: Vec<u8>,
    locked: Option<Range<usize>>,
}

/// Buffer backend keeping every buffer in host memory.
///
/// Used headless and in tests. It is strict about misuse: double locks,
/// out-of-range locks and unknown handles are errors, and an optional byte
/// budget simulates running out of memory.
#[derive(Debug, Default)]
pub struct HostBackend {
    buffers: HashMap<BufferHandle, HostBuffer>,
    next_handle: u64,
    budget: Option<usize>,
    allocated: usize,
    created: usize,
    destroyed: Vec<BufferHandle>,
}

impl HostBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses allocations once `bytes` are in use
    pub fn with_budget(bytes: usize) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    /// Contents of a live buffer
    pub fn read(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.bytes.as_slice())
    }

    /// Number of live buffers
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of buffers ever created
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Handles destroyed so far, in order
    pub fn destroyed(&self) -> &[BufferHandle] {
        &self.destroyed
    }

    /// Bytes currently allocated
    pub fn allocated_bytes(&self) -> usize {
        self.allocated
    }

    /// True if any buffer is still locked
    pub fn any_locked(&self) -> bool {
        self.buffers.values().any(|b| b.locked.is_some())
    }
}

impl BufferBackend for HostBackend {
    fn create_buffer(&mut self, vertex_stride: usize, capacity_vertices: usize) -> Result<BufferHandle> {
        let size = vertex_stride
            .checked_mul(capacity_vertices)
            .ok_or_else(|| Error::ResourceExhausted("buffer size overflows".to_string()))?;

        if let Some(budget) = self.budget {
            if self.allocated + size > budget {
                return Err(Error::ResourceExhausted(format!(
                    "{} bytes requested, {} of {} in use",
                    size, self.allocated, budget
                )));
            }
        }

        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        self.buffers.insert(
            handle,
            HostBuffer {
                bytes: vec![0; size],
                locked: None,
            },
        );
        self.allocated += size;
        self.created += 1;
        Ok(handle)
    }

    fn lock(
        &mut self,
        buffer: BufferHandle,
        byte_offset: usize,
        byte_length: usize,
        _mode: LockMode,
    ) -> Result<&mut [u8]> {
        let host = self
            .buffers
            .get_mut(&buffer)
            .ok_or_else(|| Error::Backend(format!("lock of unknown buffer {:?}", buffer)))?;

        if host.locked.is_some() {
            return Err(Error::Backend(format!("buffer {:?} is already locked", buffer)));
        }

        let end = byte_offset + byte_length;
        if end > host.bytes.len() {
            return Err(Error::Backend(format!(
                "lock range {}..{} exceeds buffer of {} bytes",
                byte_offset,
                end,
                host.bytes.len()
            )));
        }

        host.locked = Some(byte_offset..end);
        Ok(&mut host.bytes[byte_offset..end])
    }

    fn unlock(&mut self, buffer: BufferHandle) {
        if let Some(host) = self.buffers.get_mut(&buffer) {
            host.locked = None;
        }
    }

    fn destroy(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(host) => {
                self.allocated -= host.bytes.len();
                self.destroyed.push(buffer);
            }
            None => log::warn!("destroy of unknown buffer {:?}", buffer),
        }
    }
}
