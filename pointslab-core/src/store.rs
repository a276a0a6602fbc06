//! Batch store: hands out handles for added point batches and spreads the
//! points over slabs.
//!
//! Slabs are filled first-fit in creation order, one classification at a
//! time. Each `add` records the `(slab, offset, count)` allocations it made
//! under a fresh random handle so that `remove` can tombstone exactly those
//! points later.

use crate::backend::BufferBackend;
use crate::bounds::Aabb;
use crate::config::{ReclaimPolicy, RenderConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::layout::VertexLayout;
use crate::point::{Classification, PointBatch};
use crate::slab::{Slab, SlabId, CAPACITY};
use crate::traits::{DrawList, Drawable, NullDrawList};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::num::NonZeroU32;

/// Opaque identifier of one added batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointsHandle(NonZeroU32);

impl PointsHandle {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }
}

impl fmt::Display for PointsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A run of points written into one slab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub slab: SlabId,
    pub start: usize,
    pub count: usize,
}

/// Owner of all slabs for one render configuration
pub struct BatchStore<B: BufferBackend, D: DrawList = NullDrawList> {
    backend: B,
    draw_list: D,
    config: StoreConfig,
    layout: VertexLayout,
    /// Ordered by id, which is creation order
    slabs: BTreeMap<SlabId, Slab>,
    handles: HashMap<PointsHandle, Vec<Allocation>>,
    next_slab: u64,
    rng: StdRng,
    bounds: Aabb,
    radius: f32,
}

impl<B: BufferBackend> BatchStore<B, NullDrawList> {
    /// Store without a draw list, for headless use
    pub fn headless(backend: B, config: StoreConfig) -> Self {
        Self::new(backend, NullDrawList, config)
    }
}

impl<B: BufferBackend, D: DrawList> BatchStore<B, D> {
    pub fn new(backend: B, draw_list: D, config: StoreConfig) -> Self {
        Self::with_rng(backend, draw_list, config, StdRng::from_entropy())
    }

    /// Store whose handle sequence is reproducible
    pub fn with_seed(backend: B, draw_list: D, config: StoreConfig, seed: u64) -> Self {
        Self::with_rng(backend, draw_list, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(backend: B, draw_list: D, config: StoreConfig, rng: StdRng) -> Self {
        let layout = VertexLayout::new(&config.render);
        Self {
            backend,
            draw_list,
            config,
            layout,
            slabs: BTreeMap::new(),
            handles: HashMap::new(),
            next_slab: 0,
            rng,
            bounds: Aabb::null(),
            radius: 0.0,
        }
    }

    /// Add a batch of points and return the handle that removes them.
    ///
    /// Validation and slab creation happen before anything is written. If a
    /// later write still fails, the store is put back as it was.
    pub fn add(&mut self, batch: &PointBatch) -> Result<PointsHandle> {
        batch.validate(&self.config.render)?;

        let partitions = batch.partition();
        let first_new = SlabId(self.next_slab + 1);
        let mut allocations = Vec::new();
        let written = self
            .reserve(&partitions)
            .and_then(|()| self.write_batch(batch, &partitions, &mut allocations));
        if let Err(e) = written {
            log::warn!("add of {} points failed, rolling back: {}", batch.len(), e);
            self.roll_back(&allocations, first_new);
            return Err(e);
        }

        let handle = self.generate_handle();
        for allocation in &allocations {
            if let Some(slab) = self.slabs.get(&allocation.slab) {
                self.bounds.merge(&slab.bounding_box());
                self.draw_list.attach(slab.id(), slab.geometry());
            }
        }
        self.radius = self.bounds.radius();
        self.draw_list.notify_bounds_changed(&self.bounds, self.radius);

        log::debug!(
            "handle {}: {} points in {} allocations",
            handle,
            batch.len(),
            allocations.len()
        );
        self.handles.insert(handle, allocations);
        Ok(handle)
    }

    /// Create every slab the partitions need beyond the room already open
    fn reserve(&mut self, partitions: &[Vec<usize>; 2]) -> Result<()> {
        for (classification, indices) in Classification::ALL.into_iter().zip(partitions.iter()) {
            let room: usize = self
                .slabs
                .values()
                .filter(|slab| slab.classification() == classification)
                .map(|slab| CAPACITY - slab.append_cursor())
                .sum();
            let missing = indices.len().saturating_sub(room).div_ceil(CAPACITY);
            for _ in 0..missing {
                self.open_slab(classification)?;
            }
        }
        Ok(())
    }

    fn write_batch(
        &mut self,
        batch: &PointBatch,
        partitions: &[Vec<usize>; 2],
        allocations: &mut Vec<Allocation>,
    ) -> Result<()> {
        for (classification, indices) in Classification::ALL.into_iter().zip(partitions.iter()) {
            let mut written = 0;
            while written < indices.len() {
                let slab = self
                    .first_open_slab(classification)
                    .and_then(|id| self.slabs.get_mut(&id))
                    .ok_or_else(|| {
                        Error::Backend(format!(
                            "no {:?} slab left for {} points",
                            classification,
                            indices.len() - written
                        ))
                    })?;
                let id = slab.id();

                let (start, count) =
                    slab.append(&mut self.backend, batch, &indices[written..], &self.config.render)?;
                if count > 0 {
                    allocations.push(Allocation { slab: id, start, count });
                }
                written += count;
            }
        }
        Ok(())
    }

    /// First slab of `classification` with room left
    fn first_open_slab(&self, classification: Classification) -> Option<SlabId> {
        self.slabs
            .values()
            .find(|slab| slab.classification() == classification && !slab.is_full())
            .map(Slab::id)
    }

    fn open_slab(&mut self, classification: Classification) -> Result<SlabId> {
        self.next_slab += 1;
        let id = SlabId(self.next_slab);
        let slab = Slab::new(&mut self.backend, id, classification, &self.layout, &self.config.render)?;
        self.draw_list.attach(id, slab.geometry());
        self.slabs.insert(id, slab);
        Ok(id)
    }

    /// Random non-zero handle not currently in use
    fn generate_handle(&mut self) -> PointsHandle {
        loop {
            if let Some(handle) = PointsHandle::new(self.rng.gen()) {
                if !self.handles.contains_key(&handle) {
                    return handle;
                }
            }
        }
    }

    /// Undo a failed add: rewind what it wrote into existing slabs and
    /// destroy the slabs it created.
    fn roll_back(&mut self, allocations: &[Allocation], first_new: SlabId) {
        for allocation in allocations.iter().rev().filter(|a| a.slab < first_new) {
            let Some(slab) = self.slabs.get_mut(&allocation.slab) else {
                continue;
            };
            if let Err(e) = slab.remove(&mut self.backend, allocation.start, allocation.count) {
                log::warn!("failed to roll back {:?}: {}", allocation, e);
                continue;
            }
            slab.rewind(allocation.start);
            self.draw_list.attach(slab.id(), slab.geometry());
        }

        let created: Vec<SlabId> = self.slabs.range(first_new..).map(|(id, _)| *id).collect();
        for id in created {
            if let Some(slab) = self.slabs.remove(&id) {
                self.draw_list.detach(id);
                slab.destroy(&mut self.backend);
            }
        }

        if !allocations.is_empty() {
            self.recalculate_bounds();
        }
    }

    fn release(&mut self, allocations: &[Allocation]) {
        for allocation in allocations {
            match self.slabs.get_mut(&allocation.slab) {
                Some(slab) => {
                    if let Err(e) = slab.remove(&mut self.backend, allocation.start, allocation.count) {
                        log::warn!("failed to release {:?}: {}", allocation, e);
                    }
                }
                None => log::warn!("allocation {:?} refers to a reclaimed slab", allocation),
            }
        }
    }

    /// Remove the points added under `handle`. Unknown handles are ignored.
    pub fn remove(&mut self, handle: PointsHandle) {
        let Some(allocations) = self.handles.remove(&handle) else {
            return;
        };

        self.release(&allocations);
        log::debug!("handle {}: removed {} allocations", handle, allocations.len());

        self.destroy_empty_slabs();
        self.recalculate_bounds();
    }

    /// Drop every handle and destroy every slab
    pub fn clear(&mut self) {
        self.handles.clear();
        let slabs = std::mem::take(&mut self.slabs);
        for (id, slab) in slabs {
            self.draw_list.detach(id);
            slab.destroy(&mut self.backend);
        }
        self.bounds.set_null();
        self.radius = 0.0;
        self.draw_list.notify_bounds_changed(&self.bounds, self.radius);
    }

    /// Destroy empty slabs according to the reclaim policy.
    ///
    /// A slab that is empty but full can never take points again, so it is
    /// always destroyed. Under [`ReclaimPolicy::RetainOne`] the first empty
    /// slab per classification that still has room is kept.
    pub fn reclaim(&mut self) {
        if self.destroy_empty_slabs() {
            self.recalculate_bounds();
        }
    }

    /// Apply the reclaim policy; true if any slab was destroyed
    fn destroy_empty_slabs(&mut self) -> bool {
        let mut retained: Vec<Classification> = Vec::new();
        let mut doomed = Vec::new();

        for slab in self.slabs.values().filter(|slab| slab.is_empty()) {
            let keep = self.config.reclaim == ReclaimPolicy::RetainOne
                && !slab.is_full()
                && !retained.contains(&slab.classification());
            if keep {
                retained.push(slab.classification());
            } else {
                doomed.push(slab.id());
            }
        }

        for &id in &doomed {
            if let Some(slab) = self.slabs.remove(&id) {
                self.draw_list.detach(id);
                slab.destroy(&mut self.backend);
            }
        }
        !doomed.is_empty()
    }

    fn recalculate_bounds(&mut self) {
        self.bounds.set_null();
        for slab in self.slabs.values_mut() {
            if let Err(e) = slab.refresh_bounds(&mut self.backend) {
                log::warn!("keeping old bounds of slab {:?}: {}", slab.id(), e);
            }
            self.bounds.merge(&slab.bounding_box());
        }
        self.radius = self.bounds.radius();
        self.draw_list.notify_bounds_changed(&self.bounds, self.radius);
    }

    /// Aggregate bounding box and radius over all slabs
    pub fn bounds(&self) -> (Aabb, f32) {
        (self.bounds, self.radius)
    }

    pub fn contains(&self, handle: PointsHandle) -> bool {
        self.handles.contains_key(&handle)
    }

    /// Allocations recorded for `handle`
    pub fn allocations(&self, handle: PointsHandle) -> Option<&[Allocation]> {
        self.handles.get(&handle).map(Vec::as_slice)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Live points across all slabs
    pub fn point_count(&self) -> usize {
        self.slabs.values().map(Slab::occupied).sum()
    }

    /// Slabs in creation order
    pub fn slabs(&self) -> impl Iterator<Item = &Slab> {
        self.slabs.values()
    }

    pub fn slab(&self, id: SlabId) -> Option<&Slab> {
        self.slabs.get(&id)
    }

    pub fn slab_count(&self, classification: Classification) -> usize {
        self.slabs
            .values()
            .filter(|slab| slab.classification() == classification)
            .count()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config.render
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn draw_list(&self) -> &D {
        &self.draw_list
    }

    pub fn draw_list_mut(&mut self) -> &mut D {
        &mut self.draw_list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BufferHandle, HostBackend, LockMode};
    use crate::config::PrimitiveKind;
    use crate::point::{Point3f, Rgba};
    use crate::slab::TOMBSTONE;
    use crate::traits::GeometryView;
    use crate::transform::AxisConvention;

    /// Draw list that remembers what it was told
    #[derive(Default)]
    struct RecordingDrawList {
        attached: BTreeMap<SlabId, GeometryView>,
        detached: Vec<SlabId>,
        bounds_updates: usize,
    }

    impl DrawList for RecordingDrawList {
        fn attach(&mut self, id: SlabId, geometry: GeometryView) {
            self.attached.insert(id, geometry);
        }

        fn detach(&mut self, id: SlabId) {
            self.attached.remove(&id);
            self.detached.push(id);
        }

        fn notify_bounds_changed(&mut self, _bounds: &Aabb, _radius: f32) {
            self.bounds_updates += 1;
        }
    }

    fn point_config() -> StoreConfig {
        StoreConfig::new(RenderConfig::new(PrimitiveKind::Point).with_frame(AxisConvention::Native))
    }

    fn store(config: StoreConfig) -> BatchStore<HostBackend, RecordingDrawList> {
        BatchStore::with_seed(HostBackend::new(), RecordingDrawList::default(), config, 7)
    }

    fn batch_with_alphas(alphas: &[f32]) -> PointBatch {
        let mut batch = PointBatch::new();
        for (i, &a) in alphas.iter().enumerate() {
            batch.push(Point3f::new(i as f32, 0.0, 0.0), Rgba::new(1.0, 1.0, 1.0, a));
        }
        batch
    }

    #[test]
    fn test_add_splits_by_alpha() {
        let mut store = store(point_config());
        let handle = store.add(&batch_with_alphas(&[1.0, 0.3, 1.0])).unwrap();

        assert_eq!(store.slab_count(Classification::Opaque), 1);
        assert_eq!(store.slab_count(Classification::Alpha), 1);

        let allocations = store.allocations(handle).unwrap();
        assert_eq!(allocations.len(), 2);
        let opaque = store.slab(allocations[0].slab).unwrap();
        let alpha = store.slab(allocations[1].slab).unwrap();
        assert_eq!(opaque.classification(), Classification::Opaque);
        assert_eq!(opaque.occupied(), 2);
        assert_eq!(opaque.geometry().vertex_count, 2);
        assert_eq!(alpha.classification(), Classification::Alpha);
        assert_eq!(alpha.occupied(), 1);
        assert_eq!(alpha.geometry().vertex_count, 1);
    }

    #[test]
    fn test_invalid_input_leaves_store_untouched() {
        let mut store = store(point_config());
        let mut batch = batch_with_alphas(&[1.0, 1.0]);
        batch.colors.pop();

        assert!(matches!(store.add(&batch), Err(Error::InvalidInput(_))));
        assert!(store.is_empty());
        assert_eq!(store.slabs().count(), 0);
        assert_eq!(store.backend().created_count(), 0);
    }

    #[test]
    fn test_handles_are_unique_and_non_zero() {
        let mut store = store(point_config());
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let handle = store.add(&batch_with_alphas(&[1.0])).unwrap();
            assert_ne!(handle.get(), 0);
            assert!(seen.insert(handle));
        }
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn test_empty_batch_gets_a_handle() {
        let mut store = store(point_config());
        let handle = store.add(&PointBatch::new()).unwrap();
        assert!(store.contains(handle));
        assert_eq!(store.allocations(handle).unwrap().len(), 0);
        assert_eq!(store.slabs().count(), 0);
    }

    #[test]
    fn test_first_fit_reuses_open_slab() {
        let mut store = store(point_config());
        let a = store.add(&batch_with_alphas(&[1.0, 1.0])).unwrap();
        let b = store.add(&batch_with_alphas(&[1.0])).unwrap();

        assert_eq!(store.slab_count(Classification::Opaque), 1);
        let a_alloc = store.allocations(a).unwrap()[0];
        let b_alloc = store.allocations(b).unwrap()[0];
        assert_eq!(a_alloc.slab, b_alloc.slab);
        assert_eq!(b_alloc.start, 2);
    }

    #[test]
    fn test_overflow_opens_new_slab() {
        let mut store = store(point_config());
        let alphas = vec![1.0; CAPACITY + 5];
        let handle = store.add(&batch_with_alphas(&alphas)).unwrap();

        let allocations = store.allocations(handle).unwrap();
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].count, CAPACITY);
        assert_eq!(allocations[1].count, 5);
        assert_eq!(allocations[1].start, 0);
        assert_ne!(allocations[0].slab, allocations[1].slab);
    }

    #[test]
    fn test_remove_unknown_handle_is_noop() {
        let mut store = store(point_config());
        let handle = store.add(&batch_with_alphas(&[1.0])).unwrap();
        store.remove(handle);
        let destroyed = store.backend().destroyed().len();

        store.remove(handle);
        store.remove(PointsHandle::new(12345).unwrap());
        assert_eq!(store.backend().destroyed().len(), destroyed);
        assert!(!store.contains(handle));
    }

    #[test]
    fn test_retain_one_keeps_a_single_open_empty_slab() {
        let mut store = store(point_config());
        let handle = store.add(&batch_with_alphas(&[1.0, 1.0])).unwrap();
        store.remove(handle);

        // Empty but not full: kept for the next add
        assert_eq!(store.slab_count(Classification::Opaque), 1);
        assert!(store.backend().destroyed().is_empty());
        assert!(store.bounds().0.is_null());

        store.add(&batch_with_alphas(&[1.0])).unwrap();
        assert_eq!(store.slab_count(Classification::Opaque), 1);
        let slab = store.slabs().next().unwrap();
        assert_eq!(slab.append_cursor(), 3);
    }

    #[test]
    fn test_retain_none_destroys_every_empty_slab() {
        let mut store = store(point_config().with_reclaim(ReclaimPolicy::RetainNone));
        let handle = store.add(&batch_with_alphas(&[1.0, 0.2])).unwrap();
        let buffers: Vec<_> = store.slabs().map(Slab::buffer).collect();

        store.remove(handle);
        assert_eq!(store.slabs().count(), 0);
        assert_eq!(store.backend().destroyed(), buffers.as_slice());
        assert_eq!(store.draw_list().detached.len(), 2);
        assert!(store.draw_list().attached.is_empty());
    }

    #[test]
    fn test_full_empty_slab_is_destroyed_once() {
        let mut store = store(point_config());
        let handle = store.add(&batch_with_alphas(&vec![1.0; CAPACITY])).unwrap();
        let buffer = store.slabs().next().unwrap().buffer();
        assert!(store.slabs().next().unwrap().is_full());

        store.remove(handle);
        assert_eq!(store.slabs().count(), 0);
        assert_eq!(store.backend().destroyed(), &[buffer]);

        store.reclaim();
        store.remove(handle);
        assert_eq!(store.backend().destroyed(), &[buffer]);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut store = store(point_config());
        let a = store.add(&batch_with_alphas(&[1.0, 0.5])).unwrap();
        store.clear();

        assert!(!store.contains(a));
        assert_eq!(store.slabs().count(), 0);
        assert_eq!(store.backend().live_buffers(), 0);
        assert!(store.bounds().0.is_null());
        assert_eq!(store.bounds().1, 0.0);
        assert!(store.draw_list().attached.is_empty());
    }

    #[test]
    fn test_draw_list_follows_append_cursor() {
        let mut store = store(point_config());
        store.add(&batch_with_alphas(&[1.0, 1.0])).unwrap();
        store.add(&batch_with_alphas(&[1.0])).unwrap();

        let draw_list = store.draw_list();
        assert_eq!(draw_list.attached.len(), 1);
        let geometry = draw_list.attached.values().next().unwrap();
        assert_eq!(geometry.vertex_count, 3);
        assert!(draw_list.bounds_updates >= 2);
    }

    #[test]
    fn test_exhausted_backend_creates_nothing() {
        // Room for exactly one point slab
        let stride = VertexLayout::new(&point_config().render).stride();
        let backend = HostBackend::with_budget(stride * CAPACITY);
        let mut store = BatchStore::with_seed(backend, RecordingDrawList::default(), point_config(), 1);

        let err = store.add(&batch_with_alphas(&[1.0, 0.5])).unwrap_err();
        assert!(matches!(err, Error::ResourceExhausted(_)));
        assert!(store.is_empty());
        assert_eq!(store.slabs().count(), 0);
        assert_eq!(store.backend().live_buffers(), 0);
        assert!(store.bounds().0.is_null());
        assert!(store.draw_list().attached.is_empty());
        assert!(!store.backend().any_locked());
    }

    #[test]
    fn test_exhausted_backend_leaves_existing_slab_untouched() {
        let stride = VertexLayout::new(&point_config().render).stride();
        let backend = HostBackend::with_budget(stride * CAPACITY);
        let mut store = BatchStore::with_seed(backend, RecordingDrawList::default(), point_config(), 1);
        let kept = store.add(&batch_with_alphas(&[1.0])).unwrap();
        let bounds = store.bounds();
        let updates = store.draw_list().bounds_updates;

        // The opaque point would fit, the alpha one needs a slab the budget refuses
        assert!(store.add(&batch_with_alphas(&[1.0, 0.5])).is_err());

        assert_eq!(store.len(), 1);
        assert!(store.contains(kept));
        assert_eq!(store.slabs().count(), 1);
        let slab = store.slabs().next().unwrap();
        assert_eq!(slab.append_cursor(), 1);
        assert_eq!(slab.occupied(), 1);
        assert_eq!(store.draw_list().attached[&slab.id()].vertex_count, 1);
        assert_eq!(store.bounds(), bounds);
        assert_eq!(store.draw_list().bounds_updates, updates);
    }

    /// Host backend whose n-th lock from now fails once
    struct FlakyBackend {
        inner: HostBackend,
        fail_after: Option<usize>,
    }

    impl BufferBackend for FlakyBackend {
        fn create_buffer(&mut self, vertex_stride: usize, capacity_vertices: usize) -> Result<BufferHandle> {
            self.inner.create_buffer(vertex_stride, capacity_vertices)
        }

        fn lock(
            &mut self,
            buffer: BufferHandle,
            byte_offset: usize,
            byte_length: usize,
            mode: LockMode,
        ) -> Result<&mut [u8]> {
            match self.fail_after {
                Some(0) => {
                    self.fail_after = None;
                    return Err(Error::Backend("lock refused".to_string()));
                }
                Some(n) => self.fail_after = Some(n - 1),
                None => {}
            }
            self.inner.lock(buffer, byte_offset, byte_length, mode)
        }

        fn unlock(&mut self, buffer: BufferHandle) {
            self.inner.unlock(buffer)
        }

        fn destroy(&mut self, buffer: BufferHandle) {
            self.inner.destroy(buffer)
        }
    }

    #[test]
    fn test_failed_write_rewinds_append_cursor() {
        let backend = FlakyBackend {
            inner: HostBackend::new(),
            fail_after: None,
        };
        let mut store = BatchStore::with_seed(backend, RecordingDrawList::default(), point_config(), 5);
        store.add(&batch_with_alphas(&[1.0])).unwrap();
        let bounds = store.bounds();

        // First write fills the open slab, the second into a fresh slab fails
        store.backend_mut().fail_after = Some(1);
        let err = store.add(&batch_with_alphas(&vec![1.0; CAPACITY])).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.slabs().count(), 1);
        let slab = store.slabs().next().unwrap();
        assert_eq!(slab.append_cursor(), 1);
        assert_eq!(slab.occupied(), 1);
        assert_eq!(slab.live_ranges(), &[0..1]);
        assert_eq!(store.draw_list().attached.len(), 1);
        assert_eq!(store.draw_list().attached[&slab.id()].vertex_count, 1);
        assert_eq!(store.backend().inner.live_buffers(), 1);
        assert_eq!(store.bounds(), bounds);

        // The rewound room is usable again
        let handle = store.add(&batch_with_alphas(&[1.0])).unwrap();
        assert_eq!(store.allocations(handle).unwrap()[0].start, 1);
    }

    #[test]
    fn test_remove_notifies_bounds_once() {
        let mut store = store(point_config().with_reclaim(ReclaimPolicy::RetainNone));
        let a = store.add(&batch_with_alphas(&[1.0])).unwrap();
        store.add(&batch_with_alphas(&[0.5])).unwrap();

        let before = store.draw_list().bounds_updates;
        store.remove(a);
        assert_eq!(store.slab_count(Classification::Opaque), 0);
        assert_eq!(store.draw_list().bounds_updates, before + 1);
    }

    #[test]
    fn test_sentinel_valued_point_keeps_its_bounds() {
        let mut store = store(point_config());
        let far = Point3f::new(TOMBSTONE, 0.0, 0.0);
        store
            .add(&PointBatch::from_parts(vec![far], vec![Rgba::default()]))
            .unwrap();
        let near = store
            .add(&PointBatch::from_parts(vec![Point3f::origin()], vec![Rgba::default()]))
            .unwrap();

        store.remove(near);
        let (bounds, radius) = store.bounds();
        assert_eq!(bounds.min(), Some(far));
        assert_eq!(bounds.max(), Some(far));
        approx::assert_relative_eq!(radius, TOMBSTONE);
    }
}
