use crate::error::{BroadphaseError, BroadphaseResult};
use crate::grid::CellGrid;
use crate::index::SpatialIndex;
use crate::query::Query;
use crate::quadtree::{PointQuadTree, RegionQuadTree};
use collisions::CollisionArea;
use common::shapes::{LineSegment, Point};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

pub type ConcurrentRegionQuadTree = Concurrent<RegionQuadTree>;
pub type ConcurrentPointQuadTree = Concurrent<PointQuadTree>;
pub type ConcurrentCellGrid = Concurrent<CellGrid>;

/// Shares an index between threads behind a single read-write lock.
///
/// Queries hold the read lock for the whole traversal and run in parallel.
/// Read locks are recursive: a caller already holding one can query again
/// from inside [`Concurrent::with_read`] even while a writer is queued.
/// Every mutation holds the write lock until any subdivide or merge it
/// triggers has finished, so readers never see a half-built quad. A panic
/// while writing marks the index poisoned and every later call returns
/// [`BroadphaseError::LockPoisoned`].
#[derive(Debug)]
pub struct Concurrent<I> {
    index: RwLock<I>,
    // Written under the write lock, read without it.
    merge_operations: AtomicU64,
    poisoned: AtomicBool,
}

/// Sets the poison flag if dropped while the writing thread unwinds.
struct PoisonOnPanic<'a>(&'a AtomicBool);

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

impl<I: SpatialIndex> Concurrent<I> {
    pub fn new(index: I) -> Self {
        let merge_operations = AtomicU64::new(index.total_merge_operations());
        Concurrent {
            index: RwLock::new(index),
            merge_operations,
            poisoned: AtomicBool::new(false),
        }
    }

    pub fn into_inner(self) -> BroadphaseResult<I> {
        if self.poisoned.load(Ordering::Acquire) {
            return Err(BroadphaseError::LockPoisoned);
        }
        Ok(self.index.into_inner())
    }

    fn check_poisoned(&self) -> BroadphaseResult<()> {
        if self.poisoned.load(Ordering::Acquire) {
            Err(BroadphaseError::LockPoisoned)
        } else {
            Ok(())
        }
    }

    fn read(&self) -> BroadphaseResult<RwLockReadGuard<'_, I>> {
        let index = self.index.read_recursive();
        self.check_poisoned()?;
        Ok(index)
    }

    fn write(&self) -> BroadphaseResult<RwLockWriteGuard<'_, I>> {
        let index = self.index.write();
        self.check_poisoned()?;
        Ok(index)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut I) -> R) -> BroadphaseResult<R> {
        let mut index = self.write()?;
        let poison = PoisonOnPanic(&self.poisoned);
        let result = f(&mut *index);
        self.merge_operations
            .store(index.total_merge_operations(), Ordering::Release);
        drop(poison);
        Ok(result)
    }

    /// Runs `f` under the read lock, for helpers specific to one index type.
    /// Calls made on `self` from inside `f` take the read lock recursively.
    pub fn with_read<R>(&self, f: impl FnOnce(&I) -> R) -> BroadphaseResult<R> {
        let index = self.read()?;
        Ok(f(&*index))
    }

    pub fn insert(&self, id: u32, bounds: I::Bounds) -> BroadphaseResult<bool> {
        self.mutate(|index| index.insert(id, bounds))?
    }

    pub fn insert_all<T>(&self, elements: T) -> BroadphaseResult<usize>
    where
        T: IntoIterator<Item = (u32, I::Bounds)>,
    {
        self.mutate(|index| index.insert_all(elements))?
    }

    pub fn remove(&self, id: u32) -> BroadphaseResult<bool> {
        self.mutate(|index| index.remove(id))
    }

    pub fn remove_all<T>(&self, ids: T) -> BroadphaseResult<usize>
    where
        T: IntoIterator<Item = u32>,
    {
        self.mutate(|index| index.remove_all(ids))
    }

    pub fn relocate(&self, id: u32, bounds: I::Bounds) -> BroadphaseResult<bool> {
        self.mutate(|index| index.relocate(id, bounds))?
    }

    pub fn clear(&self) -> BroadphaseResult<()> {
        self.mutate(|index| index.clear())
    }

    pub fn get(&self, id: u32) -> BroadphaseResult<Option<I::Bounds>> {
        self.with_read(|index| index.get(id).cloned())
    }

    pub fn contains(&self, id: u32) -> BroadphaseResult<bool> {
        self.with_read(|index| index.contains(id))
    }

    pub fn query_into(&self, query: &Query, out: &mut Vec<u32>) -> BroadphaseResult<()> {
        self.with_read(|index| index.query_into(query, out))
    }

    pub fn query(&self, query: &Query) -> BroadphaseResult<Vec<u32>> {
        self.with_read(|index| index.query(query))
    }

    pub fn elements(&self) -> BroadphaseResult<Vec<u32>> {
        self.with_read(|index| index.elements())
    }

    pub fn total_elements(&self) -> BroadphaseResult<usize> {
        self.with_read(|index| index.total_elements())
    }

    /// Lock-free; may lag behind a write that is still in progress.
    pub fn total_merge_operations(&self) -> u64 {
        self.merge_operations.load(Ordering::Acquire)
    }

    pub fn elements_overlapping_area(&self, area: &CollisionArea) -> BroadphaseResult<Vec<u32>> {
        self.query(&Query::OverlappingArea(area))
    }

    pub fn elements_overlapping_area_ignoring_edges(
        &self,
        area: &CollisionArea,
    ) -> BroadphaseResult<Vec<u32>> {
        self.query(&Query::OverlappingAreaIgnoringEdges(area))
    }

    pub fn elements_containing_point(&self, point: Point) -> BroadphaseResult<Vec<u32>> {
        self.query(&Query::ContainingPoint(point))
    }

    pub fn elements_containing_area(&self, area: &CollisionArea) -> BroadphaseResult<Vec<u32>> {
        self.query(&Query::ContainingArea(area))
    }

    pub fn elements_intersecting_line_segment(
        &self,
        segment: LineSegment,
    ) -> BroadphaseResult<Vec<u32>> {
        self.query(&Query::IntersectingLineSegment(segment))
    }
}

impl<I: SpatialIndex> From<I> for Concurrent<I> {
    fn from(index: I) -> Self {
        Concurrent::new(index)
    }
}
