use crate::error::BroadphaseResult;
use crate::grid::CellGrid;
use crate::query::Query;
use crate::quadtree::{Placement, QuadTree};
use collisions::CollisionArea;
use common::shapes::{LineSegment, Point};

/// Operations shared by the quad trees and the cell grid.
pub trait SpatialIndex {
    type Bounds: Clone;

    /// Returns `Ok(false)` if `id` is already stored.
    fn insert(&mut self, id: u32, bounds: Self::Bounds) -> BroadphaseResult<bool>;

    /// Returns `false` if `id` is not stored.
    fn remove(&mut self, id: u32) -> bool;

    /// Returns `Ok(false)` if `id` is not stored.
    fn relocate(&mut self, id: u32, bounds: Self::Bounds) -> BroadphaseResult<bool>;

    fn get(&self, id: u32) -> Option<&Self::Bounds>;

    fn query_into(&self, query: &Query, out: &mut Vec<u32>);

    fn elements_into(&self, out: &mut Vec<u32>);

    fn total_elements(&self) -> usize;

    fn total_merge_operations(&self) -> u64;

    fn clear(&mut self);

    /// Inserts until the first invalid element; earlier elements stay
    /// inserted. Returns how many ids were new.
    fn insert_all<I>(&mut self, elements: I) -> BroadphaseResult<usize>
    where
        I: IntoIterator<Item = (u32, Self::Bounds)>,
    {
        let mut inserted = 0;
        for (id, bounds) in elements {
            if self.insert(id, bounds)? {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn remove_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = u32>,
    {
        ids.into_iter().filter(|&id| self.remove(id)).count()
    }

    fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    fn query(&self, query: &Query) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(query, &mut out);
        out
    }

    fn elements(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.total_elements());
        self.elements_into(&mut out);
        out
    }

    fn elements_overlapping_area(&self, area: &CollisionArea) -> Vec<u32> {
        self.query(&Query::OverlappingArea(area))
    }

    fn elements_overlapping_area_ignoring_edges(&self, area: &CollisionArea) -> Vec<u32> {
        self.query(&Query::OverlappingAreaIgnoringEdges(area))
    }

    fn elements_containing_point(&self, point: Point) -> Vec<u32> {
        self.query(&Query::ContainingPoint(point))
    }

    fn elements_containing_area(&self, area: &CollisionArea) -> Vec<u32> {
        self.query(&Query::ContainingArea(area))
    }

    fn elements_intersecting_line_segment(&self, segment: LineSegment) -> Vec<u32> {
        self.query(&Query::IntersectingLineSegment(segment))
    }
}

impl<P: Placement> SpatialIndex for QuadTree<P> {
    type Bounds = P::Bounds;

    fn insert(&mut self, id: u32, bounds: P::Bounds) -> BroadphaseResult<bool> {
        QuadTree::insert(self, id, bounds)
    }

    fn remove(&mut self, id: u32) -> bool {
        QuadTree::remove(self, id)
    }

    fn relocate(&mut self, id: u32, bounds: P::Bounds) -> BroadphaseResult<bool> {
        QuadTree::relocate(self, id, bounds)
    }

    fn get(&self, id: u32) -> Option<&P::Bounds> {
        QuadTree::get(self, id)
    }

    fn query_into(&self, query: &Query, out: &mut Vec<u32>) {
        QuadTree::query_into(self, query, out)
    }

    fn elements_into(&self, out: &mut Vec<u32>) {
        QuadTree::elements_into(self, out)
    }

    fn total_elements(&self) -> usize {
        QuadTree::total_elements(self)
    }

    fn total_merge_operations(&self) -> u64 {
        QuadTree::total_merge_operations(self)
    }

    fn clear(&mut self) {
        QuadTree::clear(self)
    }
}

impl SpatialIndex for CellGrid {
    type Bounds = CollisionArea;

    fn insert(&mut self, id: u32, area: CollisionArea) -> BroadphaseResult<bool> {
        CellGrid::insert(self, id, area)
    }

    fn remove(&mut self, id: u32) -> bool {
        CellGrid::remove(self, id)
    }

    fn relocate(&mut self, id: u32, area: CollisionArea) -> BroadphaseResult<bool> {
        CellGrid::relocate(self, id, area)
    }

    fn get(&self, id: u32) -> Option<&CollisionArea> {
        CellGrid::get(self, id)
    }

    fn query_into(&self, query: &Query, out: &mut Vec<u32>) {
        CellGrid::query_into(self, query, out)
    }

    fn elements_into(&self, out: &mut Vec<u32>) {
        CellGrid::elements_into(self, out)
    }

    fn total_elements(&self) -> usize {
        CellGrid::total_elements(self)
    }

    // Cells never merge.
    fn total_merge_operations(&self) -> u64 {
        0
    }

    fn clear(&mut self) {
        CellGrid::clear(self)
    }
}
