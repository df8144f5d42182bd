mod config;
mod maintenance;
mod placement;
mod quads;

pub use config::Config;
pub use placement::{Placement, Points, Regions};

use crate::error::{BroadphaseError, BroadphaseResult};
use crate::query::Query;
use crate::validation::validate_region;
use common::shapes::Rectangle;
use fxhash::FxHashMap;
use quads::{include, Extent, Quads};
use smallvec::{smallvec, SmallVec};
use std::marker::PhantomData;
use tracing::debug;

pub(crate) type QuadStack = SmallVec<[usize; 32]>;

/// Quad tree over areas; an element straddling split lines stays at the
/// deepest quad that fully contains it.
pub type RegionQuadTree = QuadTree<Regions>;

/// Quad tree over points; every quad tracks the tight box of its points.
pub type PointQuadTree = QuadTree<Points>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuadTreeStats {
    pub total_elements: usize,
    pub total_quads: usize,
    pub allocated_quads: usize,
    pub depth: usize,
    pub total_merge_operations: u64,
}

/// Adaptive quad tree. Quads live in a slot pool; a leaf splits once it holds
/// more than `element_limit` elements and a subtree is merged back into its
/// root once it holds no more than `merge_watermark`.
///
/// Not synchronized; wrap it in [`crate::Concurrent`] to share it between
/// threads.
#[derive(Clone, Debug)]
pub struct QuadTree<P: Placement> {
    quads: Quads<P::Bounds>,
    root: usize,
    region: Rectangle,
    element_limit: usize,
    merge_watermark: usize,
    max_depth: usize,
    min_size: f32,
    owners: FxHashMap<u32, usize>,
    total_elements: usize,
    total_quads: usize,
    total_merge_operations: u64,
    placement: PhantomData<P>,
}

impl<P: Placement> QuadTree<P> {
    pub fn new(region: Rectangle) -> BroadphaseResult<Self> {
        Self::new_with_config(region, Config::default())
    }

    pub fn new_with_config(region: Rectangle, config: Config) -> BroadphaseResult<Self> {
        validate_region(&region)?;
        if config.element_limit == 0 {
            return Err(BroadphaseError::InvalidElementLimit {
                element_limit: config.element_limit,
            });
        }
        if config.merge_watermark > config.element_limit {
            return Err(BroadphaseError::MergeWatermarkAboveLimit {
                merge_watermark: config.merge_watermark,
                element_limit: config.element_limit,
            });
        }
        if !(config.min_size.is_finite() && config.min_size > 0.0) {
            return Err(BroadphaseError::InvalidMinSize {
                min_size: config.min_size,
            });
        }

        let mut quads = Quads::with_capacity(config.pool_size);
        let root = quads.alloc(region, None, 0);
        debug!(
            ?region,
            element_limit = config.element_limit,
            merge_watermark = config.merge_watermark,
            max_depth = config.max_depth,
            "created quad tree"
        );
        Ok(QuadTree {
            quads,
            root,
            region,
            element_limit: config.element_limit,
            merge_watermark: config.merge_watermark,
            max_depth: config.max_depth,
            min_size: config.min_size,
            owners: FxHashMap::default(),
            total_elements: 0,
            total_quads: 1,
            total_merge_operations: 0,
            placement: PhantomData,
        })
    }

    pub fn region(&self) -> Rectangle {
        self.region
    }

    pub fn element_limit(&self) -> usize {
        self.element_limit
    }

    pub fn merge_watermark(&self) -> usize {
        self.merge_watermark
    }

    /// Returns `Ok(false)` if `id` is already stored.
    pub fn insert(&mut self, id: u32, bounds: P::Bounds) -> BroadphaseResult<bool> {
        P::validate(&self.region, &bounds)?;
        if self.owners.contains_key(&id) {
            return Ok(false);
        }
        self.place(id, bounds);
        self.total_elements += 1;
        Ok(true)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        match self.detach(id) {
            Some((slot, _)) => {
                self.total_elements -= 1;
                self.merge_upward(slot);
                true
            }
            None => false,
        }
    }

    /// Refreshes the cached bounds of `id`. The element only moves between
    /// quads when the new bounds descend to a different quad.
    pub fn relocate(&mut self, id: u32, bounds: P::Bounds) -> BroadphaseResult<bool> {
        P::validate(&self.region, &bounds)?;
        let current = match self.owners.get(&id) {
            Some(&slot) => slot,
            None => return Ok(false),
        };
        if self.descend(&bounds) == current {
            if let Some(cached) = self.quads[current].elements.get_mut_by_id(id) {
                *cached = bounds;
            }
            self.refresh_element_bounds(current);
            return Ok(true);
        }
        self.detach(id);
        self.place(id, bounds);
        self.merge_upward(current);
        Ok(true)
    }

    pub fn get(&self, id: u32) -> Option<&P::Bounds> {
        let slot = *self.owners.get(&id)?;
        self.quads[slot].elements.get_by_id(id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.owners.contains_key(&id)
    }

    /// Slot of the quad currently holding the element.
    pub fn quad_of(&self, id: u32) -> Option<usize> {
        self.owners.get(&id).copied()
    }

    pub fn query_into(&self, query: &Query, out: &mut Vec<u32>) {
        let mut stack: QuadStack = smallvec![self.root];
        while let Some(slot) = stack.pop() {
            let quad = &self.quads[slot];
            for entry in &quad.elements {
                if P::matches(query, &entry.bounds) {
                    out.push(entry.id);
                }
            }
            if let Some(children) = quad.children {
                for child in children {
                    let child_quad = &self.quads[child];
                    if child_quad.total == 0 {
                        continue;
                    }
                    let search = if P::TIGHT_BOUNDS {
                        match child_quad.element_bounds {
                            Some(extent) => extent.to_search_rectangle(),
                            None => continue,
                        }
                    } else {
                        child_quad.region
                    };
                    if query.may_match_within(&search) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    pub fn query(&self, query: &Query) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(query, &mut out);
        out
    }

    pub fn elements_into(&self, out: &mut Vec<u32>) {
        out.extend(self.owners.keys().copied());
    }

    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    /// Number of leaf quads.
    pub fn total_quads(&self) -> usize {
        self.total_quads
    }

    /// Number of live pool slots, leaves and subdivided quads alike.
    pub fn allocated_quads(&self) -> usize {
        self.quads.allocated()
    }

    pub fn total_merge_operations(&self) -> u64 {
        self.total_merge_operations
    }

    pub fn quad_region(&self, slot: usize) -> Option<Rectangle> {
        self.quads.get(slot).map(|quad| quad.region)
    }

    /// Bounds used to prune the quad during queries: the split region for
    /// region trees, the tight box of the subtree's points for point trees.
    pub fn quad_element_bounds(&self, slot: usize) -> Option<Rectangle> {
        let quad = self.quads.get(slot)?;
        if P::TIGHT_BOUNDS {
            quad.element_bounds.map(Extent::to_rectangle)
        } else {
            Some(quad.region)
        }
    }

    pub fn all_quad_regions(&self, regions: &mut Vec<Rectangle>) {
        let mut stack: QuadStack = smallvec![self.root];
        while let Some(slot) = stack.pop() {
            let quad = &self.quads[slot];
            regions.push(quad.region);
            if let Some(children) = quad.children {
                stack.extend(children);
            }
        }
    }

    /// Depth of the deepest live quad; 0 for an unsplit tree.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: QuadStack = smallvec![self.root];
        while let Some(slot) = stack.pop() {
            let quad = &self.quads[slot];
            deepest = deepest.max(quad.depth);
            if let Some(children) = quad.children {
                stack.extend(children);
            }
        }
        deepest
    }

    pub fn stats(&self) -> QuadTreeStats {
        QuadTreeStats {
            total_elements: self.total_elements,
            total_quads: self.total_quads,
            allocated_quads: self.allocated_quads(),
            depth: self.depth(),
            total_merge_operations: self.total_merge_operations,
        }
    }

    /// Drops every element and collapses the tree to its root. The merge
    /// counter keeps counting across clears.
    pub fn clear(&mut self) {
        let removed = self.total_elements;
        self.quads.clear();
        self.root = self.quads.alloc(self.region, None, 0);
        self.owners.clear();
        self.total_elements = 0;
        self.total_quads = 1;
        debug!(removed, "cleared quad tree");
    }

    /// Checks every structural invariant: slot links, subtree totals, owner
    /// map, counters and, for point trees, the tight bounds.
    pub fn is_consistent(&self) -> bool {
        let mut visited = 0;
        let mut leaves = 0;
        let mut stored = 0;
        let mut stack: QuadStack = smallvec![self.root];
        if self.quads[self.root].parent.is_some() {
            return false;
        }
        while let Some(slot) = stack.pop() {
            let quad = &self.quads[slot];
            if quad.index != Some(slot) || !quad.elements.is_consistent() {
                return false;
            }
            visited += 1;
            stored += quad.elements.len();
            for entry in &quad.elements {
                if self.owners.get(&entry.id) != Some(&slot) {
                    return false;
                }
                if !P::TIGHT_BOUNDS
                    && slot != self.root
                    && !quad
                        .region
                        .contains_rectangle(&P::bounding_box(&entry.bounds))
                {
                    return false;
                }
            }
            if P::TIGHT_BOUNDS && quad.element_bounds != self.local_element_bounds(slot) {
                return false;
            }
            match quad.children {
                Some(children) => {
                    if quad.total <= self.merge_watermark {
                        return false;
                    }
                    let mut total = quad.elements.len();
                    for child in children {
                        let child_quad = &self.quads[child];
                        if child_quad.parent != Some(slot) || child_quad.depth != quad.depth + 1 {
                            return false;
                        }
                        total += child_quad.total;
                        stack.push(child);
                    }
                    if total != quad.total {
                        return false;
                    }
                }
                None => {
                    leaves += 1;
                    if quad.total != quad.elements.len() {
                        return false;
                    }
                }
            }
        }
        visited == self.quads.allocated()
            && leaves == self.total_quads
            && stored == self.total_elements
            && self.owners.len() == self.total_elements
            && self.quads[self.root].total == self.total_elements
    }

    /// Slot the bounds would be stored at, following the current splits.
    fn descend(&self, bounds: &P::Bounds) -> usize {
        let mut slot = self.root;
        while let Some(children) = self.quads[slot].children {
            match P::quadrant(&self.quads[slot].region, bounds) {
                Some(index) => slot = children[index],
                None => break,
            }
        }
        slot
    }

    fn place(&mut self, id: u32, bounds: P::Bounds) {
        let extent = Extent::from_rectangle(&P::bounding_box(&bounds));
        let mut slot = self.root;
        loop {
            let quad = &mut self.quads[slot];
            quad.total += 1;
            if P::TIGHT_BOUNDS {
                include(&mut quad.element_bounds, extent);
            }
            let next = match quad.children {
                Some(children) => P::quadrant(&quad.region, &bounds).map(|index| children[index]),
                None => None,
            };
            match next {
                Some(child) => slot = child,
                None => break,
            }
        }
        self.quads[slot].elements.add(id, bounds);
        self.owners.insert(id, slot);
        self.subdivide_if_needed(slot);
    }

    /// Takes the element out of its quad and fixes totals and bounds on the
    /// way up. Merging is left to the caller.
    fn detach(&mut self, id: u32) -> Option<(usize, P::Bounds)> {
        let slot = self.owners.remove(&id)?;
        let bounds = self.quads[slot].elements.remove(id)?;
        let mut current = Some(slot);
        while let Some(ancestor) = current {
            let quad = &mut self.quads[ancestor];
            quad.total -= 1;
            current = quad.parent;
        }
        self.refresh_element_bounds(slot);
        Some((slot, bounds))
    }
}
