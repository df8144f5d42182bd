use super::quads::{include, Extent};
use super::{Placement, QuadStack, QuadTree};
use smallvec::smallvec;
use tracing::trace;

impl<P: Placement> QuadTree<P> {
    pub(super) fn can_subdivide(&self, slot: usize) -> bool {
        let quad = &self.quads[slot];
        quad.is_leaf()
            && quad.elements.len() > self.element_limit
            && quad.depth < self.max_depth
            && quad.region.width * 0.5 >= self.min_size
            && quad.region.height * 0.5 >= self.min_size
    }

    /// Splits `slot` and any child that still overflows afterwards.
    pub(super) fn subdivide_if_needed(&mut self, slot: usize) {
        let mut pending: QuadStack = smallvec![slot];
        while let Some(slot) = pending.pop() {
            if !self.can_subdivide(slot) {
                continue;
            }
            let children = self.subdivide(slot);
            pending.extend(children);
        }
    }

    fn subdivide(&mut self, slot: usize) -> [usize; 4] {
        let region = self.quads[slot].region;
        let depth = self.quads[slot].depth + 1;
        let entries = self.quads[slot].elements.take_all();
        let moved_from = entries.len();

        let mut children = [0; 4];
        for (index, child) in children.iter_mut().enumerate() {
            *child = self.quads.alloc(region.quadrant(index), Some(slot), depth);
        }

        for entry in entries {
            let target = match P::quadrant(&region, &entry.bounds) {
                Some(index) => children[index],
                None => slot,
            };
            let quad = &mut self.quads[target];
            if target != slot {
                quad.total += 1;
                if P::TIGHT_BOUNDS {
                    let extent = Extent::from_rectangle(&P::bounding_box(&entry.bounds));
                    include(&mut quad.element_bounds, extent);
                }
                self.owners.insert(entry.id, target);
            }
            quad.elements.add(entry.id, entry.bounds);
        }

        self.quads[slot].children = Some(children);
        self.total_quads += 3;
        trace!(
            slot,
            depth = depth - 1,
            moved = moved_from - self.quads[slot].elements.len(),
            kept = self.quads[slot].elements.len(),
            "subdivided quad"
        );
        children
    }

    /// Walks from `slot` to the root, merging every subdivided quad whose
    /// subtree fell to the merge watermark.
    pub(super) fn merge_upward(&mut self, slot: usize) {
        let mut current = Some(slot);
        while let Some(slot) = current {
            let quad = &self.quads[slot];
            if !quad.is_leaf() && quad.total <= self.merge_watermark {
                self.merge(slot);
            }
            current = self.quads[slot].parent;
        }
    }

    fn merge(&mut self, slot: usize) {
        let mut collected = Vec::new();
        let mut released = 0;
        let mut released_leaves = 0;
        let mut pending: QuadStack = QuadStack::new();
        if let Some(children) = self.quads[slot].children {
            pending.extend(children);
        }
        while let Some(descendant) = pending.pop() {
            let quad = &mut self.quads[descendant];
            collected.extend(quad.elements.take_all());
            match quad.children {
                Some(children) => pending.extend(children),
                None => released_leaves += 1,
            }
            self.quads.release(descendant);
            released += 1;
        }

        let quad = &mut self.quads[slot];
        quad.children = None;
        let pulled = collected.len();
        for entry in collected {
            self.owners.insert(entry.id, slot);
            quad.elements.add(entry.id, entry.bounds);
        }
        self.total_quads -= released_leaves - 1;
        self.total_merge_operations += 1;
        trace!(slot, depth = quad.depth, released, pulled, "merged quad");
    }

    /// Recomputes tight bounds from `slot` up to the root using each quad's
    /// own points and its children's boxes.
    pub(super) fn refresh_element_bounds(&mut self, slot: usize) {
        if !P::TIGHT_BOUNDS {
            return;
        }
        let mut current = Some(slot);
        while let Some(slot) = current {
            let bounds = self.local_element_bounds(slot);
            let quad = &mut self.quads[slot];
            quad.element_bounds = bounds;
            current = quad.parent;
        }
    }

    pub(super) fn local_element_bounds(&self, slot: usize) -> Option<Extent> {
        let quad = &self.quads[slot];
        let mut bounds = None;
        for entry in &quad.elements {
            include(
                &mut bounds,
                Extent::from_rectangle(&P::bounding_box(&entry.bounds)),
            );
        }
        if let Some(children) = quad.children {
            for child in children {
                if let Some(extent) = self.quads[child].element_bounds {
                    include(&mut bounds, extent);
                }
            }
        }
        bounds
    }
}
