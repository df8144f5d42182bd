use crate::elements::QuadElements;
use common::shapes::Rectangle;
use std::ops::{Index, IndexMut};

/// Min/max box of the points held by a point-tree subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Extent {
    pub(crate) min_x: f32,
    pub(crate) min_y: f32,
    pub(crate) max_x: f32,
    pub(crate) max_y: f32,
}

impl Extent {
    pub(crate) fn from_rectangle(rect: &Rectangle) -> Self {
        Extent {
            min_x: rect.left(),
            min_y: rect.top(),
            max_x: rect.right(),
            max_y: rect.bottom(),
        }
    }

    pub(crate) fn union(self, other: Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub(crate) fn to_rectangle(self) -> Rectangle {
        Rectangle::from_min_max(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Rectangle grown by a small margin so the center/size round trip never
    /// leaves a stored point outside it.
    pub(crate) fn to_search_rectangle(self) -> Rectangle {
        let magnitude = self
            .min_x
            .abs()
            .max(self.max_x.abs())
            .max(self.min_y.abs())
            .max(self.max_y.abs());
        let margin = (magnitude * f32::EPSILON * 4.0).max(common::shapes::LINE_EPSILON);
        Rectangle::from_min_max(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }
}

pub(crate) fn include(bounds: &mut Option<Extent>, extent: Extent) {
    *bounds = Some(match *bounds {
        Some(current) => current.union(extent),
        None => extent,
    });
}

#[derive(Clone, Debug)]
pub(crate) struct Quad<B> {
    /// Own slot in the pool, `None` once released.
    pub(crate) index: Option<usize>,
    pub(crate) region: Rectangle,
    /// Tight bounds of the subtree's points; unused by region trees.
    pub(crate) element_bounds: Option<Extent>,
    pub(crate) elements: QuadElements<B>,
    pub(crate) children: Option<[usize; 4]>,
    pub(crate) parent: Option<usize>,
    pub(crate) depth: usize,
    /// Elements stored in this quad and all of its descendants.
    pub(crate) total: usize,
}

impl<B> Quad<B> {
    fn new(index: usize, region: Rectangle, parent: Option<usize>, depth: usize) -> Self {
        Quad {
            index: Some(index),
            region,
            element_bounds: None,
            elements: QuadElements::new(),
            children: None,
            parent,
            depth,
            total: 0,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Slot pool for quads. Released slots are recycled through a free list, so
/// child and parent links stay plain indices.
#[derive(Clone, Debug)]
pub(crate) struct Quads<B> {
    slots: Vec<Quad<B>>,
    free: Vec<usize>,
    allocated: usize,
}

impl<B> Quads<B> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Quads {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            allocated: 0,
        }
    }

    pub(crate) fn alloc(&mut self, region: Rectangle, parent: Option<usize>, depth: usize) -> usize {
        self.allocated += 1;
        match self.free.pop() {
            Some(slot) => {
                let quad = &mut self.slots[slot];
                quad.index = Some(slot);
                quad.region = region;
                quad.element_bounds = None;
                quad.elements.clear();
                quad.children = None;
                quad.parent = parent;
                quad.depth = depth;
                quad.total = 0;
                slot
            }
            None => {
                let slot = self.slots.len();
                self.slots.push(Quad::new(slot, region, parent, depth));
                slot
            }
        }
    }

    pub(crate) fn release(&mut self, slot: usize) {
        let quad = &mut self.slots[slot];
        if quad.index.take().is_none() {
            return;
        }
        quad.elements.clear();
        quad.children = None;
        quad.parent = None;
        quad.element_bounds = None;
        quad.total = 0;
        self.free.push(slot);
        self.allocated -= 1;
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&Quad<B>> {
        self.slots.get(slot).filter(|quad| quad.index.is_some())
    }

    pub(crate) fn allocated(&self) -> usize {
        self.allocated
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.allocated = 0;
    }
}

impl<B> Index<usize> for Quads<B> {
    type Output = Quad<B>;

    fn index(&self, slot: usize) -> &Quad<B> {
        &self.slots[slot]
    }
}

impl<B> IndexMut<usize> for Quads<B> {
    fn index_mut(&mut self, slot: usize) -> &mut Quad<B> {
        &mut self.slots[slot]
    }
}
