use fxhash::FxHashMap;
use std::mem;

#[derive(Clone, Debug, PartialEq)]
pub struct ElementEntry<B> {
    pub id: u32,
    pub bounds: B,
}

/// Dense element storage with an id to position map. Removal swaps the last
/// entry into the hole, so the sequence never has gaps.
#[derive(Clone, Debug)]
pub struct QuadElements<B> {
    elements: Vec<ElementEntry<B>>,
    indices: FxHashMap<u32, usize>,
}

impl<B> Default for QuadElements<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> QuadElements<B> {
    pub fn new() -> Self {
        QuadElements {
            elements: Vec::new(),
            indices: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut indices = FxHashMap::default();
        indices.reserve(capacity);
        QuadElements {
            elements: Vec::with_capacity(capacity),
            indices,
        }
    }

    /// Returns `false` without touching the store if `id` is already present.
    pub fn add(&mut self, id: u32, bounds: B) -> bool {
        if self.indices.contains_key(&id) {
            return false;
        }
        self.indices.insert(id, self.elements.len());
        self.elements.push(ElementEntry { id, bounds });
        true
    }

    pub fn remove(&mut self, id: u32) -> Option<B> {
        let index = self.indices.remove(&id)?;
        let removed = self.elements.swap_remove(index);
        if let Some(moved) = self.elements.get(index) {
            self.indices.insert(moved.id, index);
        }
        Some(removed.bounds)
    }

    pub fn get(&self, index: usize) -> Option<&ElementEntry<B>> {
        self.elements.get(index)
    }

    pub fn get_by_id(&self, id: u32) -> Option<&B> {
        let index = *self.indices.get(&id)?;
        Some(&self.elements[index].bounds)
    }

    pub fn get_mut_by_id(&mut self, id: u32) -> Option<&mut B> {
        let index = *self.indices.get(&id)?;
        Some(&mut self.elements[index].bounds)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.indices.contains_key(&id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElementEntry<B>> {
        self.elements.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.elements.iter().map(|entry| entry.id)
    }

    /// Empties the store and hands back its entries in storage order.
    pub fn take_all(&mut self) -> Vec<ElementEntry<B>> {
        self.indices.clear();
        mem::take(&mut self.elements)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.indices.clear();
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.indices.len() == self.elements.len()
            && self
                .elements
                .iter()
                .enumerate()
                .all(|(index, entry)| self.indices.get(&entry.id) == Some(&index))
    }
}

impl<'a, B> IntoIterator for &'a QuadElements<B> {
    type Item = &'a ElementEntry<B>;
    type IntoIter = std::slice::Iter<'a, ElementEntry<B>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
