use crate::elements::QuadElements;
use crate::error::{BroadphaseError, BroadphaseResult};
use crate::query::Query;
use crate::validation::{validate_area, validate_region};
use collisions::CollisionArea;
use common::shapes::Rectangle;
use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Upper bound on `columns * rows` accepted by [`CellGrid::new`].
pub const MAX_CELLS: usize = 1 << 24;

/// Inclusive range of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRange {
    min_column: usize,
    min_row: usize,
    max_column: usize,
    max_row: usize,
}

impl CellRange {
    fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_column..=self.max_column).map(move |column| (column, row)))
    }
}

#[derive(Clone, Debug)]
struct GridEntry {
    area: CollisionArea,
    range: CellRange,
}

/// Fixed-size cells over a region. An element is listed in every cell its
/// bounding box touches; queries report each id once.
///
/// Areas sticking out of the region are clamped into the border cells.
#[derive(Clone, Debug)]
pub struct CellGrid {
    region: Rectangle,
    cell_width: f32,
    cell_height: f32,
    columns: usize,
    rows: usize,
    cells: Vec<QuadElements<()>>,
    entries: FxHashMap<u32, GridEntry>,
}

impl CellGrid {
    pub fn new(region: Rectangle, cell_width: f32, cell_height: f32) -> BroadphaseResult<Self> {
        validate_region(&region)?;
        if !(cell_width.is_finite() && cell_height.is_finite())
            || cell_width <= 0.0
            || cell_height <= 0.0
        {
            return Err(BroadphaseError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        let columns_f = (region.width / cell_width).ceil().max(1.0);
        let rows_f = (region.height / cell_height).ceil().max(1.0);
        let too_many = BroadphaseError::TooManyCells {
            columns: columns_f,
            rows: rows_f,
        };
        // Reject before the casts, which saturate.
        if !(columns_f.is_finite() && rows_f.is_finite())
            || f64::from(columns_f) * f64::from(rows_f) > MAX_CELLS as f64
        {
            return Err(too_many);
        }
        let columns = columns_f as usize;
        let rows = rows_f as usize;
        let count = columns
            .checked_mul(rows)
            .filter(|&count| count <= MAX_CELLS)
            .ok_or(too_many)?;
        let mut cells = Vec::with_capacity(count);
        cells.resize_with(count, QuadElements::new);
        debug!(?region, columns, rows, "created cell grid");
        Ok(CellGrid {
            region,
            cell_width,
            cell_height,
            columns,
            rows,
            cells,
            entries: FxHashMap::default(),
        })
    }

    pub fn region(&self) -> Rectangle {
        self.region
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_region(&self, column: usize, row: usize) -> Option<Rectangle> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let left = self.region.left() + column as f32 * self.cell_width;
        let top = self.region.top() + row as f32 * self.cell_height;
        Some(Rectangle::from_min_max(
            left,
            top,
            left + self.cell_width,
            top + self.cell_height,
        ))
    }

    pub fn elements_in_cell(&self, column: usize, row: usize) -> Vec<u32> {
        if column >= self.columns || row >= self.rows {
            return Vec::new();
        }
        self.cells[self.cell_index(column, row)].ids().collect()
    }

    /// Returns `Ok(false)` if `id` is already stored.
    pub fn insert(&mut self, id: u32, area: CollisionArea) -> BroadphaseResult<bool> {
        validate_area(&area)?;
        let range = self.checked_range(&area)?;
        if self.entries.contains_key(&id) {
            return Ok(false);
        }
        self.add_to_cells(id, range);
        self.entries.insert(id, GridEntry { area, range });
        Ok(true)
    }

    pub fn remove(&mut self, id: u32) -> bool {
        match self.entries.remove(&id) {
            Some(entry) => {
                self.remove_from_cells(id, entry.range);
                true
            }
            None => false,
        }
    }

    /// Cells are only touched when the covered range changes.
    pub fn relocate(&mut self, id: u32, area: CollisionArea) -> BroadphaseResult<bool> {
        validate_area(&area)?;
        let range = self.checked_range(&area)?;
        let previous = match self.entries.get(&id) {
            Some(entry) => entry.range,
            None => return Ok(false),
        };
        if previous != range {
            self.remove_from_cells(id, previous);
            self.add_to_cells(id, range);
        }
        self.entries.insert(id, GridEntry { area, range });
        Ok(true)
    }

    pub fn get(&self, id: u32) -> Option<&CollisionArea> {
        self.entries.get(&id).map(|entry| &entry.area)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn query_into(&self, query: &Query, out: &mut Vec<u32>) {
        if self.entries.is_empty() {
            return;
        }
        let bounding_box = query.bounding_box();
        let range = self.clamped_range(&bounding_box);
        // Border cells also stand for everything beyond the region, so only a
        // segment fully inside the region may skip cells it does not cross.
        let segment = match query {
            Query::IntersectingLineSegment(segment)
                if self.region.contains_rectangle(&bounding_box) =>
            {
                Some(segment)
            }
            _ => None,
        };
        let mut seen = FxHashSet::default();
        for (column, row) in range.cells() {
            if let Some(segment) = segment {
                let crossed = self
                    .cell_region(column, row)
                    .map_or(false, |cell| segment.intersects_rectangle(&cell));
                if !crossed {
                    continue;
                }
            }
            for id in self.cells[self.cell_index(column, row)].ids() {
                if !seen.insert(id) {
                    continue;
                }
                if let Some(entry) = self.entries.get(&id) {
                    if query.matches_area(&entry.area) {
                        out.push(id);
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
        out.extend(self.entries.keys().copied());
    }

    pub fn total_elements(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        let removed = self.entries.len();
        for cell in &mut self.cells {
            cell.clear();
        }
        self.entries.clear();
        debug!(removed, "cleared cell grid");
    }

    fn cell_index(&self, column: usize, row: usize) -> usize {
        row * self.columns + column
    }

    fn checked_range(&self, area: &CollisionArea) -> BroadphaseResult<CellRange> {
        let bounding_box = area.bounding_box();
        if !self.region.intersects(&bounding_box) {
            return Err(BroadphaseError::AreaOutOfBounds {
                min_x: bounding_box.left(),
                min_y: bounding_box.top(),
                max_x: bounding_box.right(),
                max_y: bounding_box.bottom(),
            });
        }
        Ok(self.clamped_range(&bounding_box))
    }

    fn clamped_range(&self, bounding_box: &Rectangle) -> CellRange {
        let left = self.region.left();
        let top = self.region.top();
        CellRange {
            min_column: clamp_cell(bounding_box.left() - left, self.cell_width, self.columns),
            min_row: clamp_cell(bounding_box.top() - top, self.cell_height, self.rows),
            max_column: clamp_cell(bounding_box.right() - left, self.cell_width, self.columns),
            max_row: clamp_cell(bounding_box.bottom() - top, self.cell_height, self.rows),
        }
    }

    fn add_to_cells(&mut self, id: u32, range: CellRange) {
        for (column, row) in range.cells() {
            let index = self.cell_index(column, row);
            self.cells[index].add(id, ());
        }
    }

    fn remove_from_cells(&mut self, id: u32, range: CellRange) {
        for (column, row) in range.cells() {
            let index = self.cell_index(column, row);
            self.cells[index].remove(id);
        }
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let listed: usize = self.cells.iter().map(QuadElements::len).sum();
        let expected: usize = self
            .entries
            .values()
            .map(|entry| entry.range.cells().count())
            .sum();
        listed == expected
            && self.entries.iter().all(|(&id, entry)| {
                entry
                    .range
                    .cells()
                    .all(|(column, row)| self.cells[self.cell_index(column, row)].contains(id))
            })
    }
}

fn clamp_cell(offset: f32, cell_size: f32, count: usize) -> usize {
    let cell = (offset / cell_size).floor();
    if cell <= 0.0 {
        0
    } else {
        (cell as usize).min(count - 1)
    }
}
