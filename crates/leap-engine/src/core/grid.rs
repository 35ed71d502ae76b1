//! Uniform spatial grid used as the broad phase for movement resolution.
//!
//! Every entity is registered in each cell its box overlaps. The grid keeps
//! the box an entity was registered with so `remove` and `relocate` are exact
//! inverses of `insert`, whatever happened to the entity since.

use std::collections::HashMap;

use crate::api::types::EntityId;
use crate::core::geometry::Rect;

type Cell = (i32, i32);

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<EntityId>>,
    registered: HashMap<EntityId, Rect>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: HashMap::new(),
            registered: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Inclusive range of cells overlapped by `rect`.
    fn cell_range(&self, rect: &Rect) -> (Cell, Cell) {
        let cs = self.cell_size;
        let min = (
            (rect.left() / cs).floor() as i32,
            (rect.bottom() / cs).floor() as i32,
        );
        let max = (
            (rect.right() / cs).floor() as i32,
            (rect.top() / cs).floor() as i32,
        );
        (min, max)
    }

    /// Register `id` in every cell overlapped by `rect`.
    /// An entity already present is relocated instead.
    pub fn insert(&mut self, id: EntityId, rect: Rect) {
        if self.registered.contains_key(&id) {
            self.relocate(id, rect);
            return;
        }
        let ((x0, y0), (x1, y1)) = self.cell_range(&rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
        self.registered.insert(id, rect);
    }

    /// Remove `id` from every cell it was registered in. Returns false if unknown.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(rect) = self.registered.remove(&id) else {
            return false;
        };
        let ((x0, y0), (x1, y1)) = self.cell_range(&rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(list) = self.cells.get_mut(&(cx, cy)) {
                    list.retain(|e| *e != id);
                    if list.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
        true
    }

    /// Move `id` from the cells of its previous box to the cells of `rect`.
    pub fn relocate(&mut self, id: EntityId, rect: Rect) {
        if let Some(old) = self.registered.get(&id) {
            if self.cell_range(old) == self.cell_range(&rect) {
                self.registered.insert(id, rect);
                return;
            }
        }
        self.remove(id);
        self.insert(id, rect);
    }

    /// All entities registered in cells overlapped by `rect`, without
    /// duplicates, sorted by id.
    pub fn query(&self, rect: &Rect) -> Vec<EntityId> {
        let ((x0, y0), (x1, y1)) = self.cell_range(rect);
        let mut out = Vec::new();
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(list) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(list);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.registered.contains_key(&id)
    }

    /// The box `id` is currently registered with.
    pub fn registered_rect(&self, id: EntityId) -> Option<Rect> {
        self.registered.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
