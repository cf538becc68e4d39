//! Cell-based spatial hash over actor tile positions.
//!
//! Entities are bucketed by `(map level, floor(x / cell), floor(y / cell))`.
//! Queries iterate only the cells overlapping the requested window and then
//! filter to the exact box. An entity occupies exactly one cell at a time;
//! out-of-range coordinates are not clamped or rejected, integer division
//! simply places them in whatever cell it yields.

use std::collections::HashMap;

use crate::state::{ActorId, Position};

/// Bucket key: map level plus floored cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellKey {
    level: u32,
    cx: i32,
    cy: i32,
}

/// Spatial hash with insert/relocate/remove and windowed queries.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    cell_size: u32,
    cells: HashMap<CellKey, Vec<ActorId>>,
    positions: HashMap<ActorId, Position>,
}

impl SpatialIndex {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(1),
            cells: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    fn key(&self, position: Position) -> CellKey {
        let size = self.cell_size as i32;
        CellKey {
            level: position.level,
            cx: position.x.div_euclid(size),
            cy: position.y.div_euclid(size),
        }
    }

    /// Inserts the entity at `position`, relocating it between cells if its
    /// coordinates changed. Re-inserting at the same position is a no-op.
    pub fn insert(&mut self, id: ActorId, position: Position) {
        if let Some(previous) = self.positions.insert(id, position) {
            if previous == position {
                return;
            }
            let old_key = self.key(previous);
            let new_key = self.key(position);
            if old_key == new_key {
                return;
            }
            self.detach(id, old_key);
        }
        self.cells.entry(self.key(position)).or_default().push(id);
    }

    /// Removes the entity. Removing an absent entity is a no-op.
    pub fn remove(&mut self, id: ActorId) {
        if let Some(position) = self.positions.remove(&id) {
            let key = self.key(position);
            self.detach(id, key);
        }
    }

    fn detach(&mut self, id: ActorId, key: CellKey) {
        if let Some(bucket) = self.cells.get_mut(&key) {
            bucket.retain(|occupant| *occupant != id);
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    /// Stored position of an entity, if present.
    pub fn position_of(&self, id: ActorId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All entities within Chebyshev distance `radius` of `center`, on the
    /// same map level. Results are sorted by id for deterministic iteration.
    pub fn query_radius(&self, center: Position, radius: u32) -> Vec<ActorId> {
        let r = radius as i32;
        let min = Position::new(center.level, center.x - r, center.y - r);
        let max = Position::new(center.level, center.x + r, center.y + r);
        self.query_bounding_box(min, max)
    }

    /// All entities inside the inclusive box `[min, max]` on `min`'s map
    /// level. Only cells overlapping the window are visited; occupants are
    /// then filtered to the exact box.
    pub fn query_bounding_box(&self, min: Position, max: Position) -> Vec<ActorId> {
        let size = self.cell_size as i32;
        let cx_min = min.x.div_euclid(size);
        let cx_max = max.x.div_euclid(size);
        let cy_min = min.y.div_euclid(size);
        let cy_max = max.y.div_euclid(size);

        let mut out = Vec::new();
        for cx in cx_min..=cx_max {
            for cy in cy_min..=cy_max {
                let key = CellKey {
                    level: min.level,
                    cx,
                    cy,
                };
                let Some(bucket) = self.cells.get(&key) else {
                    continue;
                };
                for id in bucket {
                    let pos = self.positions[id];
                    if pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y {
                        out.push(*id);
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}
