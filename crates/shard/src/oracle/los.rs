//! Tile-based line-of-sight oracle.

use std::collections::HashSet;

use world_core::{LosOracle, Position};

/// Line-of-sight over a set of sight-blocking tiles.
///
/// Sight is traced tile by tile along a Bresenham line between the two
/// endpoints; any blocked tile strictly between them breaks the line.
/// Endpoints themselves never block (an archer standing in a doorway can
/// still shoot out of it).
#[derive(Clone, Debug, Default)]
pub struct TileLos {
    blocked: HashSet<Position>,
}

impl TileLos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&mut self, tile: Position) {
        self.blocked.insert(tile);
    }

    pub fn unblock(&mut self, tile: Position) {
        self.blocked.remove(&tile);
    }
}

impl LosOracle for TileLos {
    fn has_los(&self, from: Position, to: Position) -> bool {
        if !from.same_level(&to) {
            return false;
        }
        let level = from.level;
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - x).abs();
        let dy = -(to.y - y).abs();
        let sx = if x < to.x { 1 } else { -1 };
        let sy = if y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x == to.x && y == to.y {
                return true;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            if (x, y) != (to.x, to.y) && self.blocked.contains(&Position::new(level, x, y)) {
                return false;
            }
        }
    }
}
