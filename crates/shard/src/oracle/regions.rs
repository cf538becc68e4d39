//! Region table: zone flags and wilderness depth.

use serde::{Deserialize, Serialize};
use world_core::{Position, RegionFlags, RegionOracle};

/// Axis-aligned rectangular zone with its flags. Bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionZone {
    pub level: u32,
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub flags: RegionFlags,
}

impl RegionZone {
    fn contains(&self, pos: Position) -> bool {
        pos.level == self.level
            && (self.min_x..=self.max_x).contains(&pos.x)
            && (self.min_y..=self.max_y).contains(&pos.y)
    }
}

/// [`RegionOracle`] over a zone table.
///
/// Wilderness depth grows with distance past the wilderness boundary line:
/// depth 1 covers the first `tiles_per_depth` rows beyond `wilderness_edge_y`,
/// depth 2 the next, and so on. Tiles outside any WILDERNESS zone have no
/// depth at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionMap {
    pub zones: Vec<RegionZone>,
    pub wilderness_edge_y: i32,
    pub tiles_per_depth: u32,
}

impl Default for RegionMap {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            wilderness_edge_y: 0,
            tiles_per_depth: 8,
        }
    }
}

impl RegionMap {
    pub fn new(zones: Vec<RegionZone>) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }
}

impl RegionOracle for RegionMap {
    fn flags(&self, pos: Position) -> RegionFlags {
        self.zones
            .iter()
            .filter(|zone| zone.contains(pos))
            .fold(RegionFlags::empty(), |acc, zone| acc | zone.flags)
    }

    fn wilderness_depth(&self, pos: Position) -> Option<u32> {
        if !self.flags(pos).contains(RegionFlags::WILDERNESS) {
            return None;
        }
        let past_edge = (pos.y - self.wilderness_edge_y).max(0) as u32;
        Some(past_edge / self.tiles_per_depth.max(1) + 1)
    }
}
