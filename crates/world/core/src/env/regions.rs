//! Map-region collaborator: PvP legality and region attributes.

use bitflags::bitflags;

use crate::state::Position;

bitflags! {
    /// Attributes of the region a tile belongs to.
    ///
    /// Serde impls come from the `bitflags/serde` feature.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct RegionFlags: u8 {
        /// Player-versus-player combat is legal here.
        const WILDERNESS = 0b0001;
        /// Multiple attackers may pile onto one target.
        const MULTI_COMBAT = 0b0010;
        /// No combat of any kind (banks, spawn squares).
        const SAFE_ZONE = 0b0100;
    }
}

/// Region lookups by tile.
pub trait RegionOracle: Send + Sync {
    fn flags(&self, position: Position) -> RegionFlags;

    /// Wilderness depth at a tile: `None` outside the wilderness, otherwise
    /// the depth value that bounds the legal PvP combat-level gap.
    fn wilderness_depth(&self, position: Position) -> Option<u32>;
}
