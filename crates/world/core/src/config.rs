/// Combat core configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Edge length, in tiles, of a spatial hash cell.
    pub spatial_cell_size: u32,

    /// Ticks a freshly-aggro'd NPC waits before striking back.
    pub retaliation_grace_ticks: u32,

    /// Percent chance (0–100) that a fired ammunition unit is consumed.
    pub ammo_consume_chance: u32,

    /// Percent chance (0–100) that a consumed unit lands as a recoverable
    /// ground item instead of breaking.
    pub ammo_recover_chance: u32,

    /// When an NPC dies, reset the credited killer's cooldown to 1 tick so
    /// the next engagement starts promptly. Gameplay feel, not correctness;
    /// disable for authentic pacing.
    pub quick_finish_cooldown: bool,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum reagents in a spell recipe.
    pub const MAX_REAGENTS: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_CELL_SIZE: u32 = 8;
    pub const DEFAULT_RETALIATION_GRACE: u32 = 2;
    pub const DEFAULT_AMMO_CONSUME_CHANCE: u32 = 100;
    pub const DEFAULT_AMMO_RECOVER_CHANCE: u32 = 60;

    pub fn new() -> Self {
        Self {
            spatial_cell_size: Self::DEFAULT_CELL_SIZE,
            retaliation_grace_ticks: Self::DEFAULT_RETALIATION_GRACE,
            ammo_consume_chance: Self::DEFAULT_AMMO_CONSUME_CHANCE,
            ammo_recover_chance: Self::DEFAULT_AMMO_RECOVER_CHANCE,
            quick_finish_cooldown: true,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
