//! Runtime implementations of the combat core's read-only collaborators.
//!
//! These are bundled into an [`OracleBundle`] so the driver can build a
//! [`world_core::CombatEnv`] snapshot once per tick. The data is immutable
//! during a tick; the driver mutates the registries (spawned actors, blocked
//! tiles) only between ticks.

mod formulas;
mod los;
mod regions;
mod spells;

use world_core::{CombatEnv, PcgRng};

pub use formulas::{CombatFormulas, FormulaTables};
pub use los::TileLos;
pub use regions::{RegionMap, RegionZone};
pub use spells::Spellbook;

/// All read-only collaborators of one shard.
#[derive(Clone, Debug, Default)]
pub struct OracleBundle {
    pub formulas: CombatFormulas,
    pub spells: Spellbook,
    pub regions: RegionMap,
    /// Absent means sight checks fail open everywhere.
    pub los: Option<TileLos>,
    rng: PcgRng,
}

impl OracleBundle {
    pub fn new(formulas: CombatFormulas, spells: Spellbook, regions: RegionMap) -> Self {
        Self {
            formulas,
            spells,
            regions,
            los: None,
            rng: PcgRng,
        }
    }

    pub fn with_los(mut self, los: TileLos) -> Self {
        self.los = Some(los);
        self
    }

    /// Borrows the bundle as a combat environment for one tick.
    pub fn as_env(&self) -> CombatEnv<'_> {
        let mut env = CombatEnv::empty()
            .with_formulas(&self.formulas)
            .with_spells(&self.spells)
            .with_regions(&self.regions)
            .with_rng(&self.rng);
        if let Some(los) = &self.los {
            env = env.with_los(los);
        }
        env
    }
}
