//! Collaborator seams the engine reaches the rest of the server through.
//!
//! Read-only oracles (formulas, spells, regions, LOS, RNG) are aggregated in
//! [`CombatEnv`]; mutating services (equipment, experience, outbound events)
//! travel separately in [`CombatServices`]. The engine never hard-couples to
//! concrete implementations, and a missing required oracle degrades to a
//! skipped pair rather than a halted tick.

mod error;
mod formulas;
mod los;
mod regions;
mod rng;
mod services;
mod spells;

pub use error::OracleError;
pub use formulas::FormulaOracle;
pub use los::LosOracle;
pub use regions::{RegionFlags, RegionOracle};
pub use rng::{PcgRng, RngOracle, RollContext, compute_seed};
pub use services::{EquipmentService, EventSink, ExperienceService};
pub use spells::{Reagent, SpellDefinition, SpellOracle};

use crate::state::Position;

/// Read-only oracles required by a combat tick.
///
/// LOS and regions are genuinely optional: absent LOS means assumed-clear
/// sight, absent regions means no wilderness anywhere (PvP never legal).
/// Formulas, spells, and RNG are required for the operations that use them;
/// accessors surface [`OracleError`] when they were not provided.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    formulas: Option<&'a dyn FormulaOracle>,
    spells: Option<&'a dyn SpellOracle>,
    regions: Option<&'a dyn RegionOracle>,
    los: Option<&'a dyn LosOracle>,
    rng: Option<&'a dyn RngOracle>,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        formulas: Option<&'a dyn FormulaOracle>,
        spells: Option<&'a dyn SpellOracle>,
        regions: Option<&'a dyn RegionOracle>,
        los: Option<&'a dyn LosOracle>,
        rng: Option<&'a dyn RngOracle>,
    ) -> Self {
        Self {
            formulas,
            spells,
            regions,
            los,
            rng,
        }
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None, None)
    }

    pub fn with_formulas(mut self, formulas: &'a dyn FormulaOracle) -> Self {
        self.formulas = Some(formulas);
        self
    }

    pub fn with_spells(mut self, spells: &'a dyn SpellOracle) -> Self {
        self.spells = Some(spells);
        self
    }

    pub fn with_regions(mut self, regions: &'a dyn RegionOracle) -> Self {
        self.regions = Some(regions);
        self
    }

    pub fn with_los(mut self, los: &'a dyn LosOracle) -> Self {
        self.los = Some(los);
        self
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Returns the FormulaOracle, or an error if not available.
    pub fn formulas(&self) -> Result<&'a dyn FormulaOracle, OracleError> {
        self.formulas.ok_or(OracleError::FormulasNotAvailable)
    }

    /// Returns the SpellOracle, or an error if not available.
    pub fn spells(&self) -> Result<&'a dyn SpellOracle, OracleError> {
        self.spells.ok_or(OracleError::SpellsNotAvailable)
    }

    /// Returns the RegionOracle, or an error if not available.
    pub fn regions(&self) -> Result<&'a dyn RegionOracle, OracleError> {
        self.regions.ok_or(OracleError::RegionsNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Whether the environment carries a LOS oracle at all.
    pub fn has_los_oracle(&self) -> bool {
        self.los.is_some()
    }

    /// Line-of-sight check with the documented fail-open default: when no
    /// LOS collaborator is wired, sight is assumed clear.
    pub fn has_los(&self, from: Position, to: Position) -> bool {
        match self.los {
            Some(los) => los.has_los(from, to),
            None => true,
        }
    }
}

/// Mutable collaborators bundled for one tick of combat resolution.
pub struct CombatServices<'a> {
    pub equipment: &'a mut dyn EquipmentService,
    pub experience: &'a mut dyn ExperienceService,
    pub events: &'a mut dyn EventSink,
}

impl<'a> CombatServices<'a> {
    pub fn new(
        equipment: &'a mut dyn EquipmentService,
        experience: &'a mut dyn ExperienceService,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            equipment,
            experience,
            events,
        }
    }
}
