//! Spell catalog collaborator.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::state::{ItemId, SpellId};

/// One reagent line of a spell recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reagent {
    pub item: ItemId,
    pub amount: u32,
}

/// Static definition of a combat spell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub id: SpellId,
    /// Cast range in tiles (Chebyshev).
    pub range: u32,
    /// Item-resource recipe consumed per cast.
    pub reagents: ArrayVec<Reagent, { CombatConfig::MAX_REAGENTS }>,
}

impl SpellDefinition {
    pub fn new(id: SpellId, range: u32, reagents: &[Reagent]) -> Self {
        Self {
            id,
            range,
            reagents: reagents.iter().copied().collect(),
        }
    }
}

/// Recipe/range lookups by spell id.
pub trait SpellOracle: Send + Sync {
    /// Definition for a spell id, or `None` for an unknown id (the engine
    /// treats an unknown active spell as a cancelled cast).
    fn spell(&self, id: SpellId) -> Option<SpellDefinition>;
}
