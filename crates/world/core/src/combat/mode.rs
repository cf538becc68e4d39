//! Combat mode resolution.
//!
//! A player's mode is derived from spell selection and equipped weapon, in
//! that order: a single-cast spell beats autocast beats the weapon class.
//! Resolution is idempotent; the engine calls it once per attempt and once
//! more after a cast cancellation changes the inputs.

use crate::state::{PlayerState, SpellId, WeaponClass};

/// How an attack is delivered this attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatMode {
    /// Adjacency attack, range 1.
    Melee,
    /// Projectile attack with the weapon's configured range; needs ammo.
    Ranged { range: u32 },
    /// Spell attack; range comes from the spell catalog, resources from the
    /// reagent recipe.
    Magic { spell: SpellId, single_cast: bool },
}

impl CombatMode {
    /// Experience discipline this mode trains.
    pub fn discipline(&self) -> Discipline {
        match self {
            CombatMode::Melee => Discipline::Melee,
            CombatMode::Ranged { .. } => Discipline::Ranged,
            CombatMode::Magic { .. } => Discipline::Magic,
        }
    }
}

/// Experience bucket keyed by delivery mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Discipline {
    Melee,
    Ranged,
    Magic,
}

/// Derives the player's current combat mode from its state.
pub fn resolve_combat_mode(player: &PlayerState) -> CombatMode {
    if let Some(spell) = player.single_cast_spell {
        return CombatMode::Magic {
            spell,
            single_cast: true,
        };
    }
    if let Some(spell) = player.autocast_spell {
        return CombatMode::Magic {
            spell,
            single_cast: false,
        };
    }
    match player.weapon.class {
        WeaponClass::Ranged { range } => CombatMode::Ranged { range },
        WeaponClass::Melee => CombatMode::Melee,
    }
}
