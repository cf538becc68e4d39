//! Per-entity life-cycle states gating which systems may act on a tick.
//!
//! Combat consults these states but owns only one transition: an entity it
//! kills moves to [`LifecycleState::Dead`]. Entry into the combat submodes
//! happens on target acquisition (outside the engine), and the return to
//! `Idle` is external (respawn or target loss), with the single exception
//! of the ranged out-of-ammo path, which actively cancels combat intent.

use crate::combat::CombatMode;

/// Finite life-cycle state of a combat-capable entity.
///
/// Having a target is not sufficient to attack; the actor must also be in
/// one of the `*Combat` submodes (the visible "engage" transition).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LifecycleState {
    #[default]
    Idle,
    MeleeCombat,
    RangeCombat,
    MagicCombat,
    Dead,
    /// Non-combat: interacting with another player's trade screen.
    Trading,
    /// Non-combat: mid-teleport, no system may act on the entity.
    Teleporting,
}

impl LifecycleState {
    /// Returns true for any of the combat submodes.
    #[inline]
    pub fn is_combat(self) -> bool {
        matches!(
            self,
            LifecycleState::MeleeCombat | LifecycleState::RangeCombat | LifecycleState::MagicCombat
        )
    }

    #[inline]
    pub fn is_dead(self) -> bool {
        matches!(self, LifecycleState::Dead)
    }

    /// The combat submode an actor enters when engaging with the given mode.
    pub fn for_mode(mode: &CombatMode) -> Self {
        match mode {
            CombatMode::Melee => LifecycleState::MeleeCombat,
            CombatMode::Ranged { .. } => LifecycleState::RangeCombat,
            CombatMode::Magic { .. } => LifecycleState::MagicCombat,
        }
    }
}
