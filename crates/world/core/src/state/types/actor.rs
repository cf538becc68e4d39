//! Actor state owned by the shard: players and NPC instances.
//!
//! Combat mutates only the fields it owns per the tick contract: health,
//! combat cooldown, life-cycle state, and NPC aggro memory. Positions are
//! written by the movement subsystem; equipment summaries by the equipment
//! subsystem.

use super::common::{ActorId, ItemId, NpcId, PlayerId, Position, SpellId};
use super::lifecycle::LifecycleState;

/// A capped, temporarily-boostable skill level.
///
/// `base` is the permanent level; `current` drifts under boosts and damage
/// (for hitpoints) and is restored externally. Player health is the current
/// hitpoints level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub base: u32,
    pub current: u32,
}

impl Skill {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            current: base,
        }
    }

    /// Reduces the current level, clamped at zero. Returns the amount
    /// actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let applied = amount.min(self.current);
        self.current -= applied;
        applied
    }

    /// Raises the current level, capped at `base + amount` so stacked boosts
    /// cannot climb without bound.
    pub fn boost(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.base + amount);
    }

    /// Resets the current level back to base (respawn, restore potion).
    pub fn restore(&mut self) {
        self.current = self.base;
    }
}

/// Weapon classification relevant to combat mode resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponClass {
    #[default]
    Melee,
    /// Projectile weapon with its configured attack range in tiles.
    Ranged { range: u32 },
}

/// Equipment summary the combat core reads; written by the equipment
/// subsystem whenever the player's loadout changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponProfile {
    pub class: WeaponClass,
    /// Reagent the equipped staff supplies for free, if any. A spell recipe
    /// ingredient matching this item is waived during consumption.
    pub staff_reagent: Option<ItemId>,
}

/// Player attack style selection; weights experience distribution.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackStyle {
    #[default]
    Accurate,
    Aggressive,
    Defensive,
    Controlled,
}

/// Per-player combat state tracked by the shard.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    pub position: Position,
    pub lifecycle: LifecycleState,

    /// Ticks remaining before the next attack. Decremented once per tick
    /// unconditionally; reset to the attack speed after a successful attack.
    pub cooldown: u32,

    /// Hitpoints skill. Health is `hitpoints.current`.
    pub hitpoints: Skill,

    /// Aggregate combat level, used for the wilderness PvP level-gap rule.
    pub combat_level: u32,

    pub weapon: WeaponProfile,
    pub attack_style: AttackStyle,

    /// Spell selected for exactly one cast; takes precedence over autocast
    /// and is cleared once consumed.
    pub single_cast_spell: Option<SpellId>,

    /// Spell re-cast automatically every attack until disabled.
    pub autocast_spell: Option<SpellId>,

    /// When enabled, being attacked while untargeted adopts the attacker.
    pub auto_retaliate: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, position: Position, hitpoints: u32, combat_level: u32) -> Self {
        Self {
            id,
            position,
            lifecycle: LifecycleState::Idle,
            cooldown: 0,
            hitpoints: Skill::new(hitpoints),
            combat_level,
            weapon: WeaponProfile::default(),
            attack_style: AttackStyle::default(),
            single_cast_spell: None,
            autocast_spell: None,
            auto_retaliate: true,
        }
    }

    #[inline]
    pub fn health(&self) -> u32 {
        self.hitpoints.current
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health() > 0 && !self.lifecycle.is_dead()
    }
}

/// Remembered hostile lock-on of an NPC, distinct from the generic target
/// reference owned by the targeting service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggroState {
    pub target: ActorId,
    /// Set when the target left detection range; suppresses instant
    /// re-aggro until cleared externally or overridden by damage taken.
    pub dropped: bool,
}

impl AggroState {
    pub fn new(target: ActorId) -> Self {
        Self {
            target,
            dropped: false,
        }
    }
}

/// Per-NPC combat state tracked by the shard.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcState {
    pub id: NpcId,
    /// Definition id in external catalogs (formulas, drops).
    pub template: u32,
    pub position: Position,
    pub lifecycle: LifecycleState,
    pub cooldown: u32,

    /// Direct integer health; NPCs have no skill indirection.
    pub health: u32,
    pub max_health: u32,

    pub combat_level: u32,
    /// Attack reach in tiles; 1 means melee adjacency.
    pub attack_range: u32,

    pub aggro: Option<AggroState>,
}

impl NpcState {
    pub fn new(id: NpcId, template: u32, position: Position, health: u32) -> Self {
        Self {
            id,
            template,
            position,
            lifecycle: LifecycleState::Idle,
            cooldown: 0,
            health,
            max_health: health,
            combat_level: 1,
            attack_range: 1,
            aggro: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0 && !self.lifecycle.is_dead()
    }

    /// Active aggro target, if any and not marked dropped.
    pub fn live_aggro(&self) -> Option<ActorId> {
        self.aggro
            .filter(|aggro| !aggro.dropped)
            .map(|aggro| aggro.target)
    }
}
