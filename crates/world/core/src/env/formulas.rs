//! Damage-formula collaborator.
//!
//! Max-hit math lives outside the core: it depends on stat tables, prayer,
//! and equipment bonuses, all external catalogs. The engine hands the oracle
//! both identities plus a deterministic roll and receives the raw damage;
//! capping against remaining health stays the engine's job.

use crate::state::{ActorId, NpcId, PlayerId, SpellId};

/// Melee/ranged/magic damage calculators and attack-speed lookups.
pub trait FormulaOracle: Send + Sync {
    /// Raw melee damage for one swing. `roll` is a deterministic value in
    /// [0, u32::MAX] the implementation may fold into its variance.
    fn melee_damage(&self, attacker: PlayerId, defender: ActorId, roll: u32) -> u32;

    /// Raw ranged damage for one shot.
    fn ranged_damage(&self, attacker: PlayerId, defender: ActorId, roll: u32) -> u32;

    /// Raw magic damage for one cast of `spell`.
    fn magic_damage(&self, attacker: PlayerId, spell: SpellId, defender: ActorId, roll: u32)
    -> u32;

    /// Raw damage for an NPC's strike against its aggro target.
    fn npc_damage(&self, attacker: NpcId, defender: ActorId, roll: u32) -> u32;

    /// Attack speed in ticks; the cooldown an attacker resets to after a
    /// successful attack.
    fn attack_speed(&self, attacker: ActorId) -> u32;
}
