//! Mutating collaborators: equipment, experience, outbound events.
//!
//! Unlike the read-only oracles these take `&mut self`: consuming ammo or
//! granting experience changes state the engine does not own. They are
//! bundled in [`crate::env::CombatServices`] and passed alongside the
//! read-only [`crate::env::CombatEnv`].

use super::spells::Reagent;
use crate::combat::{AreaEffect, Discipline, Notice};
use crate::state::{AttackStyle, ItemId, PlayerId, Position};

/// Equipment/inventory seam: ammunition and reagent consumption.
pub trait EquipmentService {
    /// Item id of the equipped ammunition, or `None` when the quiver is
    /// empty or incompatible with the weapon.
    fn equipped_ammo(&self, player: PlayerId) -> Option<ItemId>;

    /// Removes one unit of equipped ammunition. Returns the item removed,
    /// or `None` if there was nothing to consume.
    fn consume_ammo(&mut self, player: PlayerId) -> Option<ItemId>;

    /// Atomically verifies and consumes a spell's reagent recipe. A recipe
    /// line matching `waived` is supplied by the equipped staff and not
    /// drawn from inventory. Nothing is consumed on failure.
    fn consume_reagents(
        &mut self,
        player: PlayerId,
        recipe: &[Reagent],
        waived: Option<ItemId>,
    ) -> bool;
}

/// Experience seam: combat xp awarded per successful attack.
pub trait ExperienceService {
    /// Grants xp to `player`, keyed by the discipline trained and the
    /// selected attack style, proportional to damage dealt.
    fn grant(&mut self, player: PlayerId, discipline: Discipline, style: AttackStyle, damage: u32);
}

/// Outbound event seam: targeted notices and area broadcasts.
///
/// Both calls are fire-and-forget handoffs; implementations must not block
/// the tick.
pub trait EventSink {
    /// Sends a user-visible message to one player.
    fn notify(&mut self, player: PlayerId, notice: Notice);

    /// Publishes an area-visible effect to observers near `origin`.
    fn broadcast(&mut self, origin: Position, effect: AreaEffect);
}
