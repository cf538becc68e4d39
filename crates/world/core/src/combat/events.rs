//! Outbound combat events and the death outbox.
//!
//! Deaths are not processed inline: the engine records them as explicit
//! [`DeathEvent`] records handed to an external death-processing pass
//! (respawn, drops, gravestones). The outbox is cleared at the start of each
//! tick's phase pair, so records must be drained before the next tick or
//! they are lost.

use std::collections::BTreeSet;

use crate::state::{ActorId, ItemId, NpcId, PlayerId, Position, SpellId};

/// A death flagged this tick, with the credited killer.
///
/// The killer is the top damage-ledger contributor, falling back to the
/// immediate attacker; `None` only for environmental deaths recorded by
/// external systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathEvent {
    pub victim: ActorId,
    pub killer: Option<ActorId>,
}

/// Per-tick buffer of death records awaiting the death-processing pass.
#[derive(Debug, Default)]
pub struct DeathOutbox {
    events: Vec<DeathEvent>,
    recorded: BTreeSet<ActorId>,
}

impl DeathOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a death. A victim appears at most once per tick; a repeated
    /// record is ignored and `false` is returned.
    pub fn push(&mut self, victim: ActorId, killer: Option<ActorId>) -> bool {
        if !self.recorded.insert(victim) {
            return false;
        }
        self.events.push(DeathEvent { victim, killer });
        true
    }

    pub fn contains(&self, victim: ActorId) -> bool {
        self.recorded.contains(&victim)
    }

    /// NPCs flagged dying this tick with their credited killers.
    pub fn dying_npcs_with_killers(&self) -> Vec<(NpcId, Option<ActorId>)> {
        self.events
            .iter()
            .filter_map(|event| event.victim.as_npc().map(|npc| (npc, event.killer)))
            .collect()
    }

    /// Players flagged dying this tick with their credited killers.
    pub fn dying_players(&self) -> Vec<(PlayerId, Option<ActorId>)> {
        self.events
            .iter()
            .filter_map(|event| event.victim.as_player().map(|p| (p, event.killer)))
            .collect()
    }

    /// Hands all records to the caller and empties the outbox. The
    /// death-processing pass must call this (or [`clear`](Self::clear)) once
    /// it has consumed the tick's records.
    pub fn drain(&mut self) -> Vec<DeathEvent> {
        self.recorded.clear();
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.recorded.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// User-visible message payload, delivered over the ordinary notification
/// channel. Failure notices differ from gameplay chatter only in content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notice {
    /// Ranged attack attempted with no equipped ammunition.
    OutOfAmmo,
    /// Cast attempted without the reagents its recipe needs.
    OutOfReagents { spell: SpellId },
}

/// Area-visible side effect broadcast to nearby observers. Fire and forget;
/// delivery is never awaited and failures are not surfaced to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AreaEffect {
    /// Damage number shown over the target.
    HitSplat { target: ActorId, amount: u32 },
    /// Spell cast animation at the caster.
    SpellCast { caster: PlayerId, spell: SpellId },
    /// Projectile flight between two tiles.
    Projectile { from: Position, to: Position },
    /// Recoverable item landing on a tile (dropped ammunition).
    GroundDrop { item: ItemId, position: Position },
}
