//! Target references and the targeting service.
//!
//! The service owns every actor's single outgoing target. It is bookkeeping
//! only: range, line of sight, and PvP legality are validated by the combat
//! engine, never here.

use std::collections::BTreeMap;

use crate::state::{ActorId, NpcId, PlayerId};

/// What a target reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetKind {
    Player,
    Npc,
    Item,
    Environment,
}

/// Small value identifying what an actor is targeting.
///
/// Compared structurally; "untargeted" is the absence of a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: u32,
}

impl TargetRef {
    pub fn player(id: PlayerId) -> Self {
        Self {
            kind: TargetKind::Player,
            id: id.0,
        }
    }

    pub fn npc(id: NpcId) -> Self {
        Self {
            kind: TargetKind::Npc,
            id: id.0,
        }
    }

    pub fn item(id: u32) -> Self {
        Self {
            kind: TargetKind::Item,
            id,
        }
    }

    /// The combat-capable actor this reference points at, if any.
    pub fn as_actor(&self) -> Option<ActorId> {
        match self.kind {
            TargetKind::Player => Some(ActorId::Player(PlayerId(self.id))),
            TargetKind::Npc => Some(ActorId::Npc(NpcId(self.id))),
            TargetKind::Item | TargetKind::Environment => None,
        }
    }
}

impl From<ActorId> for TargetRef {
    fn from(actor: ActorId) -> Self {
        match actor {
            ActorId::Player(id) => TargetRef::player(id),
            ActorId::Npc(id) => TargetRef::npc(id),
        }
    }
}

/// Owns the outgoing target of every actor on the shard.
///
/// Kind-bucketed secondary indexes keep the per-tick attacker/target
/// snapshots cheap; the engine never scans the full actor tables.
#[derive(Debug, Default)]
pub struct TargetingService {
    targets: BTreeMap<ActorId, TargetRef>,
    players_on_npcs: BTreeMap<PlayerId, NpcId>,
    players_on_players: BTreeMap<PlayerId, PlayerId>,
    npcs_on_players: BTreeMap<NpcId, PlayerId>,
}

impl TargetingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently replaces the actor's outgoing target.
    pub fn set_target(&mut self, actor: ActorId, target: TargetRef) {
        self.clear_target(actor);
        self.targets.insert(actor, target);
        match (actor, target.kind) {
            (ActorId::Player(p), TargetKind::Npc) => {
                self.players_on_npcs.insert(p, NpcId(target.id));
            }
            (ActorId::Player(p), TargetKind::Player) => {
                self.players_on_players.insert(p, PlayerId(target.id));
            }
            (ActorId::Npc(n), TargetKind::Player) => {
                self.npcs_on_players.insert(n, PlayerId(target.id));
            }
            _ => {}
        }
    }

    /// Idempotently removes the actor's outgoing target.
    pub fn clear_target(&mut self, actor: ActorId) {
        if self.targets.remove(&actor).is_none() {
            return;
        }
        match actor {
            ActorId::Player(p) => {
                self.players_on_npcs.remove(&p);
                self.players_on_players.remove(&p);
            }
            ActorId::Npc(n) => {
                self.npcs_on_players.remove(&n);
            }
        }
    }

    pub fn target_of(&self, actor: ActorId) -> Option<TargetRef> {
        self.targets.get(&actor).copied()
    }

    /// Snapshot of players currently targeting NPCs.
    pub fn players_targeting_npcs(&self) -> Vec<(PlayerId, NpcId)> {
        self.players_on_npcs
            .iter()
            .map(|(p, n)| (*p, *n))
            .collect()
    }

    /// Snapshot of players currently targeting other players.
    pub fn players_targeting_players(&self) -> Vec<(PlayerId, PlayerId)> {
        self.players_on_players
            .iter()
            .map(|(a, b)| (*a, *b))
            .collect()
    }

    /// Snapshot of NPCs currently targeting players.
    pub fn npcs_targeting_players(&self) -> Vec<(NpcId, PlayerId)> {
        self.npcs_on_players
            .iter()
            .map(|(n, p)| (*n, *p))
            .collect()
    }

    /// Removes every NPC target pointing at `player` and returns the NPCs
    /// affected, so the caller can drop their aggro memory in the same tick.
    /// Invoked on player death to stop attacks from the grave.
    pub fn clear_all_npcs_targeting_player(&mut self, player: PlayerId) -> Vec<NpcId> {
        let affected: Vec<NpcId> = self
            .npcs_on_players
            .iter()
            .filter(|(_, p)| **p == player)
            .map(|(n, _)| *n)
            .collect();
        for npc in &affected {
            self.clear_target(ActorId::Npc(*npc));
        }
        affected
    }

    /// Number of actors with an outgoing target.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
