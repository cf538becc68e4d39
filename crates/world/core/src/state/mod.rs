//! Authoritative per-shard world state.
//!
//! A [`WorldShard`] is the single explicit context for one simulation shard:
//! actor tables, targeting, spatial index, damage ledger, and outboxes.
//! Independent shards share no mutable state. The tick is single-threaded,
//! so actor health/cooldown/target fields are mutated only by the combat
//! engine (or designated external mutators such as respawn) and never
//! concurrently.

pub mod types;

use std::collections::BTreeMap;

pub use types::{
    ActorId, AggroState, AttackStyle, ItemId, LifecycleState, NpcId, NpcState, PlayerId,
    PlayerState, Position, Skill, SpellId, Tick, WeaponClass, WeaponProfile,
};

use crate::combat::{DamageLedger, DeathOutbox};
use crate::config::CombatConfig;
use crate::spatial::SpatialIndex;
use crate::targeting::TargetingService;

/// One world shard: actor tables plus the combat bookkeeping structures.
///
/// Lifecycle matches the shard process: created at shard start, dropped at
/// shard stop. Per-entity fields are created at spawn (login or NPC
/// instantiation) and destroyed at despawn (logout, death→respawn).
#[derive(Debug)]
pub struct WorldShard {
    /// Seed every deterministic roll on this shard derives from.
    pub seed: u64,

    /// Current simulation step; advanced once per tick by the driver.
    pub tick: Tick,

    config: CombatConfig,

    players: BTreeMap<PlayerId, PlayerState>,
    npcs: BTreeMap<NpcId, NpcState>,

    pub targeting: TargetingService,
    pub spatial: SpatialIndex,
    pub ledger: DamageLedger,
    pub deaths: DeathOutbox,
}

impl WorldShard {
    pub fn new(seed: u64, config: CombatConfig) -> Self {
        let spatial = SpatialIndex::new(config.spatial_cell_size);
        Self {
            seed,
            tick: Tick::ZERO,
            config,
            players: BTreeMap::new(),
            npcs: BTreeMap::new(),
            targeting: TargetingService::new(),
            spatial,
            ledger: DamageLedger::new(),
            deaths: DeathOutbox::new(),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    // ========================================================================
    // Spawn / despawn
    // ========================================================================

    /// Registers a player on the shard (login).
    pub fn spawn_player(&mut self, player: PlayerState) {
        self.spatial.insert(player.id.into(), player.position);
        self.players.insert(player.id, player);
    }

    /// Removes a player and every combat reference to them (logout).
    pub fn despawn_player(&mut self, id: PlayerId) -> Option<PlayerState> {
        let actor = ActorId::Player(id);
        self.spatial.remove(actor);
        self.targeting.clear_target(actor);
        let released = self.targeting.clear_all_npcs_targeting_player(id);
        for npc in released {
            if let Some(state) = self.npcs.get_mut(&npc) {
                state.aggro = None;
            }
        }
        self.ledger.clear_victim(actor);
        self.players.remove(&id)
    }

    /// Registers an NPC instance on the shard.
    pub fn spawn_npc(&mut self, npc: NpcState) {
        self.spatial.insert(npc.id.into(), npc.position);
        self.npcs.insert(npc.id, npc);
    }

    /// Removes an NPC instance and its combat references.
    pub fn despawn_npc(&mut self, id: NpcId) -> Option<NpcState> {
        let actor = ActorId::Npc(id);
        self.spatial.remove(actor);
        self.targeting.clear_target(actor);
        self.ledger.clear_victim(actor);
        self.npcs.remove(&id)
    }

    // ========================================================================
    // Table access
    // ========================================================================

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(&id)
    }

    pub fn npc(&self, id: NpcId) -> Option<&NpcState> {
        self.npcs.get(&id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut NpcState> {
        self.npcs.get_mut(&id)
    }

    /// Player ids in deterministic order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// NPC ids in deterministic order.
    pub fn npc_ids(&self) -> Vec<NpcId> {
        self.npcs.keys().copied().collect()
    }

    // ========================================================================
    // Uniform actor accessors (tagged-union seam; no ad hoc type tests)
    // ========================================================================

    /// Live position of an actor, or `None` if it despawned.
    pub fn position(&self, actor: ActorId) -> Option<Position> {
        match actor {
            ActorId::Player(id) => self.players.get(&id).map(|p| p.position),
            ActorId::Npc(id) => self.npcs.get(&id).map(|n| n.position),
        }
    }

    /// Moves an actor; owned by the movement subsystem, which keeps the
    /// spatial index in sync through this single entry point.
    pub fn set_position(&mut self, actor: ActorId, position: Position) {
        let moved = match actor {
            ActorId::Player(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.position = position;
                    true
                } else {
                    false
                }
            }
            ActorId::Npc(id) => {
                if let Some(npc) = self.npcs.get_mut(&id) {
                    npc.position = position;
                    true
                } else {
                    false
                }
            }
        };
        if moved {
            self.spatial.insert(actor, position);
        }
    }

    pub fn health(&self, actor: ActorId) -> Option<u32> {
        match actor {
            ActorId::Player(id) => self.players.get(&id).map(|p| p.health()),
            ActorId::Npc(id) => self.npcs.get(&id).map(|n| n.health),
        }
    }

    /// Applies damage capped at remaining health; returns the amount
    /// actually applied. Health never goes negative.
    pub fn apply_damage(&mut self, actor: ActorId, raw: u32) -> u32 {
        match actor {
            ActorId::Player(id) => self
                .players
                .get_mut(&id)
                .map(|p| p.hitpoints.drain(raw))
                .unwrap_or(0),
            ActorId::Npc(id) => self
                .npcs
                .get_mut(&id)
                .map(|n| {
                    let applied = raw.min(n.health);
                    n.health -= applied;
                    applied
                })
                .unwrap_or(0),
        }
    }

    pub fn cooldown(&self, actor: ActorId) -> Option<u32> {
        match actor {
            ActorId::Player(id) => self.players.get(&id).map(|p| p.cooldown),
            ActorId::Npc(id) => self.npcs.get(&id).map(|n| n.cooldown),
        }
    }

    pub fn set_cooldown(&mut self, actor: ActorId, ticks: u32) {
        match actor {
            ActorId::Player(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.cooldown = ticks;
                }
            }
            ActorId::Npc(id) => {
                if let Some(npc) = self.npcs.get_mut(&id) {
                    npc.cooldown = ticks;
                }
            }
        }
    }

    pub fn lifecycle(&self, actor: ActorId) -> Option<LifecycleState> {
        match actor {
            ActorId::Player(id) => self.players.get(&id).map(|p| p.lifecycle),
            ActorId::Npc(id) => self.npcs.get(&id).map(|n| n.lifecycle),
        }
    }

    pub fn set_lifecycle(&mut self, actor: ActorId, state: LifecycleState) {
        match actor {
            ActorId::Player(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.lifecycle = state;
                }
            }
            ActorId::Npc(id) => {
                if let Some(npc) = self.npcs.get_mut(&id) {
                    npc.lifecycle = state;
                }
            }
        }
    }

    /// True when the actor exists and is flagged dead.
    pub fn is_dead(&self, actor: ActorId) -> bool {
        self.lifecycle(actor)
            .map(|state| state.is_dead())
            .unwrap_or(false)
    }

    // ========================================================================
    // External mutators (death-processing / respawn pass)
    // ========================================================================

    /// Respawn a dead player: restore health, reset combat fields, move to
    /// the respawn tile. Invoked by the external death-processing pass.
    pub fn respawn_player(&mut self, id: PlayerId, at: Position) {
        if let Some(player) = self.players.get_mut(&id) {
            player.hitpoints.restore();
            player.cooldown = 0;
            player.lifecycle = LifecycleState::Idle;
            player.single_cast_spell = None;
        }
        self.targeting.clear_target(ActorId::Player(id));
        self.set_position(ActorId::Player(id), at);
    }

    /// Respawn a dead NPC at full health on its spawn tile.
    pub fn respawn_npc(&mut self, id: NpcId, at: Position) {
        if let Some(npc) = self.npcs.get_mut(&id) {
            npc.health = npc.max_health;
            npc.cooldown = 0;
            npc.lifecycle = LifecycleState::Idle;
            npc.aggro = None;
        }
        self.targeting.clear_target(ActorId::Npc(id));
        self.set_position(ActorId::Npc(id), at);
    }
}
