//! Tick loop driver for one world shard.
//!
//! The driver owns the shard state, the oracle bundle, and the mutable
//! services, and advances the combat core once per tick. Everything the
//! tick produces (deaths, area effects, notices, the tick summary) is
//! published on the [`EventBus`] for downstream consumers (death
//! processing, client sessions, metrics).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use world_core::{
    CombatEngine, CombatServices, NpcId, NpcState, PlayerId, PlayerState, TickReport, WorldShard,
};

use crate::config::ShardConfig;
use crate::error::{Result, ShardError};
use crate::events::{EventBus, ShardEvent, Topic};
use crate::oracle::OracleBundle;
use crate::services::{BufferedSink, InMemoryEquipment, XpTracker};

/// Synchronous core of the shard runtime: one instance per shard, driven
/// either manually via [`tick`](Self::tick) or on a wall-clock interval via
/// [`run`](Self::run).
pub struct ShardDriver {
    shard: WorldShard,
    oracles: OracleBundle,
    equipment: InMemoryEquipment,
    experience: XpTracker,
    bus: Arc<EventBus>,
    tick_duration: Duration,
    warned_missing_los: bool,
}

impl ShardDriver {
    pub fn new(config: ShardConfig, oracles: OracleBundle) -> Self {
        Self {
            shard: WorldShard::new(config.seed, config.combat.clone()),
            oracles,
            equipment: InMemoryEquipment::new(),
            experience: XpTracker::new(),
            bus: Arc::new(EventBus::with_capacity(config.event_capacity)),
            tick_duration: config.tick_duration(),
            warned_missing_los: false,
        }
    }

    // ========================================================================
    // Actor lifecycle
    // ========================================================================

    /// Spawns a player and mirrors its combat level into the formula
    /// registry.
    pub fn spawn_player(&mut self, player: PlayerState) {
        self.oracles
            .formulas
            .register_player(player.id, player.combat_level);
        self.shard.spawn_player(player);
    }

    /// Spawns an NPC and mirrors its template into the formula registry.
    pub fn spawn_npc(&mut self, npc: NpcState) {
        self.oracles.formulas.register_npc(npc.id, npc.template);
        self.shard.spawn_npc(npc);
    }

    pub fn despawn_player(&mut self, id: PlayerId) {
        self.shard.despawn_player(id);
        self.oracles.formulas.unregister(id.into());
        self.equipment.clear_player(id);
    }

    pub fn despawn_npc(&mut self, id: NpcId) {
        self.shard.despawn_npc(id);
        self.oracles.formulas.unregister(id.into());
    }

    // ========================================================================
    // Tick loop
    // ========================================================================

    /// Advances the simulation by exactly one tick and publishes everything
    /// it produced.
    pub fn tick(&mut self) -> TickReport {
        let env = self.oracles.as_env();
        if !env.has_los_oracle() && !self.warned_missing_los {
            tracing::warn!("no line-of-sight oracle wired; sight checks fail open");
            self.warned_missing_los = true;
        }

        let mut sink = BufferedSink::new();
        let report = {
            let mut services =
                CombatServices::new(&mut self.equipment, &mut self.experience, &mut sink);
            CombatEngine::new(&mut self.shard).run_tick(&env, &mut services)
        };

        let tick = self.shard.tick;
        for (origin, effect) in sink.effects {
            self.bus.publish(ShardEvent::Effect {
                tick,
                origin,
                effect,
            });
        }
        for (player, notice) in sink.notices {
            self.bus.publish(ShardEvent::Notice {
                tick,
                player,
                notice,
            });
        }
        // The driver is the death-processing pass's doorstep: it drains the
        // outbox so the engine's clear-at-tick-start never discards records.
        for event in self.shard.deaths.drain() {
            tracing::debug!(victim = %event.victim, killer = ?event.killer, "death flagged");
            self.bus.publish(ShardEvent::Death { tick, event });
        }
        self.bus.publish(ShardEvent::TickCompleted { tick, report });

        tracing::trace!(
            tick = tick.0,
            attacks = report.attacks,
            skipped = report.skipped,
            cancelled = report.cancelled,
            deaths = report.deaths,
            "tick resolved"
        );
        report
    }

    /// Runs the tick loop on a wall-clock interval until `shutdown` turns
    /// true (or its sender is dropped).
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(tick_millis = self.tick_duration.as_millis() as u64, "shard driver running");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("shard driver stopped");
    }

    /// Moves the driver onto a background task running [`run`](Self::run).
    /// The handle yields the driver back once `shutdown` fires, so callers
    /// can inspect final state or restart it.
    pub fn spawn(mut self, shutdown: watch::Receiver<bool>) -> DriverHandle {
        DriverHandle {
            handle: tokio::spawn(async move {
                self.run(shutdown).await;
                self
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn shard(&self) -> &WorldShard {
        &self.shard
    }

    /// Direct shard access for systems outside combat (movement, trading).
    pub fn shard_mut(&mut self) -> &mut WorldShard {
        &mut self.shard
    }

    pub fn equipment_mut(&mut self) -> &mut InMemoryEquipment {
        &mut self.equipment
    }

    pub fn experience(&self) -> &XpTracker {
        &self.experience
    }

    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    pub fn subscribe(&self, topic: Topic) -> tokio::sync::broadcast::Receiver<ShardEvent> {
        self.bus.subscribe(topic)
    }
}

/// Handle to a driver task started by [`ShardDriver::spawn`].
pub struct DriverHandle {
    handle: tokio::task::JoinHandle<ShardDriver>,
}

impl DriverHandle {
    /// Waits for the driver task to stop, surfacing a panic or cancellation
    /// of the task as [`ShardError::DriverJoin`].
    pub async fn join(self) -> Result<ShardDriver> {
        self.handle.await.map_err(ShardError::DriverJoin)
    }
}
