//! Tick-driven combat resolution.
//!
//! The engine is the authoritative mutator for health, cooldowns, and the
//! death transition. Each tick runs two phases (players attacking their
//! targets, then NPCs attacking their aggro targets) so neither initiator
//! class is systematically resolved first across ticks' worth of gameplay.
//!
//! Failure semantics: eligibility failures (range, LOS, cooldown, despawned
//! target) are silent skips re-evaluated next tick while the target
//! selection persists; resource exhaustion (no ammo, missing reagents)
//! actively cancels combat intent and notifies the player; attacking an
//! already-dead entity is aborted with no damage. Nothing in
//! this module panics on malformed input; a single bad pair never halts
//! the tick.

use crate::combat::events::{AreaEffect, Notice};
use crate::combat::mode::{CombatMode, resolve_combat_mode};
use crate::env::{CombatEnv, CombatServices, RollContext, compute_seed};
use crate::state::{
    ActorId, AggroState, LifecycleState, NpcId, PlayerId, Position, WorldShard,
};

/// Counters summarizing one tick of combat resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    /// Attacks that executed and applied (possibly zero) damage.
    pub attacks: u32,
    /// Pairs skipped by an eligibility check; re-surfaced next tick.
    pub skipped: u32,
    /// Attacks cancelled by resource exhaustion (intent cleared).
    pub cancelled: u32,
    /// Deaths flagged into the outbox this tick.
    pub deaths: u32,
}

/// Outcome of one attack attempt, internal to the engine.
enum Attempt {
    Executed,
    Skipped,
    Cancelled,
}

/// Combat engine borrowing the shard for one or more ticks.
///
/// The tick is single-threaded: the engine holds `&mut WorldShard` from the
/// first cooldown decrement to the last death flag, so no two attacks can
/// race on a cooldown or a victim's health.
pub struct CombatEngine<'a> {
    shard: &'a mut WorldShard,
}

impl<'a> CombatEngine<'a> {
    pub fn new(shard: &'a mut WorldShard) -> Self {
        Self { shard }
    }

    /// Runs one full tick of combat: advances the tick counter, clears the
    /// previous tick's death records (the death-processing pass must have
    /// drained them), then resolves the player phase and the NPC phase.
    ///
    /// Movement has already settled positions for this tick; combat only
    /// reads them.
    pub fn run_tick(&mut self, env: &CombatEnv<'_>, services: &mut CombatServices<'_>) -> TickReport {
        self.shard.tick.advance();
        self.shard.deaths.clear();

        let mut report = TickReport::default();
        self.player_phase(env, services, &mut report);
        self.npc_phase(env, services, &mut report);
        report
    }

    // ========================================================================
    // Phase: players attacking NPCs / players
    // ========================================================================

    fn player_phase(
        &mut self,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
        report: &mut TickReport,
    ) {
        // Cooldowns tick down for every player unconditionally, so they do
        // not freeze when a target is lost.
        for id in self.shard.player_ids() {
            if let Some(player) = self.shard.player_mut(id) {
                player.cooldown = player.cooldown.saturating_sub(1);
            }
        }

        for (attacker, target) in self.shard.targeting.players_targeting_npcs() {
            let outcome =
                self.try_player_attack(attacker, ActorId::Npc(target), env, services);
            tally(report, outcome);
        }
        for (attacker, target) in self.shard.targeting.players_targeting_players() {
            let outcome =
                self.try_player_attack(attacker, ActorId::Player(target), env, services);
            tally(report, outcome);
        }
        report.deaths = self.shard.deaths.len() as u32;
    }

    /// Eligibility pass for one (player, target) pair. Every failed check
    /// is a silent skip; the pair persists and is re-evaluated next tick.
    fn try_player_attack(
        &mut self,
        attacker: PlayerId,
        target: ActorId,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
    ) -> Attempt {
        let Some(player) = self.shard.player(attacker) else {
            return Attempt::Skipped;
        };
        // Having a target is not enough; the engage transition must have
        // put the player in a combat submode.
        if !player.lifecycle.is_combat() {
            return Attempt::Skipped;
        }
        if player.cooldown > 0 {
            return Attempt::Skipped;
        }
        let attacker_pos = player.position;
        let mode = resolve_combat_mode(player);

        // Likely despawned; the stale pair dissolves on its own.
        let Some(target_pos) = self.shard.position(target) else {
            return Attempt::Skipped;
        };
        if self.shard.is_dead(target) {
            return Attempt::Skipped;
        }

        if !self.mode_reaches(&mode, attacker_pos, target_pos, env) {
            return Attempt::Skipped;
        }

        if let ActorId::Player(defender) = target {
            if !self.pvp_legal(attacker, defender, env) {
                return Attempt::Skipped;
            }
        }

        self.execute_player_attack(attacker, target, mode, env, services)
    }

    /// Range and line-of-sight gate for a resolved mode. Melee requires
    /// Chebyshev adjacency; ranged/magic use their configured range and a
    /// LOS check that fails open when no LOS collaborator is wired.
    fn mode_reaches(
        &self,
        mode: &CombatMode,
        from: Position,
        to: Position,
        env: &CombatEnv<'_>,
    ) -> bool {
        if !from.same_level(&to) {
            return false;
        }
        let range = match mode {
            CombatMode::Melee => 1,
            CombatMode::Ranged { range } => *range,
            CombatMode::Magic { spell, .. } => {
                let Ok(spells) = env.spells() else {
                    return false;
                };
                match spells.spell(*spell) {
                    Some(definition) => definition.range,
                    // Unknown spell id: malformed input degrades to a skip.
                    None => return false,
                }
            }
        };
        let distance = from.chebyshev(&to);
        if distance == 0 || distance > range {
            return false;
        }
        match mode {
            CombatMode::Melee => true,
            _ => env.has_los(from, to),
        }
    }

    /// Wilderness PvP rule: both combatants stand in wilderness, neither in
    /// a safe zone, and the combat-level gap fits within the shallower
    /// side's depth. No region oracle means no wilderness anywhere.
    fn pvp_legal(&self, a: PlayerId, b: PlayerId, env: &CombatEnv<'_>) -> bool {
        let Ok(regions) = env.regions() else {
            return false;
        };
        let (Some(pa), Some(pb)) = (self.shard.player(a), self.shard.player(b)) else {
            return false;
        };
        if regions.flags(pa.position).contains(crate::env::RegionFlags::SAFE_ZONE)
            || regions.flags(pb.position).contains(crate::env::RegionFlags::SAFE_ZONE)
        {
            return false;
        }
        let (Some(depth_a), Some(depth_b)) = (
            regions.wilderness_depth(pa.position),
            regions.wilderness_depth(pb.position),
        ) else {
            return false;
        };
        let gap = pa.combat_level.abs_diff(pb.combat_level);
        gap <= depth_a.min(depth_b)
    }

    // ========================================================================
    // Execute-attack pipeline (player attacker)
    // ========================================================================

    fn execute_player_attack(
        &mut self,
        attacker: PlayerId,
        target: ActorId,
        mode: CombatMode,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
    ) -> Attempt {
        let attacker_id = ActorId::Player(attacker);

        // 1. Defensive abort: a pair involving a dead side deals no damage.
        if self.shard.is_dead(attacker_id) || self.shard.is_dead(target) {
            return Attempt::Skipped;
        }

        // 2. Raw damage by mode; resource exhaustion resolves here.
        let (raw, mode) = match self.roll_player_damage(attacker, target, mode, env, services, true)
        {
            DamageRoll::Raw { raw, mode } => (raw, mode),
            DamageRoll::Skip => return Attempt::Skipped,
            DamageRoll::Cancelled => return Attempt::Cancelled,
        };

        let target_pos = match self.shard.position(target) {
            Some(pos) => pos,
            None => return Attempt::Skipped,
        };
        let attacker_pos = match self.shard.position(attacker_id) {
            Some(pos) => pos,
            None => return Attempt::Skipped,
        };

        // 3. Cap against remaining health; health never goes negative.
        let actual = raw.min(self.shard.health(target).unwrap_or(0));

        // 4. Fire-and-forget visuals to nearby observers.
        match &mode {
            CombatMode::Magic { spell, .. } => {
                services
                    .events
                    .broadcast(attacker_pos, AreaEffect::SpellCast { caster: attacker, spell: *spell });
            }
            CombatMode::Ranged { .. } => {
                services.events.broadcast(
                    attacker_pos,
                    AreaEffect::Projectile {
                        from: attacker_pos,
                        to: target_pos,
                    },
                );
            }
            CombatMode::Melee => {}
        }
        services
            .events
            .broadcast(target_pos, AreaEffect::HitSplat { target, amount: actual });

        // 5. Apply damage.
        self.shard.apply_damage(target, actual);

        // 6. Ranged ammunition wear, independent of hit outcome.
        if matches!(mode, CombatMode::Ranged { .. }) {
            self.consume_ammo(attacker, target_pos, env, services);
        }

        // 7. Damage ledger feeds kill credit; player attackers only.
        self.shard.ledger.record(target, attacker_id, actual);

        // 8. Defender may adopt the attacker.
        self.auto_retaliate(target, attacker_id);

        // 9. Death check.
        let (target_died, killer) = self.flag_death_if_killed(target, attacker_id);

        // 10. Experience by combat mode and style setting.
        if let Some(player) = self.shard.player(attacker) {
            services
                .experience
                .grant(attacker, mode.discipline(), player.attack_style, actual);
        }

        // 11. Cooldown reset; a consumed single cast re-resolves the
        //     attacker's combat state from the (possibly changed) mode.
        if let Ok(formulas) = env.formulas() {
            self.shard
                .set_cooldown(attacker_id, formulas.attack_speed(attacker_id));
        }
        if let CombatMode::Magic { single_cast: true, .. } = mode {
            if let Some(player) = self.shard.player_mut(attacker) {
                player.single_cast_spell = None;
                if !player.lifecycle.is_dead() {
                    player.lifecycle = LifecycleState::for_mode(&resolve_combat_mode(player));
                }
            }
        }

        // 12. Quick-finish rule: an NPC kill resets the credited killer's
        //     cooldown to 1 tick. Configurable gameplay feel, not invariant.
        if target_died
            && target.is_npc()
            && self.shard.config().quick_finish_cooldown
        {
            if let Some(killer) = killer {
                self.shard.set_cooldown(killer, 1);
            }
        }

        Attempt::Executed
    }

    /// Mode-specific raw damage. Magic failures cancel the cast (loud for a
    /// single cast, silent for autocast) and re-resolve the mode exactly
    /// once; ranged without ammunition is a failed attempt that cancels
    /// combat intent outright.
    fn roll_player_damage(
        &mut self,
        attacker: PlayerId,
        target: ActorId,
        mode: CombatMode,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
        allow_reresolve: bool,
    ) -> DamageRoll {
        let attacker_id = ActorId::Player(attacker);
        let roll_seed = compute_seed(self.shard.seed, self.shard.tick, attacker_id, RollContext::Damage);
        let Ok(rng) = env.rng() else {
            return DamageRoll::Skip;
        };
        let Ok(formulas) = env.formulas() else {
            return DamageRoll::Skip;
        };
        let roll = rng.next_u32(roll_seed);

        match mode {
            CombatMode::Melee => DamageRoll::Raw {
                raw: formulas.melee_damage(attacker, target, roll),
                mode,
            },
            CombatMode::Ranged { .. } => {
                if services.equipment.equipped_ammo(attacker).is_none() {
                    // User-correctable, not transient: cancel the intent and
                    // tell the player instead of retrying forever.
                    self.shard.targeting.clear_target(attacker_id);
                    if let Some(player) = self.shard.player_mut(attacker) {
                        player.lifecycle = LifecycleState::Idle;
                    }
                    services.events.notify(attacker, Notice::OutOfAmmo);
                    return DamageRoll::Cancelled;
                }
                DamageRoll::Raw {
                    raw: formulas.ranged_damage(attacker, target, roll),
                    mode,
                }
            }
            CombatMode::Magic { spell, single_cast } => {
                let Ok(spells) = env.spells() else {
                    return DamageRoll::Skip;
                };
                let Some(definition) = spells.spell(spell) else {
                    return DamageRoll::Skip;
                };
                let waived = self
                    .shard
                    .player(attacker)
                    .and_then(|p| p.weapon.staff_reagent);
                if services
                    .equipment
                    .consume_reagents(attacker, &definition.reagents, waived)
                {
                    return DamageRoll::Raw {
                        raw: formulas.magic_damage(attacker, spell, target, roll),
                        mode,
                    };
                }

                // Cancellation completes before the idempotent re-resolution.
                if let Some(player) = self.shard.player_mut(attacker) {
                    if single_cast {
                        player.single_cast_spell = None;
                    } else {
                        player.autocast_spell = None;
                    }
                }
                if single_cast {
                    services.events.notify(attacker, Notice::OutOfReagents { spell });
                }
                if !allow_reresolve {
                    return DamageRoll::Skip;
                }
                let Some(player) = self.shard.player(attacker) else {
                    return DamageRoll::Skip;
                };
                let new_mode = resolve_combat_mode(player);
                let attacker_pos = player.position;
                if let Some(player) = self.shard.player_mut(attacker) {
                    if !player.lifecycle.is_dead() {
                        player.lifecycle = LifecycleState::for_mode(&new_mode);
                    }
                }
                // The original eligibility gate ran for the cancelled mode;
                // the replacement must pass its own reach check.
                let Some(target_pos) = self.shard.position(target) else {
                    return DamageRoll::Skip;
                };
                if !self.mode_reaches(&new_mode, attacker_pos, target_pos, env) {
                    return DamageRoll::Skip;
                }
                self.roll_player_damage(attacker, target, new_mode, env, services, false)
            }
        }
    }

    /// Probabilistic ammunition wear after a shot: the unit may survive, be
    /// consumed, or land on the target tile as a recoverable ground item.
    fn consume_ammo(
        &mut self,
        attacker: PlayerId,
        target_pos: Position,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
    ) {
        let Ok(rng) = env.rng() else {
            return;
        };
        let attacker_id = ActorId::Player(attacker);
        let consume_seed =
            compute_seed(self.shard.seed, self.shard.tick, attacker_id, RollContext::AmmoConsume);
        if rng.roll_d100(consume_seed) > self.shard.config().ammo_consume_chance {
            return;
        }
        let Some(item) = services.equipment.consume_ammo(attacker) else {
            return;
        };
        let recover_seed =
            compute_seed(self.shard.seed, self.shard.tick, attacker_id, RollContext::AmmoRecover);
        if rng.roll_d100(recover_seed) <= self.shard.config().ammo_recover_chance {
            services.events.broadcast(
                target_pos,
                AreaEffect::GroundDrop {
                    item,
                    position: target_pos,
                },
            );
        }
    }

    /// Auto-retaliation: a freshly-attacked defender with no current target
    /// adopts the aggressor, converging both sides into combat without an
    /// extra pass. A dropped aggro marker only suppresses detection-based
    /// re-aggro; taking damage overrides it.
    fn auto_retaliate(&mut self, defender: ActorId, aggressor: ActorId) {
        match defender {
            ActorId::Npc(id) => {
                let grace = self.shard.config().retaliation_grace_ticks;
                let Some(npc) = self.shard.npc_mut(id) else {
                    return;
                };
                if npc.live_aggro().is_some() || !npc.is_alive() {
                    return;
                }
                npc.aggro = Some(AggroState::new(aggressor));
                // Grace before striking back rides the cooldown.
                npc.cooldown = npc.cooldown.max(grace);
                npc.lifecycle = LifecycleState::MeleeCombat;
                self.shard.targeting.set_target(defender, aggressor.into());
            }
            ActorId::Player(id) => {
                if self.shard.targeting.target_of(defender).is_some() {
                    return;
                }
                let Some(player) = self.shard.player(id) else {
                    return;
                };
                if !player.auto_retaliate || !player.is_alive() {
                    return;
                }
                let mode = resolve_combat_mode(player);
                if let Some(player) = self.shard.player_mut(id) {
                    player.lifecycle = LifecycleState::for_mode(&mode);
                }
                self.shard.targeting.set_target(defender, aggressor.into());
            }
        }
    }

    /// Flags the victim dying if its health reached zero: kill credit goes
    /// to the top ledger contributor (fallback: the immediate attacker),
    /// the record enters the outbox at most once per tick, the victim
    /// transitions to Dead, and a dead player immediately loses all NPC
    /// aggro so nothing keeps attacking from the grave within the tick.
    fn flag_death_if_killed(
        &mut self,
        victim: ActorId,
        attacker: ActorId,
    ) -> (bool, Option<ActorId>) {
        if self.shard.health(victim) != Some(0) || self.shard.is_dead(victim) {
            return (false, None);
        }
        let killer = self
            .shard
            .ledger
            .top_contributor(victim)
            .or(Some(attacker));
        if !self.shard.deaths.push(victim, killer) {
            return (false, killer);
        }
        self.shard.set_lifecycle(victim, LifecycleState::Dead);
        self.shard.ledger.clear_victim(victim);
        if let ActorId::Player(player) = victim {
            let released = self.shard.targeting.clear_all_npcs_targeting_player(player);
            for npc in released {
                if let Some(state) = self.shard.npc_mut(npc) {
                    state.aggro = None;
                }
            }
        }
        (true, killer)
    }

    // ========================================================================
    // Phase: NPCs attacking their aggro targets
    // ========================================================================

    fn npc_phase(
        &mut self,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
        report: &mut TickReport,
    ) {
        for id in self.shard.npc_ids() {
            if let Some(npc) = self.shard.npc_mut(id) {
                npc.cooldown = npc.cooldown.saturating_sub(1);
            }
        }

        for id in self.shard.npc_ids() {
            let Some(npc) = self.shard.npc(id) else {
                continue;
            };
            // No aggro target (or a dropped one) means no attack this tick.
            let Some(target) = npc.live_aggro() else {
                continue;
            };
            let outcome = self.try_npc_attack(id, target, env, services);
            tally(report, outcome);
        }
        report.deaths = self.shard.deaths.len() as u32;
    }

    fn try_npc_attack(
        &mut self,
        attacker: NpcId,
        target: ActorId,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
    ) -> Attempt {
        let Some(npc) = self.shard.npc(attacker) else {
            return Attempt::Skipped;
        };
        if !npc.is_alive() || npc.cooldown > 0 {
            return Attempt::Skipped;
        }
        let attacker_pos = npc.position;
        let reach = npc.attack_range.max(1);

        let Some(target_pos) = self.shard.position(target) else {
            return Attempt::Skipped;
        };
        if self.shard.is_dead(target) {
            return Attempt::Skipped;
        }
        if !attacker_pos.same_level(&target_pos) {
            return Attempt::Skipped;
        }
        let distance = attacker_pos.chebyshev(&target_pos);
        if distance == 0 || distance > reach {
            return Attempt::Skipped;
        }
        // Reaching past adjacency needs sight of the target.
        if reach > 1 && !env.has_los(attacker_pos, target_pos) {
            return Attempt::Skipped;
        }

        self.execute_npc_attack(attacker, target, target_pos, env, services)
    }

    fn execute_npc_attack(
        &mut self,
        attacker: NpcId,
        target: ActorId,
        target_pos: Position,
        env: &CombatEnv<'_>,
        services: &mut CombatServices<'_>,
    ) -> Attempt {
        let attacker_id = ActorId::Npc(attacker);
        if self.shard.is_dead(attacker_id) || self.shard.is_dead(target) {
            return Attempt::Skipped;
        }
        let Ok(formulas) = env.formulas() else {
            return Attempt::Skipped;
        };
        let Ok(rng) = env.rng() else {
            return Attempt::Skipped;
        };

        let roll_seed =
            compute_seed(self.shard.seed, self.shard.tick, attacker_id, RollContext::Damage);
        let raw = formulas.npc_damage(attacker, target, rng.next_u32(roll_seed));
        let actual = raw.min(self.shard.health(target).unwrap_or(0));

        services
            .events
            .broadcast(target_pos, AreaEffect::HitSplat { target, amount: actual });
        self.shard.apply_damage(target, actual);

        // NPC damage earns no kill credit; the ledger tracks players only.
        self.auto_retaliate(target, attacker_id);
        let (target_died, killer) = self.flag_death_if_killed(target, attacker_id);

        self.shard
            .set_cooldown(attacker_id, formulas.attack_speed(attacker_id));

        if target_died
            && target.is_npc()
            && self.shard.config().quick_finish_cooldown
        {
            if let Some(killer) = killer {
                self.shard.set_cooldown(killer, 1);
            }
        }

        Attempt::Executed
    }
}

enum DamageRoll {
    Raw { raw: u32, mode: CombatMode },
    Skip,
    Cancelled,
}

fn tally(report: &mut TickReport, outcome: Attempt) {
    match outcome {
        Attempt::Executed => report.attacks += 1,
        Attempt::Skipped => report.skipped += 1,
        Attempt::Cancelled => report.cancelled += 1,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::combat::Discipline;
    use crate::config::CombatConfig;
    use crate::env::{
        EquipmentService, EventSink, ExperienceService, FormulaOracle, LosOracle, PcgRng, Reagent,
        RegionFlags, RegionOracle, SpellDefinition, SpellOracle,
    };
    use crate::state::{
        AttackStyle, ItemId, NpcState, PlayerState, SpellId, WeaponClass,
    };
    use crate::targeting::TargetRef;

    // ====================================================================
    // Test collaborators
    // ====================================================================

    struct FixedFormulas {
        melee: u32,
        ranged: u32,
        magic: u32,
        npc: u32,
        speed: u32,
    }

    impl FixedFormulas {
        fn new(damage: u32, speed: u32) -> Self {
            Self {
                melee: damage,
                ranged: damage,
                magic: damage,
                npc: damage,
                speed,
            }
        }
    }

    impl FormulaOracle for FixedFormulas {
        fn melee_damage(&self, _: PlayerId, _: ActorId, _: u32) -> u32 {
            self.melee
        }
        fn ranged_damage(&self, _: PlayerId, _: ActorId, _: u32) -> u32 {
            self.ranged
        }
        fn magic_damage(&self, _: PlayerId, _: SpellId, _: ActorId, _: u32) -> u32 {
            self.magic
        }
        fn npc_damage(&self, _: NpcId, _: ActorId, _: u32) -> u32 {
            self.npc
        }
        fn attack_speed(&self, _: ActorId) -> u32 {
            self.speed
        }
    }

    #[derive(Default)]
    struct TestSpells(HashMap<SpellId, SpellDefinition>);

    impl TestSpells {
        fn with(spell: SpellDefinition) -> Self {
            let mut map = HashMap::new();
            map.insert(spell.id, spell);
            Self(map)
        }
    }

    impl SpellOracle for TestSpells {
        fn spell(&self, id: SpellId) -> Option<SpellDefinition> {
            self.0.get(&id).cloned()
        }
    }

    /// Wilderness everywhere, uniform depth.
    struct Wilderness {
        depth: u32,
    }

    impl RegionOracle for Wilderness {
        fn flags(&self, _: Position) -> RegionFlags {
            RegionFlags::WILDERNESS
        }
        fn wilderness_depth(&self, _: Position) -> Option<u32> {
            Some(self.depth)
        }
    }

    /// No PvP-legal tiles at all.
    struct NoWilderness;

    impl RegionOracle for NoWilderness {
        fn flags(&self, _: Position) -> RegionFlags {
            RegionFlags::empty()
        }
        fn wilderness_depth(&self, _: Position) -> Option<u32> {
            None
        }
    }

    struct BlockedLos;

    impl LosOracle for BlockedLos {
        fn has_los(&self, _: Position, _: Position) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct TestEquipment {
        ammo: Vec<ItemId>,
        reagents: HashMap<ItemId, u32>,
    }

    impl EquipmentService for TestEquipment {
        fn equipped_ammo(&self, _: PlayerId) -> Option<ItemId> {
            self.ammo.last().copied()
        }
        fn consume_ammo(&mut self, _: PlayerId) -> Option<ItemId> {
            self.ammo.pop()
        }
        fn consume_reagents(
            &mut self,
            _: PlayerId,
            recipe: &[Reagent],
            waived: Option<ItemId>,
        ) -> bool {
            let needed: Vec<&Reagent> = recipe
                .iter()
                .filter(|reagent| Some(reagent.item) != waived)
                .collect();
            let available = needed.iter().all(|reagent| {
                self.reagents.get(&reagent.item).copied().unwrap_or(0) >= reagent.amount
            });
            if !available {
                return false;
            }
            for reagent in needed {
                *self.reagents.get_mut(&reagent.item).unwrap() -= reagent.amount;
            }
            true
        }
    }

    #[derive(Default)]
    struct TestXp {
        grants: Vec<(PlayerId, Discipline, AttackStyle, u32)>,
    }

    impl ExperienceService for TestXp {
        fn grant(
            &mut self,
            player: PlayerId,
            discipline: Discipline,
            style: AttackStyle,
            damage: u32,
        ) {
            self.grants.push((player, discipline, style, damage));
        }
    }

    #[derive(Default)]
    struct TestSink {
        notices: Vec<(PlayerId, Notice)>,
        effects: Vec<(Position, AreaEffect)>,
    }

    impl EventSink for TestSink {
        fn notify(&mut self, player: PlayerId, notice: Notice) {
            self.notices.push((player, notice));
        }
        fn broadcast(&mut self, origin: Position, effect: AreaEffect) {
            self.effects.push((origin, effect));
        }
    }

    // ====================================================================
    // Fixture helpers
    // ====================================================================

    const RNG: PcgRng = PcgRng;

    fn shard_with(config: CombatConfig) -> WorldShard {
        WorldShard::new(7, config)
    }

    fn no_quick_finish() -> CombatConfig {
        CombatConfig {
            quick_finish_cooldown: false,
            ..CombatConfig::default()
        }
    }

    fn melee_player(id: u32, pos: Position) -> PlayerState {
        let mut player = PlayerState::new(PlayerId(id), pos, 10, 10);
        player.lifecycle = LifecycleState::MeleeCombat;
        player
    }

    fn target_npc(shard: &mut WorldShard, attacker: PlayerId, npc: NpcId) {
        shard
            .targeting
            .set_target(attacker.into(), TargetRef::npc(npc));
    }

    fn collaborators() -> (TestEquipment, TestXp, TestSink) {
        (
            TestEquipment::default(),
            TestXp::default(),
            TestSink::default(),
        )
    }

    fn run_tick(
        shard: &mut WorldShard,
        env: &CombatEnv<'_>,
        equipment: &mut TestEquipment,
        xp: &mut TestXp,
        sink: &mut TestSink,
    ) -> TickReport {
        let mut services = CombatServices::new(equipment, xp, sink);
        CombatEngine::new(shard).run_tick(env, &mut services)
    }

    // ====================================================================
    // Scenarios
    // ====================================================================

    #[test]
    fn melee_kill_flags_death_with_credit() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 5, 5)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 6, 5), 7));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(10, 4);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 1);
        assert_eq!(report.deaths, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(0));
        assert_eq!(
            shard.lifecycle(NpcId(1).into()),
            Some(LifecycleState::Dead)
        );
        assert_eq!(
            shard.deaths.dying_npcs_with_killers(),
            vec![(NpcId(1), Some(ActorId::Player(PlayerId(1))))]
        );
        // Quick-finish disabled: cooldown is the attack speed.
        assert_eq!(shard.cooldown(PlayerId(1).into()), Some(4));
        // Damage splat capped at remaining health.
        assert!(sink.effects.iter().any(|(_, effect)| matches!(
            effect,
            AreaEffect::HitSplat { amount: 7, .. }
        )));
    }

    #[test]
    fn quick_finish_resets_killer_cooldown_on_npc_death() {
        let mut shard = shard_with(CombatConfig::default());
        shard.spawn_player(melee_player(1, Position::new(0, 5, 5)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 6, 5), 7));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(10, 4);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(shard.cooldown(PlayerId(1).into()), Some(1));
    }

    #[test]
    fn ranged_without_ammo_cancels_intent() {
        let mut shard = shard_with(no_quick_finish());
        let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10);
        archer.weapon.class = WeaponClass::Ranged { range: 7 };
        archer.lifecycle = LifecycleState::RangeCombat;
        shard.spawn_player(archer);
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 9));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.cancelled, 1);
        assert_eq!(report.attacks, 0);
        assert_eq!(shard.health(NpcId(1).into()), Some(9));
        assert_eq!(shard.targeting.target_of(PlayerId(1).into()), None);
        assert_eq!(
            shard.lifecycle(PlayerId(1).into()),
            Some(LifecycleState::Idle)
        );
        assert_eq!(sink.notices, vec![(PlayerId(1), Notice::OutOfAmmo)]);
    }

    #[test]
    fn out_of_range_melee_pair_persists() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 0, 0)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 9));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        for _ in 0..3 {
            let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
            assert_eq!(report.skipped, 1);
            assert_eq!(report.attacks, 0);
        }
        // Pair survives to be re-checked; nothing changed.
        assert_eq!(
            shard.targeting.target_of(PlayerId(1).into()),
            Some(TargetRef::npc(NpcId(1)))
        );
        assert_eq!(shard.health(NpcId(1).into()), Some(9));
        assert_eq!(
            shard.lifecycle(PlayerId(1).into()),
            Some(LifecycleState::MeleeCombat)
        );
    }

    #[test]
    fn pvp_outside_wilderness_never_executes() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 0, 0)));
        shard.spawn_player(melee_player(2, Position::new(0, 1, 0)));
        shard
            .targeting
            .set_target(PlayerId(1).into(), TargetRef::player(PlayerId(2)));
        shard
            .targeting
            .set_target(PlayerId(2).into(), TargetRef::player(PlayerId(1)));

        let formulas = FixedFormulas::new(5, 1);
        let regions = NoWilderness;
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_regions(&regions)
            .with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        for _ in 0..5 {
            let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
            assert_eq!(report.attacks, 0);
        }
        assert_eq!(shard.health(PlayerId(1).into()), Some(10));
        assert_eq!(shard.health(PlayerId(2).into()), Some(10));
    }

    #[test]
    fn pvp_level_gap_bounded_by_wilderness_depth() {
        let attack_with_depth = |depth: u32| {
            let mut shard = shard_with(no_quick_finish());
            let mut a = melee_player(1, Position::new(0, 0, 0));
            a.combat_level = 10;
            let mut b = melee_player(2, Position::new(0, 1, 0));
            b.combat_level = 20;
            shard.spawn_player(a);
            shard.spawn_player(b);
            shard
                .targeting
                .set_target(PlayerId(1).into(), TargetRef::player(PlayerId(2)));

            let formulas = FixedFormulas::new(3, 2);
            let regions = Wilderness { depth };
            let env = CombatEnv::empty()
                .with_formulas(&formulas)
                .with_regions(&regions)
                .with_rng(&RNG);
            let (mut eq, mut xp, mut sink) = collaborators();
            run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink).attacks
        };

        assert_eq!(attack_with_depth(5), 0); // gap 10 > depth 5
        assert_eq!(attack_with_depth(15), 1); // gap 10 <= depth 15
    }

    #[test]
    fn cooldown_decrements_exactly_once_per_tick() {
        let mut shard = shard_with(no_quick_finish());
        let mut idle = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10);
        idle.cooldown = 3;
        shard.spawn_player(idle);
        let mut npc = NpcState::new(NpcId(1), 0, Position::new(0, 9, 9), 5);
        npc.cooldown = 2;
        shard.spawn_npc(npc);

        let formulas = FixedFormulas::new(1, 1);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        assert_eq!(shard.cooldown(PlayerId(1).into()), Some(2));
        assert_eq!(shard.cooldown(NpcId(1).into()), Some(1));

        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        // Floored at zero, never wraps.
        assert_eq!(shard.cooldown(PlayerId(1).into()), Some(0));
        assert_eq!(shard.cooldown(NpcId(1).into()), Some(0));
    }

    #[test]
    fn target_without_combat_state_never_deals_damage() {
        let mut shard = shard_with(no_quick_finish());
        // Adjacent, targeted, cooldown zero, but still Idle.
        shard.spawn_player(PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 9));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 1);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(9));
    }

    #[test]
    fn npc_auto_retaliates_after_grace() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 0, 0)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 50));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(2, 10);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        // Tick 1: player strikes, NPC adopts attacker with grace delay.
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        let npc = shard.npc(NpcId(1)).unwrap();
        assert_eq!(npc.live_aggro(), Some(ActorId::Player(PlayerId(1))));
        assert_eq!(npc.lifecycle, LifecycleState::MeleeCombat);
        assert_eq!(
            shard.targeting.target_of(NpcId(1).into()),
            Some(TargetRef::player(PlayerId(1)))
        );
        assert_eq!(shard.health(PlayerId(1).into()), Some(10));

        // Grace elapses; the NPC strikes back.
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        assert_eq!(shard.health(PlayerId(1).into()), Some(8));
    }

    #[test]
    fn damage_overrides_a_dropped_aggro_marker() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 0, 0)));
        let mut npc = NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 50);
        // The NPC remembers a target that walked out of detection range.
        npc.aggro = Some(AggroState {
            target: ActorId::Player(PlayerId(2)),
            dropped: true,
        });
        shard.spawn_npc(npc);
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(2, 10);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        // Tick 1: the hit replaces the stale marker with live aggro.
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        let npc = shard.npc(NpcId(1)).unwrap();
        assert_eq!(npc.live_aggro(), Some(ActorId::Player(PlayerId(1))));
        assert_eq!(npc.lifecycle, LifecycleState::MeleeCombat);

        // Grace elapses; the NPC strikes its actual attacker.
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        assert_eq!(shard.health(PlayerId(1).into()), Some(8));
    }

    #[test]
    fn attacked_player_with_auto_retaliate_adopts_attacker() {
        let mut shard = shard_with(no_quick_finish());
        let defender = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 30, 10);
        assert!(defender.auto_retaliate);
        shard.spawn_player(defender);
        let mut npc = NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 50);
        npc.aggro = Some(AggroState::new(ActorId::Player(PlayerId(1))));
        shard.spawn_npc(npc);

        let formulas = FixedFormulas::new(2, 10);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();

        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);
        assert_eq!(shard.health(PlayerId(1).into()), Some(28));
        assert_eq!(
            shard.targeting.target_of(PlayerId(1).into()),
            Some(TargetRef::npc(NpcId(1)))
        );
        assert_eq!(
            shard.lifecycle(PlayerId(1).into()),
            Some(LifecycleState::MeleeCombat)
        );
    }

    #[test]
    fn dead_player_loses_all_npc_aggro_same_tick() {
        let mut shard = shard_with(no_quick_finish());
        let mut victim = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 3, 10);
        victim.auto_retaliate = false;
        shard.spawn_player(victim);
        for raw in [1u32, 2] {
            let mut npc = NpcState::new(NpcId(raw), 0, Position::new(0, 1, raw as i32 - 1), 50);
            npc.aggro = Some(AggroState::new(ActorId::Player(PlayerId(1))));
            shard.spawn_npc(npc);
            shard
                .targeting
                .set_target(NpcId(raw).into(), TargetRef::player(PlayerId(1)));
        }

        // Each NPC hits for 5; the first strike is lethal.
        let formulas = FixedFormulas::new(5, 4);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.deaths, 1);
        assert_eq!(
            shard.deaths.dying_players(),
            vec![(PlayerId(1), Some(ActorId::Npc(NpcId(1))))]
        );
        // The second NPC never attacked from the grave.
        assert_eq!(report.attacks, 1);
        assert_eq!(shard.npc(NpcId(2)).unwrap().aggro, None);
        assert_eq!(shard.targeting.target_of(NpcId(2).into()), None);
        assert_eq!(shard.health(PlayerId(1).into()), Some(0));
    }

    #[test]
    fn kill_credit_goes_to_top_ledger_contributor() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(2, Position::new(0, 1, 0)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 0, 0), 5));
        target_npc(&mut shard, PlayerId(2), NpcId(1));
        // Player 1 softened the victim earlier this life.
        shard
            .ledger
            .record(NpcId(1).into(), PlayerId(1).into(), 100);

        let formulas = FixedFormulas::new(10, 4);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(
            shard.deaths.dying_npcs_with_killers(),
            vec![(NpcId(1), Some(ActorId::Player(PlayerId(1))))]
        );
        // Ledger entry dies with the victim.
        assert_eq!(shard.ledger.top_contributor(NpcId(1).into()), None);
    }

    #[test]
    fn single_cast_consumes_reagents_and_reverts_mode() {
        let mut shard = shard_with(no_quick_finish());
        let mut caster = melee_player(1, Position::new(0, 0, 0));
        caster.lifecycle = LifecycleState::MagicCombat;
        caster.single_cast_spell = Some(SpellId(1));
        shard.spawn_player(caster);
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 4, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(6, 5);
        let spells = TestSpells::with(SpellDefinition::new(
            SpellId(1),
            10,
            &[Reagent {
                item: ItemId(100),
                amount: 3,
            }],
        ));
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_spells(&spells)
            .with_rng(&RNG);
        let mut eq = TestEquipment::default();
        eq.reagents.insert(ItemId(100), 3);
        let mut xp = TestXp::default();
        let mut sink = TestSink::default();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(24));
        assert_eq!(eq.reagents[&ItemId(100)], 0);
        let caster = shard.player(PlayerId(1)).unwrap();
        assert_eq!(caster.single_cast_spell, None);
        // Melee weapon: state re-resolves out of MagicCombat.
        assert_eq!(caster.lifecycle, LifecycleState::MeleeCombat);
        assert_eq!(
            xp.grants,
            vec![(PlayerId(1), Discipline::Magic, AttackStyle::Accurate, 6)]
        );
        assert!(sink.effects.iter().any(|(_, effect)| matches!(
            effect,
            AreaEffect::SpellCast { spell: SpellId(1), .. }
        )));
    }

    #[test]
    fn staff_waives_its_reagent() {
        let mut shard = shard_with(no_quick_finish());
        let mut caster = melee_player(1, Position::new(0, 0, 0));
        caster.lifecycle = LifecycleState::MagicCombat;
        caster.single_cast_spell = Some(SpellId(1));
        caster.weapon.staff_reagent = Some(ItemId(100));
        shard.spawn_player(caster);
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 2, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(6, 5);
        let spells = TestSpells::with(SpellDefinition::new(
            SpellId(1),
            10,
            &[Reagent {
                item: ItemId(100),
                amount: 3,
            }],
        ));
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_spells(&spells)
            .with_rng(&RNG);
        // Empty inventory: the staff supplies the only reagent.
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(24));
    }

    #[test]
    fn missing_reagents_cancel_single_cast_with_notice_then_fall_back() {
        let mut shard = shard_with(no_quick_finish());
        let mut caster = melee_player(1, Position::new(0, 0, 0));
        caster.lifecycle = LifecycleState::MagicCombat;
        caster.single_cast_spell = Some(SpellId(1));
        shard.spawn_player(caster);
        // Adjacent, so the re-resolved melee mode reaches.
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(4, 5);
        let spells = TestSpells::with(SpellDefinition::new(
            SpellId(1),
            10,
            &[Reagent {
                item: ItemId(100),
                amount: 3,
            }],
        ));
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_spells(&spells)
            .with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        // The cancelled cast notified; the melee fallback still landed.
        assert_eq!(
            sink.notices,
            vec![(PlayerId(1), Notice::OutOfReagents { spell: SpellId(1) })]
        );
        assert_eq!(report.attacks, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(26));
        let caster = shard.player(PlayerId(1)).unwrap();
        assert_eq!(caster.single_cast_spell, None);
        assert_eq!(caster.lifecycle, LifecycleState::MeleeCombat);
        assert_eq!(
            xp.grants,
            vec![(PlayerId(1), Discipline::Melee, AttackStyle::Accurate, 4)]
        );
    }

    #[test]
    fn missing_reagents_disable_autocast_silently() {
        let mut shard = shard_with(no_quick_finish());
        let mut caster = melee_player(1, Position::new(0, 0, 0));
        caster.lifecycle = LifecycleState::MagicCombat;
        caster.autocast_spell = Some(SpellId(1));
        shard.spawn_player(caster);
        // Too far for the melee fallback; the attempt becomes a skip.
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 5, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(4, 5);
        let spells = TestSpells::with(SpellDefinition::new(
            SpellId(1),
            10,
            &[Reagent {
                item: ItemId(100),
                amount: 3,
            }],
        ));
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_spells(&spells)
            .with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.skipped, 1);
        assert!(sink.notices.is_empty());
        assert_eq!(shard.health(NpcId(1).into()), Some(30));
        assert_eq!(shard.player(PlayerId(1)).unwrap().autocast_spell, None);
    }

    #[test]
    fn ranged_attack_consumes_ammo_and_may_drop_it() {
        let mut shard = shard_with(CombatConfig {
            ammo_consume_chance: 100,
            ammo_recover_chance: 100,
            quick_finish_cooldown: false,
            ..CombatConfig::default()
        });
        let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10);
        archer.weapon.class = WeaponClass::Ranged { range: 7 };
        archer.lifecycle = LifecycleState::RangeCombat;
        shard.spawn_player(archer);
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let mut eq = TestEquipment::default();
        eq.ammo.push(ItemId(200));
        let mut xp = TestXp::default();
        let mut sink = TestSink::default();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(25));
        assert!(eq.ammo.is_empty());
        let target_pos = Position::new(0, 3, 0);
        assert!(sink.effects.contains(&(
            target_pos,
            AreaEffect::GroundDrop {
                item: ItemId(200),
                position: target_pos,
            }
        )));
        assert!(sink.effects.iter().any(|(_, effect)| matches!(
            effect,
            AreaEffect::Projectile { .. }
        )));
        assert_eq!(
            xp.grants,
            vec![(PlayerId(1), Discipline::Ranged, AttackStyle::Accurate, 5)]
        );
    }

    #[test]
    fn ammo_survives_when_consume_roll_fails() {
        let mut shard = shard_with(CombatConfig {
            ammo_consume_chance: 0,
            quick_finish_cooldown: false,
            ..CombatConfig::default()
        });
        let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10);
        archer.weapon.class = WeaponClass::Ranged { range: 7 };
        archer.lifecycle = LifecycleState::RangeCombat;
        shard.spawn_player(archer);
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let mut eq = TestEquipment::default();
        eq.ammo.push(ItemId(200));
        let mut xp = TestXp::default();
        let mut sink = TestSink::default();
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(eq.ammo, vec![ItemId(200)]);
    }

    #[test]
    fn blocked_los_skips_ranged_but_melee_ignores_it() {
        let mut shard = shard_with(no_quick_finish());
        let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 10, 10);
        archer.weapon.class = WeaponClass::Ranged { range: 7 };
        archer.lifecycle = LifecycleState::RangeCombat;
        shard.spawn_player(archer);
        shard.spawn_player(melee_player(2, Position::new(0, 2, 1)));
        shard.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 2, 0), 30));
        target_npc(&mut shard, PlayerId(1), NpcId(1));
        target_npc(&mut shard, PlayerId(2), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let los = BlockedLos;
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_los(&los)
            .with_rng(&RNG);
        let mut eq = TestEquipment::default();
        eq.ammo.push(ItemId(200));
        let mut xp = TestXp::default();
        let mut sink = TestSink::default();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        // Melee landed despite the wall; the archer waits for sight.
        assert_eq!(report.attacks, 1);
        assert_eq!(shard.health(NpcId(1).into()), Some(25));
        assert_eq!(eq.ammo.len(), 1);
    }

    #[test]
    fn attacking_a_dead_target_is_aborted_without_damage() {
        let mut shard = shard_with(no_quick_finish());
        shard.spawn_player(melee_player(1, Position::new(0, 0, 0)));
        let mut corpse = NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 5);
        corpse.lifecycle = LifecycleState::Dead;
        shard.spawn_npc(corpse);
        target_npc(&mut shard, PlayerId(1), NpcId(1));

        let formulas = FixedFormulas::new(5, 3);
        let env = CombatEnv::empty().with_formulas(&formulas).with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        let report = run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(report.attacks, 0);
        assert_eq!(shard.health(NpcId(1).into()), Some(5));
        assert!(shard.deaths.is_empty());
    }

    #[test]
    fn pvp_kill_keeps_attack_speed_cooldown() {
        // Quick-finish applies to NPC deaths only.
        let mut shard = shard_with(CombatConfig::default());
        let a = melee_player(1, Position::new(0, 0, 0));
        let mut b = PlayerState::new(PlayerId(2), Position::new(0, 1, 0), 4, 10);
        b.lifecycle = LifecycleState::MeleeCombat;
        b.auto_retaliate = false;
        shard.spawn_player(a);
        shard.spawn_player(b);
        shard
            .targeting
            .set_target(PlayerId(1).into(), TargetRef::player(PlayerId(2)));

        let formulas = FixedFormulas::new(10, 6);
        let regions = Wilderness { depth: 20 };
        let env = CombatEnv::empty()
            .with_formulas(&formulas)
            .with_regions(&regions)
            .with_rng(&RNG);
        let (mut eq, mut xp, mut sink) = collaborators();
        run_tick(&mut shard, &env, &mut eq, &mut xp, &mut sink);

        assert_eq!(
            shard.deaths.dying_players(),
            vec![(PlayerId(2), Some(ActorId::Player(PlayerId(1))))]
        );
        assert_eq!(shard.cooldown(PlayerId(1).into()), Some(6));
    }
}
