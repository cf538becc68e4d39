//! End-to-end combat flow through the shard driver and event bus.

use shard_runtime::{
    CombatFormulas, FormulaTables, OracleBundle, RegionMap, RegionZone, ShardConfig, ShardDriver,
    ShardEvent, Spellbook, TileLos, Topic,
};
use world_core::{
    ActorId, LifecycleState, NpcId, NpcState, PlayerId, PlayerState, Position, RegionFlags,
    TargetRef, WeaponClass,
};

/// RUST_LOG=shard_runtime=trace surfaces driver logs when a scenario fails.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn wilderness_bundle() -> OracleBundle {
    let regions = RegionMap::new(vec![RegionZone {
        level: 0,
        min_x: -100,
        min_y: -100,
        max_x: 100,
        max_y: 100,
        flags: RegionFlags::WILDERNESS,
    }]);
    OracleBundle::new(
        CombatFormulas::new(FormulaTables::default()),
        Spellbook::new(),
        regions,
    )
    .with_los(TileLos::new())
}

fn engaged_melee_player(id: u32, pos: Position, level: u32) -> PlayerState {
    let mut player = PlayerState::new(PlayerId(id), pos, 50, level);
    player.lifecycle = LifecycleState::MeleeCombat;
    player
}

#[tokio::test]
async fn player_kills_npc_and_death_reaches_the_bus() {
    init_tracing();
    let mut driver = ShardDriver::new(ShardConfig::default(), wilderness_bundle());
    let mut deaths = driver.subscribe(Topic::Deaths);

    driver.spawn_player(engaged_melee_player(1, Position::new(0, 0, 0), 70));
    driver.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 1, 0), 3));
    driver
        .shard_mut()
        .targeting
        .set_target(PlayerId(1).into(), TargetRef::npc(NpcId(1)));

    // Damage rolls are uniform over the max hit, so a kill is not tick-exact;
    // the bound is far beyond what the roll distribution needs.
    let mut died = false;
    for _ in 0..2000 {
        driver.tick();
        if !driver.shard().npc(NpcId(1)).unwrap().is_alive() {
            died = true;
            break;
        }
    }
    assert!(died, "npc should die within the tick bound");

    match deaths.recv().await.unwrap() {
        ShardEvent::Death { event, .. } => {
            assert_eq!(event.victim, ActorId::Npc(NpcId(1)));
            assert_eq!(event.killer, Some(ActorId::Player(PlayerId(1))));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn out_of_ammo_notice_reaches_the_bus() {
    init_tracing();
    let mut driver = ShardDriver::new(ShardConfig::default(), wilderness_bundle());
    let mut notices = driver.subscribe(Topic::Notices);

    let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 50, 40);
    archer.weapon.class = WeaponClass::Ranged { range: 7 };
    archer.lifecycle = LifecycleState::RangeCombat;
    driver.spawn_player(archer);
    driver.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 30));
    driver
        .shard_mut()
        .targeting
        .set_target(PlayerId(1).into(), TargetRef::npc(NpcId(1)));

    // No ammunition was ever equipped; the first attempt cancels.
    driver.tick();

    assert!(matches!(
        notices.recv().await.unwrap(),
        ShardEvent::Notice {
            player: PlayerId(1),
            notice: world_core::Notice::OutOfAmmo,
            ..
        }
    ));
    let player = driver.shard().player(PlayerId(1)).unwrap();
    assert_eq!(player.lifecycle, LifecycleState::Idle);
}

#[tokio::test]
async fn equipped_ammo_lets_ranged_attacks_fire() {
    init_tracing();
    let mut driver = ShardDriver::new(ShardConfig::default(), wilderness_bundle());
    let mut effects = driver.subscribe(Topic::Effects);

    let mut archer = PlayerState::new(PlayerId(1), Position::new(0, 0, 0), 50, 40);
    archer.weapon.class = WeaponClass::Ranged { range: 7 };
    archer.lifecycle = LifecycleState::RangeCombat;
    driver.spawn_player(archer);
    driver.spawn_npc(NpcState::new(NpcId(1), 0, Position::new(0, 3, 0), 30));
    driver
        .shard_mut()
        .targeting
        .set_target(PlayerId(1).into(), TargetRef::npc(NpcId(1)));
    driver
        .equipment_mut()
        .equip_ammo(PlayerId(1), world_core::ItemId(882), 100);

    let report = driver.tick();
    assert_eq!(report.attacks, 1);

    // Projectile visual then hit splat, in pipeline order.
    assert!(matches!(
        effects.recv().await.unwrap(),
        ShardEvent::Effect {
            effect: world_core::AreaEffect::Projectile { .. },
            ..
        }
    ));
    assert!(matches!(
        effects.recv().await.unwrap(),
        ShardEvent::Effect {
            effect: world_core::AreaEffect::HitSplat { .. },
            ..
        }
    ));
}

#[tokio::test]
async fn run_loop_ticks_until_shutdown() {
    init_tracing();
    let driver = ShardDriver::new(
        ShardConfig {
            tick_millis: 1,
            ..ShardConfig::default()
        },
        wilderness_bundle(),
    );
    let mut ticks = driver.subscribe(Topic::Ticks);
    let (stop, shutdown) = tokio::sync::watch::channel(false);

    let handle = driver.spawn(shutdown);

    let first = ticks.recv().await.unwrap();
    assert!(matches!(first, ShardEvent::TickCompleted { .. }));

    stop.send(true).unwrap();
    let driver = handle.join().await.unwrap();
    assert!(driver.shard().tick.0 >= 1);
}
