//! Combat integration tests
//!
//! Headless App + явный прогон fixed-тиков (run_fixed_ticks):
//! - FSM гоняет врага за игроком и бьет по cooldown'у
//! - диспетчер урона: capability gating, смерть, лут, победа
//! - respawn, separation, stealth

use bevy::prelude::*;
use wildgrove_simulation::*;

/// Helper: полный combat App
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

/// Helper: спавн игрока (меч 12 урона)
fn spawn_player(app: &mut App, position: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Actor {
                faction_id: PLAYER_FACTION,
            },
            Player,
            Equipped {
                capability: Some(Capability::Sword),
                base_damage: 12,
            },
            Inventory::default(),
            HitRecovery::default(),
            MoveSpeed { speed: 5.0 },
            MovementInput::default(),
        ))
        .id()
}

/// Helper: спавн врага с дефолтным AI
fn spawn_enemy(app: &mut App, position: Vec2, health: u32) -> Entity {
    let entity = app
        .world_mut()
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Actor {
                faction_id: ENEMY_FACTION,
            },
            Health::new(health),
            EnemyState::default(),
            EnemyAiConfig::default(),
            Attacker::default(),
            MoveSpeed::default(),
            Home::new(position),
            MovementInput::default(),
        ))
        .id();
    app.world_mut()
        .resource_mut::<GameDirector>()
        .register_enemy();
    entity
}

/// Helper: число событий типа E с начала прогона
fn count_events<E: Event>(app: &App) -> usize {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).count()
}

fn send_strike(app: &mut App, actor: Entity) {
    app.world_mut()
        .resource_mut::<Events<StrikeCommand>>()
        .send(StrikeCommand { actor });
}

#[test]
fn test_enemy_out_of_detection_stays_idle() {
    let mut app = create_combat_app(1);

    spawn_player(&mut app, Vec2::new(20.0, 0.0)); // далеко за detection 5.0
    let enemy = spawn_enemy(&mut app, Vec2::ZERO, 30);

    run_fixed_ticks(&mut app, 120);

    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Idle)
    );
    // С места не сдвинулся
    let pos = app.world().get::<Transform>(enemy).unwrap().translation;
    assert_eq!(pos, Vec3::ZERO);
    assert_eq!(count_events::<StateChanged>(&app), 0);
}

#[test]
fn test_enemy_chases_then_attacks_then_kills() {
    let mut app = create_combat_app(2);

    let player = spawn_player(&mut app, Vec2::new(4.0, 0.0));
    let enemy = spawn_enemy(&mut app, Vec2::ZERO, 30);

    // Пара секунд: враг должен заметить и догнать
    run_fixed_ticks(&mut app, 180);
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Attacking),
        "enemy should reach attack range of an idle player"
    );

    // Урон уже идет (10 за удар, cooldown 1.2s)
    let hp_mid = app.world().get::<Health>(player).unwrap().current;
    assert!(hp_mid < 100);

    // Игрок стоит столбом — добьет за ~12 секунд
    run_fixed_ticks(&mut app, 900);
    let player_health = app.world().get::<Health>(player).unwrap();
    assert!(player_health.is_dead());
    assert_eq!(player_health.current, 0);
    assert!(app.world().get::<Dead>(player).is_some());

    // Ровно одна смерть
    assert_eq!(count_events::<EntityDied>(&app), 1);
}

#[test]
fn test_attack_cooldown_gating_exact_count() {
    let mut app = create_combat_app(3);
    // Тик 0.1s для удобного счета
    app.insert_resource(Time::<Fixed>::from_seconds(0.1));

    spawn_player(&mut app, Vec2::new(1.0, 0.0)); // уже в attack range 1.2

    app.world_mut().spawn((
        Transform::default(),
        Actor {
            faction_id: ENEMY_FACTION,
        },
        Health::new(30),
        EnemyState::Attacking,
        EnemyAiConfig::default(),
        Attacker {
            base_damage: 1,
            attack_cooldown: 0.5,
            cooldown_timer: 0.0,
        },
        MoveSpeed::default(),
        Home::new(Vec2::ZERO),
        MovementInput::default(),
    ));

    // 20 тиков по 0.1s при cooldown 0.5s: удары на тиках 1,6,11,16
    run_fixed_ticks(&mut app, 20);

    assert_eq!(count_events::<AttackIntent>(&app), 4);
    assert_eq!(count_events::<DamageDealt>(&app), 4);
}

#[test]
fn test_sword_kills_enemy_drops_loot_victory() {
    let mut app = create_combat_app(4);

    let player = spawn_player(&mut app, Vec2::ZERO);
    let enemy = spawn_enemy(&mut app, Vec2::new(0.0, -0.5), 10);
    app.world_mut()
        .entity_mut(enemy)
        .insert(LootTable::new("slime", 2));

    // Взгляд по умолчанию вниз — враг под ударом
    send_strike(&mut app, player);
    run_fixed_ticks(&mut app, 1);

    let enemy_health = app.world().get::<Health>(enemy).unwrap();
    assert!(enemy_health.is_dead());
    assert!(app.world().get::<Dead>(enemy).is_some());
    // FSM мертвого снят
    assert!(app.world().get::<EnemyState>(enemy).is_none());

    assert_eq!(count_events::<EntityDied>(&app), 1);
    assert_eq!(count_events::<VictoryAchieved>(&app), 1);

    // Лут выпал: часть могла сразу попасть в инвентарь подбором
    let mut drop_query = app.world_mut().query::<&LootDrop>();
    let on_ground = drop_query.iter(app.world()).count() as u32;
    let in_inventory = app.world().get::<Inventory>(player).unwrap().count("slime");
    assert_eq!(on_ground + in_inventory, 2);

    // Труп уходит по таймеру (CORPSE_LINGER = 2s)
    run_fixed_ticks(&mut app, 130);
    assert!(app.world().get_entity(enemy).is_err());
}

#[test]
fn test_harvest_requires_exact_tool() {
    let mut app = create_combat_app(5);

    let player = spawn_player(&mut app, Vec2::ZERO);
    app.world_mut().get_mut::<Equipped>(player).unwrap().base_damage = 2;

    let tree = app
        .world_mut()
        .spawn((
            Transform::from_translation(Vec3::new(0.0, -0.6, 0.0)),
            Harvestable::new(Capability::Axe, 5),
            LootTable::new("wood", 3),
        ))
        .id();

    // Меч по дереву: отказ, прочность цела, замах потрачен
    send_strike(&mut app, player);
    run_fixed_ticks(&mut app, 1);

    assert_eq!(count_events::<StrikeRejected>(&app), 1);
    assert_eq!(app.world().get::<Harvestable>(tree).unwrap().durability, 5);
    assert_eq!(count_events::<HarvestableShaken>(&app), 0);

    // Топор: 3 удара по 2 прочности валят дерево
    app.world_mut().get_mut::<Equipped>(player).unwrap().capability = Some(Capability::Axe);
    for _ in 0..3 {
        send_strike(&mut app, player);
        run_fixed_ticks(&mut app, 1);
    }

    assert_eq!(count_events::<HarvestableDepleted>(&app), 1);
    assert!(app.world().get_entity(tree).is_err());

    // Дровосек не ранен и не ранил себя топором
    assert_eq!(app.world().get::<Health>(player).unwrap().current, 100);
}

#[test]
fn test_axe_never_damages_combat_actor() {
    let mut app = create_combat_app(6);

    let player = spawn_player(&mut app, Vec2::ZERO);
    {
        let mut equipped = app.world_mut().get_mut::<Equipped>(player).unwrap();
        equipped.capability = Some(Capability::Axe);
        equipped.base_damage = 50;
    }

    let enemy = spawn_enemy(&mut app, Vec2::new(0.0, -0.5), 30);
    // Обездвиживаем, чтобы враг не уехал из-под замаха
    app.world_mut().get_mut::<MoveSpeed>(enemy).unwrap().speed = 0.0;

    send_strike(&mut app, player);
    run_fixed_ticks(&mut app, 1);

    // Инструмент против боевого актора не проходит
    assert_eq!(app.world().get::<Health>(enemy).unwrap().current, 30);
    assert_eq!(count_events::<DamageDealt>(&app), 0);
}

#[test]
fn test_respawn_revives_at_home_full_health() {
    let mut app = create_combat_app(7);

    let player = spawn_player(&mut app, Vec2::ZERO);
    let enemy = spawn_enemy(&mut app, Vec2::new(0.0, -0.5), 5);
    app.world_mut()
        .entity_mut(enemy)
        .insert(RespawnPolicy { delay: 1.0 });
    app.world_mut().get_mut::<MoveSpeed>(enemy).unwrap().speed = 0.0;

    send_strike(&mut app, player);
    run_fixed_ticks(&mut app, 1);
    assert!(app.world().get::<Health>(enemy).unwrap().is_dead());

    // Возрождаемый враг не приближает победу
    assert_eq!(count_events::<VictoryAchieved>(&app), 0);

    // Убийцу уводим, чтобы свежий FSM не сорвался сразу в погоню
    app.world_mut()
        .get_mut::<Transform>(player)
        .unwrap()
        .translation = Vec3::new(50.0, 0.0, 0.0);

    // 1 секунда delay при 60Hz + запас
    run_fixed_ticks(&mut app, 70);

    let health = app.world().get::<Health>(enemy).unwrap();
    assert!(health.is_alive());
    assert_eq!(health.current, 5);
    assert!(app.world().get::<Dead>(enemy).is_none());
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Idle)
    );
    // Дома
    let pos = app.world().get::<Transform>(enemy).unwrap().translation;
    assert_eq!(pos.truncate(), Vec2::new(0.0, -0.5));
}

#[test]
fn test_separation_spreads_twin_enemies() {
    let mut app = create_combat_app(8);

    spawn_player(&mut app, Vec2::new(4.0, 0.0));
    // Два врага почти в одной точке, цель одна и та же
    let a = spawn_enemy(&mut app, Vec2::new(0.0, 0.05), 30);
    let b = spawn_enemy(&mut app, Vec2::new(0.0, -0.05), 30);

    let initial_gap = 0.1_f32;
    run_fixed_ticks(&mut app, 60);

    let pos_a = app.world().get::<Transform>(a).unwrap().translation;
    let pos_b = app.world().get::<Transform>(b).unwrap().translation;
    let gap = pos_a.truncate().distance(pos_b.truncate());

    // Оба двигаются к игроку, но расходятся поперек
    assert!(
        gap > initial_gap,
        "separation should push twins apart: gap {}",
        gap
    );
    assert!(pos_a.x > 0.5 && pos_b.x > 0.5, "both still chase the target");
}

#[test]
fn test_stealth_halves_detection() {
    let mut app = create_combat_app(9);

    let player = spawn_player(&mut app, Vec2::new(3.0, 0.0));
    app.world_mut().entity_mut(player).insert(Stealthed);
    let enemy = spawn_enemy(&mut app, Vec2::ZERO, 30);

    // 3.0 > 5.0 * 0.5 — скрытного игрока не видно
    run_fixed_ticks(&mut app, 60);
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Idle)
    );

    // Поднялся — обнаружен
    app.world_mut().entity_mut(player).remove::<Stealthed>();
    run_fixed_ticks(&mut app, 1);
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Chasing)
    );
}

#[test]
fn test_patrol_until_target_appears() {
    let mut app = create_combat_app(10);

    let enemy = spawn_enemy(&mut app, Vec2::ZERO, 30);
    {
        let mut entity = app.world_mut().entity_mut(enemy);
        entity.get_mut::<EnemyAiConfig>().unwrap().patrol = true;
        entity.insert(PatrolRoute::new(vec![
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
        ]));
    }

    // Без цели — патруль, идет к первому waypoint'у
    run_fixed_ticks(&mut app, 90); // 1.5s при скорости 2.0 — почти у точки
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Patrol)
    );
    let pos = app.world().get::<Transform>(enemy).unwrap().translation;
    assert!(pos.x > 1.0, "patrolling enemy should move along route");

    // Появился игрок рядом — погоня важнее маршрута
    spawn_player(&mut app, pos.truncate() + Vec2::new(2.0, 0.0));
    run_fixed_ticks(&mut app, 1);
    assert_eq!(
        app.world().get::<EnemyState>(enemy),
        Some(&EnemyState::Chasing)
    );
}

#[test]
fn test_two_npc_factions_fight_invariants_hold() {
    let mut app = create_combat_app(42);

    // Две фракции NPC воюют друг с другом без игрока
    let spawn_fighter = |app: &mut App, pos: Vec2, faction_id: u64| {
        app.world_mut()
            .spawn((
                Transform::from_translation(pos.extend(0.0)),
                Actor { faction_id },
                Health::new(60),
                EnemyState::default(),
                EnemyAiConfig::default(),
                Attacker::default(),
                MoveSpeed::default(),
                Home::new(pos),
                MovementInput::default(),
            ))
            .id()
    };

    let npc1 = spawn_fighter(&mut app, Vec2::new(0.0, 0.0), 1);
    let npc2 = spawn_fighter(&mut app, Vec2::new(4.0, 0.0), 2);

    for tick in 0..900 {
        run_fixed_ticks(&mut app, 1);

        for npc in [npc1, npc2] {
            if let Some(health) = app.world().get::<Health>(npc) {
                assert!(
                    health.current <= health.max,
                    "tick {}: health invariant broken",
                    tick
                );
            }
        }
    }

    // Одинаковые бойцы на ударной дистанции: оба добиты (обмен ударами
    // продолжается, пока оба живы в момент решения)
    let dead_count = [npc1, npc2]
        .iter()
        .filter(|npc| {
            app.world()
                .get::<Health>(**npc)
                .map(|h| h.is_dead())
                .unwrap_or(true)
        })
        .count();
    assert!(dead_count >= 1, "15 seconds is enough to finish the duel");
}
