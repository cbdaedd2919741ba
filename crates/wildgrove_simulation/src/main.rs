//! Headless demo: игрок с мечом против стаи врагов + дерево на дрова
//!
//! Запуск: cargo run -p wildgrove_simulation
//! Внешнего input-слоя нет — удары игрока шлем волнами из кода.

use bevy::prelude::*;
use wildgrove_simulation::*;

fn main() {
    init_logger();

    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin);

    let world = app.world_mut();

    // Игрок в центре
    let player = world
        .spawn((
            Transform::default(),
            Actor {
                faction_id: PLAYER_FACTION,
            },
            Player,
            Equipped {
                capability: Some(Capability::Sword),
                base_damage: 12,
            },
            Inventory::default(),
            ContactDamage::default(),
            HitRecovery::default(),
            MoveSpeed { speed: 5.0 },
            MovementInput::default(),
        ))
        .id();

    // Враги вокруг, каждый со своим домом
    let enemy_positions = [
        Vec2::new(4.0, 0.0),
        Vec2::new(-3.0, 2.0),
        Vec2::new(0.0, -4.5),
    ];
    for pos in enemy_positions {
        world.spawn((
            Transform::from_translation(pos.extend(0.0)),
            Actor {
                faction_id: ENEMY_FACTION,
            },
            Health::new(30),
            EnemyState::default(),
            EnemyAiConfig::default(),
            Attacker::default(),
            MoveSpeed::default(),
            Home::new(pos),
            MovementInput::default(),
            LootTable::new("slime", 2),
        ));
        world.resource_mut::<GameDirector>().register_enemy();
    }

    // Дерево: рубится только топором, но волна идет мечом
    world.spawn((
        Transform::from_translation(Vec3::new(0.0, -0.6, 0.0)),
        Harvestable::new(Capability::Axe, 5),
        LootTable::new("wood", 3),
    ));

    // 10 волн по 2 секунды: удар мечом, затем бой своим ходом
    for wave in 0..10 {
        app.world_mut()
            .resource_mut::<Events<StrikeCommand>>()
            .send(StrikeCommand { actor: player });
        run_fixed_ticks(&mut app, 120);

        let player_health = app
            .world()
            .get::<Health>(player)
            .map(|h| h.current)
            .unwrap_or(0);
        let enemies_left = app
            .world()
            .resource::<GameDirector>()
            .enemies_remaining();
        log_info(&format!(
            "wave {}: player hp {}, enemies left {}",
            wave, player_health, enemies_left
        ));

        if enemies_left == 0 {
            break;
        }
    }

    let inventory_note = app
        .world()
        .get::<Inventory>(player)
        .map(|inv| format!("{:?}", inv))
        .unwrap_or_default();
    log_info(&format!("simulation finished, inventory: {}", inventory_note));
}
