//! Лут: разброс при смерти/исчерпании ресурса, подбор игроком

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Inventory, Player};
use crate::spatial;

/// Радиус подбора лута игроком
pub const PICKUP_RADIUS: f32 = 0.5;

/// Конфиг: что и сколько падает с актора/ресурса
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct LootTable {
    pub resource: String,
    /// Число отдельных дропов (каждый по одной единице)
    pub amount: u32,
    pub spread_radius: f32,
}

impl LootTable {
    pub fn new(resource: &str, amount: u32) -> Self {
        Self {
            resource: resource.to_string(),
            amount,
            spread_radius: 1.0,
        }
    }
}

/// Лежащий на земле дроп
#[derive(Component, Debug, Clone, Reflect)]
pub struct LootDrop {
    pub resource: String,
    pub amount: u32,
}

/// Событие: игрок подобрал ресурс
#[derive(Event, Debug, Clone)]
pub struct ResourceCollected {
    pub collector: Entity,
    pub resource: String,
    /// Итог в инвентаре после подбора
    pub total: u32,
}

/// Разбрасывает дропы вокруг точки (детерминированный RNG)
pub fn scatter_loot(
    commands: &mut Commands,
    rng: &mut ChaCha8Rng,
    origin: Vec2,
    table: &LootTable,
) {
    for _ in 0..table.amount {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let dist = rng.gen_range(0.0..=table.spread_radius);
        let offset = Vec2::from_angle(angle) * dist;

        commands.spawn((
            LootDrop {
                resource: table.resource.clone(),
                amount: 1,
            },
            Transform::from_translation((origin + offset).extend(0.0)),
        ));
    }
}

/// Система: подбор лута
///
/// Дропы в радиусе подбираются от ближнего к дальнему, каждый ровно
/// один раз (деспавн сразу).
pub fn pickup_loot(
    mut commands: Commands,
    mut players: Query<(Entity, &Transform, &mut Inventory), With<Player>>,
    drops: Query<(Entity, &Transform, &LootDrop)>,
    mut events: EventWriter<ResourceCollected>,
) {
    for (player, transform, mut inventory) in players.iter_mut() {
        let center = spatial::position_2d(transform);

        let hits = spatial::overlap_circle(
            center,
            PICKUP_RADIUS,
            drops
                .iter()
                .map(|(entity, t, _)| (entity, spatial::position_2d(t))),
        );

        for (drop_entity, _) in hits {
            let Ok((_, _, drop)) = drops.get(drop_entity) else {
                continue;
            };

            let total = inventory.add(&drop.resource, drop.amount);
            commands.entity(drop_entity).despawn();

            crate::log(&format!(
                "player {:?} collected {} (total {})",
                player, drop.resource, total
            ));
            events.write(ResourceCollected {
                collector: player,
                resource: drop.resource.clone(),
                total,
            });
        }
    }
}
