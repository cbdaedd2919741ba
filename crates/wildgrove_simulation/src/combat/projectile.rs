//! Снаряды (стрелы): прямолинейный полет, гибель на первом контакте

use bevy::prelude::*;

use crate::components::{Actor, Health};
use crate::spatial;

use super::harvest::Harvestable;
use super::hitbox::StrikeContact;
use super::Capability;

pub const ARROW_SPEED: f32 = 20.0;
pub const ARROW_DAMAGE: u32 = 10;
pub const ARROW_LIFETIME: f32 = 3.0;
/// Радиус контакта стрелы с целью
pub const ARROW_HIT_RADIUS: f32 = 0.3;

/// Летящий снаряд
///
/// Стрелок снят снепшотом: стрела летит и после гибели владельца.
#[derive(Component, Debug, Clone, Reflect)]
pub struct Projectile {
    pub shooter: Entity,
    pub faction_id: u64,
    pub capability: Capability,
    pub damage: u32,
    pub velocity: Vec2,
    /// Остаток времени жизни (секунды)
    pub remaining: f32,
}

/// Система: полет снарядов + истечение времени жизни
pub fn fly_projectiles(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        transform.translation += (projectile.velocity * delta).extend(0.0);

        projectile.remaining -= delta;
        if projectile.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Система: контакт снаряда с целью
///
/// Стрела гибнет на ПЕРВОМ контакте с чем угодно (враг или ресурс),
/// урон при этом проходит только через диспетчер — стрела по дереву
/// без нужного инструмента просто пропадает.
pub fn collide_projectiles(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile, &Transform)>,
    combat_targets: Query<(Entity, &Actor, &Transform), With<Health>>,
    harvestables: Query<(Entity, &Transform), With<Harvestable>>,
    mut contacts: EventWriter<StrikeContact>,
) {
    for (arrow_entity, projectile, arrow_transform) in projectiles.iter() {
        let center = spatial::position_2d(arrow_transform);

        let mut nearest: Option<(f32, Entity)> = None;

        for (entity, target_actor, transform) in combat_targets.iter() {
            if entity == projectile.shooter
                || target_actor.faction_id == projectile.faction_id
            {
                continue;
            }
            let dist = spatial::distance(center, spatial::position_2d(transform));
            if dist <= ARROW_HIT_RADIUS && nearest.is_none_or(|(best, _)| dist < best) {
                nearest = Some((dist, entity));
            }
        }
        for (entity, transform) in harvestables.iter() {
            let dist = spatial::distance(center, spatial::position_2d(transform));
            if dist <= ARROW_HIT_RADIUS && nearest.is_none_or(|(best, _)| dist < best) {
                nearest = Some((dist, entity));
            }
        }

        if let Some((_, target)) = nearest {
            contacts.write(StrikeContact {
                attacker: projectile.shooter,
                capability: projectile.capability,
                damage: projectile.damage,
                target,
            });
            commands.entity(arrow_entity).despawn();
        }
    }
}
