//! Хитбоксы ударов
//!
//! StrikeHitbox спавнится на окно замаха и гасится после ПЕРВОГО
//! разрешения контакта: один замах = одна попытка, без ретраев.
//! Контакт с ресурсом тратит хитбокс даже при неверном инструменте;
//! контакт инструмента (не оружия) с боевым актором хитбокс не тратит —
//! замах еще может срубить дерево позади.

use bevy::prelude::*;

use crate::components::{Actor, Equipped, Facing, Health};
use crate::spatial;

use super::damage::Dead;
use super::harvest::Harvestable;
use super::projectile::{self, Projectile};
use super::Capability;

/// Смещение хитбокса от центра актора вдоль взгляда
pub const STRIKE_OFFSET: f32 = 0.4;
/// Радиус сферы хитбокса
pub const STRIKE_RADIUS: f32 = 0.5;
/// Окно активности (секунды) — длительность замаха
pub const STRIKE_WINDOW: f32 = 0.25;

/// Хитбокс одного замаха
///
/// Фракция и урон снимаются с владельца при спавне: хитбокс доживает
/// свое окно, даже если владелец исчез.
#[derive(Component, Debug, Clone, Reflect)]
pub struct StrikeHitbox {
    pub owner: Entity,
    pub faction_id: u64,
    pub capability: Capability,
    pub damage: u32,
    pub radius: f32,
    /// Остаток окна активности (секунды)
    pub remaining: f32,
}

/// Событие: актор выполняет удар экипированным инструментом
/// (интент от внешнего input-слоя)
#[derive(Event, Debug, Clone)]
pub struct StrikeCommand {
    pub actor: Entity,
}

/// Событие: контакт хитбокса/снаряда с целью (вход диспетчера урона)
#[derive(Event, Debug, Clone)]
pub struct StrikeContact {
    pub attacker: Entity,
    pub capability: Capability,
    pub damage: u32,
    pub target: Entity,
}

/// Система: спавн хитбоксов от StrikeCommand
///
/// Пустые руки — молчаливый no-op. Лук вместо хитбокса выпускает стрелу.
pub fn spawn_strike_hitboxes(
    mut commands: Commands,
    mut strike_commands: EventReader<StrikeCommand>,
    actors: Query<(&Actor, &Transform, &Facing, &Equipped), Without<Dead>>,
) {
    for command in strike_commands.read() {
        let Ok((actor, transform, facing, equipped)) = actors.get(command.actor) else {
            crate::log_warning(&format!(
                "StrikeCommand: actor {:?} missing or dead, strike dropped",
                command.actor
            ));
            continue;
        };

        let Some(capability) = equipped.capability else {
            continue; // пустые руки
        };

        let origin = spatial::position_2d(transform) + facing.direction * STRIKE_OFFSET;

        if capability == Capability::Bow {
            commands.spawn((
                Projectile {
                    shooter: command.actor,
                    faction_id: actor.faction_id,
                    capability,
                    damage: projectile::ARROW_DAMAGE,
                    velocity: facing.direction * projectile::ARROW_SPEED,
                    remaining: projectile::ARROW_LIFETIME,
                },
                Transform::from_translation(origin.extend(0.0)),
            ));
            continue;
        }

        commands.spawn((
            StrikeHitbox {
                owner: command.actor,
                faction_id: actor.faction_id,
                capability,
                damage: equipped.base_damage,
                radius: STRIKE_RADIUS,
                remaining: STRIKE_WINDOW,
            },
            Transform::from_translation(origin.extend(0.0)),
        ));
    }
}

/// Система: разрешение контактов хитбоксов
///
/// Кандидаты обходятся от ближнего к дальнему. Правила расхода:
/// - harvestable: контакт всегда тратится (даже при WrongTool)
/// - боевой актор: тратится только если capability — оружие
/// - просроченное окно гасит хитбокс без контакта
pub fn resolve_strike_hitboxes(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut hitboxes: Query<(Entity, &mut StrikeHitbox, &Transform)>,
    harvestables: Query<(Entity, &Transform), With<Harvestable>>,
    combat_targets: Query<(Entity, &Actor, &Transform), With<Health>>,
    mut contacts: EventWriter<StrikeContact>,
) {
    let delta = time.delta_secs();

    for (hitbox_entity, mut hitbox, hitbox_transform) in hitboxes.iter_mut() {
        let center = spatial::position_2d(hitbox_transform);

        // Снепшот кандидатов обоих видов, единая сортировка по дистанции
        let mut candidates: Vec<(f32, Entity, bool)> = Vec::new();

        for (entity, transform) in harvestables.iter() {
            let dist = spatial::distance(center, spatial::position_2d(transform));
            if dist <= hitbox.radius {
                candidates.push((dist, entity, true));
            }
        }
        for (entity, target_actor, transform) in combat_targets.iter() {
            if entity == hitbox.owner || target_actor.faction_id == hitbox.faction_id {
                continue;
            }
            let dist = spatial::distance(center, spatial::position_2d(transform));
            if dist <= hitbox.radius {
                candidates.push((dist, entity, false));
            }
        }

        candidates
            .sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.index().cmp(&b.1.index())));

        let mut consumed = false;
        for (_, target, is_harvestable) in candidates {
            if is_harvestable {
                contacts.write(StrikeContact {
                    attacker: hitbox.owner,
                    capability: hitbox.capability,
                    damage: hitbox.damage,
                    target,
                });
                consumed = true;
                break;
            }

            if hitbox.capability.is_weapon() {
                contacts.write(StrikeContact {
                    attacker: hitbox.owner,
                    capability: hitbox.capability,
                    damage: hitbox.damage,
                    target,
                });
                consumed = true;
                break;
            }
            // Инструмент против боевого актора: контакта нет, ищем дальше
        }

        if consumed {
            commands.entity(hitbox_entity).despawn();
            continue;
        }

        hitbox.remaining -= delta;
        if hitbox.remaining <= 0.0 {
            commands.entity(hitbox_entity).despawn();
        }
    }
}
