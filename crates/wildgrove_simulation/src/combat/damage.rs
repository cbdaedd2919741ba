//! Диспетчер урона и обработка смерти
//!
//! Единая точка применения урона для всех источников: хитбоксы ударов,
//! стрелы, ближние атаки AI, контактный урон. Правила:
//! - harvestable: точное совпадение инструмента, иначе отказ без урона
//! - боевой актор: урон только от оружия; неуязвимость — молчаливый skip
//! - запрос по исчезнувшей цели — молчаливый no-op, никогда не ошибка

use bevy::prelude::*;

use crate::components::{
    Actor, ContactDamage, Health, HealthChange, MovementInput, PLAYER_FACTION,
};
use crate::director::{GameDirector, VictoryAchieved};
use crate::loot::{self, LootTable};
use crate::spatial;
use crate::timers::{DespawnAfter, HitRecovery, Invulnerability, RespawnPolicy, RespawnTimer};
use crate::DeterministicRng;

use super::harvest::{HarvestOutcome, Harvestable, HarvestableDepleted, HarvestableShaken};
use super::hitbox::StrikeContact;
use super::Capability;

/// Сколько труп лежит до деспавна (fade-out на стороне презентации)
pub const CORPSE_LINGER: f32 = 2.0;

/// Компонент-маркер: актор мертв
///
/// AI и движение мертвых не тикают; труп остается для эффектов
/// до DespawnAfter/RespawnTimer.
#[derive(Component, Debug, Default, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Событие: урон нанесен (UI, звук, damage flash)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub amount: u32,
    pub target_died: bool,
}

/// Событие: актор вылечен
#[derive(Event, Debug, Clone)]
pub struct Healed {
    pub entity: Entity,
    pub amount: u32,
}

/// Событие: новое значение health (полоски здоровья)
#[derive(Event, Debug, Clone)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
}

/// Событие: актор умер (ровно один раз на жизнь)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Событие: удар отвергнут — неверный инструмент для ресурса
#[derive(Event, Debug, Clone)]
pub struct StrikeRejected {
    pub target: Entity,
    pub used: Capability,
    pub required: Capability,
}

/// Событие: интент ближней атаки AI
///
/// Дистанция перепроверяется здесь, при применении: цель могла
/// сдвинуться после решения FSM в том же тике.
#[derive(Event, Debug, Clone)]
pub struct AttackIntent {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub range: f32,
}

/// Событие: команда лечения от внешнего слоя (зелья, алтари)
#[derive(Event, Debug, Clone)]
pub struct HealCommand {
    pub target: Entity,
    pub amount: u32,
}

/// Применяет урон к Health и публикует события
///
/// Fatal конвертируется в EntityDied ровно один раз — повторные
/// вызовы по мертвому возвращают Ignored без событий.
fn deal_damage(
    target: Entity,
    health: &mut Health,
    amount: u32,
    attacker: Option<Entity>,
    damage_events: &mut EventWriter<DamageDealt>,
    changed_events: &mut EventWriter<HealthChanged>,
    died_events: &mut EventWriter<EntityDied>,
) -> HealthChange {
    let change = health.take_damage(amount);

    if change != HealthChange::Ignored {
        damage_events.write(DamageDealt {
            attacker,
            target,
            amount: change.delta(),
            target_died: change.is_fatal(),
        });
        changed_events.write(HealthChanged {
            entity: target,
            current: health.current,
        });

        if change.is_fatal() {
            died_events.write(EntityDied {
                entity: target,
                killer: attacker,
            });
            crate::log_info(&format!(
                "entity {:?} killed by {:?}",
                target, attacker
            ));
        }
    }

    change
}

/// Система: разрешение StrikeContact (хитбоксы + стрелы)
pub fn resolve_strike_contacts(
    mut commands: Commands,
    mut contacts: EventReader<StrikeContact>,
    mut harvestables: Query<(&mut Harvestable, &Transform, Option<&LootTable>)>,
    mut combat_targets: Query<(&mut Health, Option<&Invulnerability>, Option<&HitRecovery>)>,
    mut rng: ResMut<DeterministicRng>,
    mut damage_events: EventWriter<DamageDealt>,
    mut changed_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<EntityDied>,
    mut rejected_events: EventWriter<StrikeRejected>,
    mut shaken_events: EventWriter<HarvestableShaken>,
    mut depleted_events: EventWriter<HarvestableDepleted>,
) {
    for contact in contacts.read() {
        // Ресурс?
        if let Ok((mut harvestable, transform, loot)) = harvestables.get_mut(contact.target) {
            match harvestable.strike(contact.capability, contact.damage) {
                HarvestOutcome::WrongTool { required } => {
                    crate::log(&format!(
                        "harvestable {:?}: wrong tool {} (required {})",
                        contact.target,
                        contact.capability.as_str(),
                        required.as_str()
                    ));
                    rejected_events.write(StrikeRejected {
                        target: contact.target,
                        used: contact.capability,
                        required,
                    });
                }
                HarvestOutcome::Chipped { remaining } => {
                    crate::log(&format!(
                        "harvestable {:?}: hit, durability {}",
                        contact.target, remaining
                    ));
                    shaken_events.write(HarvestableShaken {
                        entity: contact.target,
                    });
                }
                HarvestOutcome::Depleted => {
                    crate::log_info(&format!(
                        "harvestable {:?} depleted by {:?}",
                        contact.target, contact.attacker
                    ));
                    depleted_events.write(HarvestableDepleted {
                        entity: contact.target,
                        harvester: contact.attacker,
                    });
                    if let Some(loot) = loot {
                        loot::scatter_loot(
                            &mut commands,
                            &mut rng.rng,
                            spatial::position_2d(transform),
                            loot,
                        );
                    }
                    commands.entity(contact.target).despawn();
                }
            }
            continue;
        }

        // Боевой актор. Не-оружие сюда не доходит (отфильтровано при
        // детекции контакта), но правило дублируем — вход диспетчера
        // открыт и для внешних событий.
        if !contact.capability.is_weapon() {
            continue;
        }

        let Ok((mut health, invulnerability, recovery)) =
            combat_targets.get_mut(contact.target)
        else {
            continue; // цель исчезла — молчаливый no-op
        };

        if invulnerability.is_some() {
            continue;
        }

        let change = deal_damage(
            contact.target,
            &mut health,
            contact.damage,
            Some(contact.attacker),
            &mut damage_events,
            &mut changed_events,
            &mut died_events,
        );

        // Окно неуязвимости после пережитого попадания
        if let (HealthChange::Changed { .. }, Some(recovery)) = (change, recovery) {
            commands
                .entity(contact.target)
                .insert(Invulnerability::new(recovery.duration));
        }
    }
}

/// Система: применение AttackIntent (ближние атаки AI)
pub fn apply_attack_intents(
    mut commands: Commands,
    mut intents: EventReader<AttackIntent>,
    attackers: Query<&Transform>,
    mut targets: Query<(
        &Transform,
        &mut Health,
        Option<&Invulnerability>,
        Option<&HitRecovery>,
    )>,
    mut damage_events: EventWriter<DamageDealt>,
    mut changed_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<EntityDied>,
) {
    for intent in intents.read() {
        let Ok(attacker_transform) = attackers.get(intent.attacker) else {
            crate::log_warning(&format!(
                "AttackIntent: attacker {:?} vanished, intent dropped",
                intent.attacker
            ));
            continue;
        };

        let Ok((target_transform, mut health, invulnerability, recovery)) =
            targets.get_mut(intent.target)
        else {
            continue; // цель исчезла
        };

        // Перепроверка дистанции в момент применения
        let dist = spatial::distance(
            spatial::position_2d(attacker_transform),
            spatial::position_2d(target_transform),
        );
        if dist > intent.range {
            continue;
        }

        if invulnerability.is_some() {
            continue;
        }

        let change = deal_damage(
            intent.target,
            &mut health,
            intent.damage,
            Some(intent.attacker),
            &mut damage_events,
            &mut changed_events,
            &mut died_events,
        );

        if let (HealthChange::Changed { .. }, Some(recovery)) = (change, recovery) {
            commands
                .entity(intent.target)
                .insert(Invulnerability::new(recovery.duration));
        }
    }
}

/// Система: контактный урон (столкновение с враждебным актором)
pub fn apply_contact_damage(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut attackers: Query<(Entity, &Actor, &Transform, &mut ContactDamage), Without<Dead>>,
    positions: Query<(Entity, &Actor, &Transform), With<Health>>,
    mut healths: Query<(&mut Health, Option<&Invulnerability>, Option<&HitRecovery>)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut changed_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<EntityDied>,
) {
    let delta = time.delta_secs();

    for (entity, actor, transform, mut contact) in attackers.iter_mut() {
        contact.tick(delta);
        if !contact.ready() {
            continue;
        }

        let center = spatial::position_2d(transform);
        let hits = spatial::overlap_circle(
            center,
            contact.radius,
            positions
                .iter()
                .filter(|(other, other_actor, _)| {
                    *other != entity && other_actor.faction_id != actor.faction_id
                })
                .map(|(other, _, t)| (other, spatial::position_2d(t))),
        );

        let Some((target, _)) = hits.first().copied() else {
            continue;
        };
        let Ok((mut health, invulnerability, recovery)) = healths.get_mut(target) else {
            continue;
        };

        // Контакт состоялся — cooldown взводится независимо от исхода
        contact.trigger();

        if invulnerability.is_some() {
            continue;
        }

        let change = deal_damage(
            target,
            &mut health,
            contact.damage,
            Some(entity),
            &mut damage_events,
            &mut changed_events,
            &mut died_events,
        );

        if let (HealthChange::Changed { .. }, Some(recovery)) = (change, recovery) {
            commands
                .entity(target)
                .insert(Invulnerability::new(recovery.duration));
        }
    }
}

/// Система: команды лечения
pub fn apply_heal_commands(
    mut heals: EventReader<HealCommand>,
    mut targets: Query<&mut Health>,
    mut healed_events: EventWriter<Healed>,
    mut changed_events: EventWriter<HealthChanged>,
) {
    for heal in heals.read() {
        let Ok(mut health) = targets.get_mut(heal.target) else {
            crate::log_warning(&format!(
                "HealCommand: target {:?} has no Health, heal dropped",
                heal.target
            ));
            continue;
        };

        // Лечение мертвых и на полном здоровье — тихий no-op
        if let HealthChange::Changed { delta } = health.heal(heal.amount) {
            healed_events.write(Healed {
                entity: heal.target,
                amount: delta,
            });
            changed_events.write(HealthChanged {
                entity: heal.target,
                current: health.current,
            });
        }
    }
}

/// Система: обработка смерти
///
/// Снимает FSM, обнуляет движение, роняет лут, уведомляет директора.
/// Дальше труп либо ждет RespawnTimer, либо деспавнится по DespawnAfter.
pub fn handle_deaths(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    mut actors: Query<(
        &Actor,
        &Transform,
        Option<&mut MovementInput>,
        Option<&LootTable>,
        Option<&RespawnPolicy>,
    )>,
    mut rng: ResMut<DeterministicRng>,
    mut director: ResMut<GameDirector>,
    mut victory_events: EventWriter<VictoryAchieved>,
) {
    for death in deaths.read() {
        let Ok((actor, transform, movement, loot, respawn)) = actors.get_mut(death.entity)
        else {
            continue;
        };

        // Обнуляем движение сразу, компоненты снимаем через Commands
        if let Some(mut movement) = movement {
            movement.direction = Vec2::ZERO;
        }

        if let Some(loot) = loot {
            loot::scatter_loot(
                &mut commands,
                &mut rng.rng,
                spatial::position_2d(transform),
                loot,
            );
        }

        let Ok(mut entity_commands) = commands.get_entity(death.entity) else {
            continue;
        };
        entity_commands.remove::<crate::ai::EnemyState>();
        entity_commands.insert(Dead);

        if actor.faction_id == PLAYER_FACTION {
            // Сцена смерти — забота внешнего scene director'а
            crate::log_info("player died");
            continue;
        }

        match respawn {
            Some(policy) => {
                entity_commands.insert(RespawnTimer::new(policy.delay));
            }
            None => {
                entity_commands.insert(DespawnAfter::new(CORPSE_LINGER));
                if director.enemy_defeated() {
                    victory_events.write(VictoryAchieved);
                    crate::log_info("all enemies defeated, victory");
                }
            }
        }
    }
}
