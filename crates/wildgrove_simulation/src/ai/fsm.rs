//! FSM врага: Idle / Patrol / Chasing / Attacking / Returning
//!
//! Переходы решаются один раз за тик по дистанциям до цели и до дома.
//! Attacking не наносит урон сам — генерирует AttackIntent, валидация
//! дистанции происходит при применении (цель могла сдвинуться внутри тика).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackIntent, Attacker, Dead};
use crate::components::{
    Actor, Facing, Health, Home, MovementInput, PatrolRoute, Stealthed,
};
use crate::spatial;

/// Допуск прибытия домой (Returning → Idle/Patrol)
pub const RETURN_EPSILON: f32 = 0.1;

/// Состояния FSM врага
///
/// Начальное — Idle; терминального нет, автомат живет пока жив актор.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Стоим на месте, ждем цель
    #[default]
    Idle,
    /// Обход waypoint'ов (если маршрут назначен)
    Patrol,
    /// Погоня за целью
    Chasing,
    /// Цель в радиусе удара: стоим, бьем по cooldown
    Attacking,
    /// Возврат к домашней позиции
    Returning,
}

/// Параметры AI врага (load-time конфиг, на архетип)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct EnemyAiConfig {
    /// Радиус обнаружения цели (метры)
    pub detection_range: f32,
    /// Дальше этого радиуса погоня бросается
    pub follow_range: f32,
    /// Радиус удара
    pub attack_range: f32,
    /// Дистанция остановки у цели/дома/waypoint'а
    pub stop_distance: f32,
    /// Патрулировать при отсутствии цели (нужен PatrolRoute)
    pub patrol: bool,
    /// Отталкивание от соседей своей фракции
    pub separation: bool,
    pub separation_radius: f32,
    pub separation_force: f32,
    /// Множитель detection_range против скрытной цели
    pub stealth_detection_multiplier: f32,
}

impl Default for EnemyAiConfig {
    fn default() -> Self {
        Self {
            detection_range: 5.0,
            follow_range: 8.0,
            attack_range: 1.2,
            stop_distance: 0.5,
            patrol: false,
            separation: true,
            separation_radius: 1.0,
            separation_force: 0.6,
            stealth_detection_multiplier: 0.5,
        }
    }
}

/// Событие: FSM сменил состояние (для анимации/звука)
#[derive(Event, Debug, Clone)]
pub struct StateChanged {
    pub entity: Entity,
    pub from: EnemyState,
    pub to: EnemyState,
}

/// Входные данные одного тика FSM
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    /// Дистанция до ближайшей живой цели (None = цели нет)
    pub distance_to_target: Option<f32>,
    /// Цель скрытна (приседание)
    pub target_stealthed: bool,
    pub distance_to_home: f32,
    /// Есть непустой маршрут патруля
    pub has_patrol_route: bool,
}

/// Чистая функция переходов: одно решение за тик
///
/// Порядок проверок фиксирован: уход из погони (follow) приоритетнее
/// входа в атаку; обнаружение приоритетнее возврата домой.
pub fn next_state(
    current: EnemyState,
    inputs: &TickInputs,
    config: &EnemyAiConfig,
) -> EnemyState {
    let detection = if inputs.target_stealthed {
        config.detection_range * config.stealth_detection_multiplier
    } else {
        config.detection_range
    };

    let within = |range: f32| inputs.distance_to_target.is_some_and(|d| d <= range);
    let patrol_available = config.patrol && inputs.has_patrol_route;

    match current {
        EnemyState::Idle => {
            if within(detection) {
                EnemyState::Chasing
            } else if patrol_available {
                EnemyState::Patrol
            } else {
                EnemyState::Idle
            }
        }

        EnemyState::Patrol => {
            if within(detection) {
                EnemyState::Chasing
            } else {
                EnemyState::Patrol
            }
        }

        EnemyState::Chasing => match inputs.distance_to_target {
            // Цель пропала или ушла за follow-радиус
            None => EnemyState::Returning,
            Some(d) if d > config.follow_range => EnemyState::Returning,
            // Граница включительно: d == attack_range уже атака
            Some(d) if d <= config.attack_range => EnemyState::Attacking,
            Some(_) => EnemyState::Chasing,
        },

        EnemyState::Attacking => {
            if within(config.attack_range) {
                EnemyState::Attacking
            } else {
                EnemyState::Chasing
            }
        }

        EnemyState::Returning => {
            if within(detection) {
                EnemyState::Chasing
            } else if inputs.distance_to_home <= config.stop_distance + RETURN_EPSILON {
                if patrol_available {
                    EnemyState::Patrol
                } else {
                    EnemyState::Idle
                }
            } else {
                EnemyState::Returning
            }
        }
    }
}

/// Система: FSM transitions
///
/// Цель = ближайший живой актор другой фракции. Смена состояния
/// публикуется в StateChanged.
pub fn ai_transitions(
    mut enemies: Query<
        (
            Entity,
            &Actor,
            &Transform,
            &mut EnemyState,
            &EnemyAiConfig,
            &Home,
            Option<&PatrolRoute>,
        ),
        Without<Dead>,
    >,
    targets: Query<(Entity, &Actor, &Transform, &Health, Option<&Stealthed>)>,
    mut state_events: EventWriter<StateChanged>,
) {
    for (entity, actor, transform, mut state, config, home, route) in enemies.iter_mut() {
        let pos = spatial::position_2d(transform);

        // Сканируем чуть дальше follow-радиуса: за его пределами цель
        // эквивалентна отсутствующей
        let scan_range = config.follow_range.max(config.detection_range);
        let target =
            spatial::nearest_hostile(entity, actor.faction_id, pos, scan_range, &targets);

        let inputs = TickInputs {
            distance_to_target: target.map(|(_, dist, _)| dist),
            target_stealthed: target.is_some_and(|(_, _, stealthed)| stealthed),
            distance_to_home: spatial::distance(pos, home.position),
            has_patrol_route: route.is_some_and(|r| !r.is_empty()),
        };

        let next = next_state(*state, &inputs, config);
        if next != *state {
            crate::log(&format!(
                "enemy {:?}: {:?} -> {:?} (target dist {:?})",
                entity, *state, next, inputs.distance_to_target
            ));
            state_events.write(StateChanged {
                entity,
                from: *state,
                to: next,
            });
            *state = next;
        }
    }
}

/// Система: movement vector от FSM state
///
/// Chasing/Returning/Patrol — движение к точке с подмешиванием separation;
/// Idle/Attacking — стоим (в Attacking разворачиваемся к цели).
pub fn ai_movement_from_state(
    mut enemies: Query<
        (
            Entity,
            &Actor,
            &Transform,
            &EnemyState,
            &EnemyAiConfig,
            &Home,
            Option<&mut PatrolRoute>,
            &mut MovementInput,
            &mut Facing,
        ),
        Without<Dead>,
    >,
    targets: Query<(Entity, &Actor, &Transform, &Health, Option<&Stealthed>)>,
    neighbors: Query<(Entity, &Actor, &Transform), With<EnemyState>>,
) {
    for (entity, actor, transform, state, config, home, route, mut movement, mut facing) in
        enemies.iter_mut()
    {
        let pos = spatial::position_2d(transform);

        let destination = match state {
            EnemyState::Idle => None,

            EnemyState::Attacking => {
                // Стоим, но каждый тик держим цель во взгляде
                if let Some((target, _, _)) = spatial::nearest_hostile(
                    entity,
                    actor.faction_id,
                    pos,
                    f32::INFINITY,
                    &targets,
                ) {
                    if let Ok((_, _, target_transform, _, _)) = targets.get(target) {
                        facing.update(spatial::position_2d(target_transform) - pos);
                    }
                }
                None
            }

            EnemyState::Chasing => spatial::nearest_hostile(
                entity,
                actor.faction_id,
                pos,
                f32::INFINITY,
                &targets,
            )
            .and_then(|(target, _, _)| targets.get(target).ok())
            .map(|(_, _, target_transform, _, _)| spatial::position_2d(target_transform)),

            EnemyState::Returning => Some(home.position),

            EnemyState::Patrol => route.and_then(|mut r| {
                let point = r.current_point()?;
                if spatial::distance(pos, point) <= config.stop_distance {
                    r.advance();
                }
                r.current_point()
            }),
        };

        let Some(destination) = destination else {
            movement.direction = Vec2::ZERO;
            continue;
        };

        if spatial::distance(pos, destination) <= config.stop_distance {
            movement.direction = Vec2::ZERO;
            continue;
        }

        let mut direction = (destination - pos).normalize_or_zero();

        if config.separation {
            let separation = spatial::accumulate_separation(
                pos,
                neighbors
                    .iter()
                    .filter(|(other, other_actor, _)| {
                        *other != entity && other_actor.faction_id == actor.faction_id
                    })
                    .map(|(_, _, t)| spatial::position_2d(t)),
                config.separation_radius,
            );
            direction = spatial::blend_separation(direction, separation, config.separation_force);
        }

        movement.direction = direction;
    }
}

/// Система: attack execution
///
/// В Attacking по готовности cooldown'а публикует AttackIntent.
/// Дистанция при применении перепроверяется damage-системой.
pub fn ai_attack_execution(
    mut enemies: Query<
        (
            Entity,
            &Actor,
            &Transform,
            &EnemyState,
            &EnemyAiConfig,
            &mut Attacker,
        ),
        Without<Dead>,
    >,
    targets: Query<(Entity, &Actor, &Transform, &Health, Option<&Stealthed>)>,
    mut intents: EventWriter<AttackIntent>,
) {
    for (entity, actor, transform, state, config, mut attacker) in enemies.iter_mut() {
        if *state != EnemyState::Attacking {
            continue;
        }
        if !attacker.can_attack() {
            continue;
        }

        let pos = spatial::position_2d(transform);
        let Some((target, _, _)) = spatial::nearest_hostile(
            entity,
            actor.faction_id,
            pos,
            config.attack_range,
            &targets,
        ) else {
            continue;
        };

        intents.write(AttackIntent {
            attacker: entity,
            target,
            damage: attacker.base_damage,
            range: config.attack_range,
        });
        attacker.start_attack();
    }
}
