//! Кооперативные one-shot таймеры
//!
//! Замена корутин: компонент хранит остаток времени, система тикает его
//! на fixed-шаге и выполняет действие один раз. Отмена = снятие компонента
//! или деспавн владельца; по исчезнувшему владельцу таймер молча не
//! срабатывает (query его просто не увидит).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::EnemyState;
use crate::combat::{Dead, HealthChanged};
use crate::components::{Health, Home};

/// Деспавн entity после задержки (трупы, просроченные эффекты)
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(delay: f32) -> Self {
        Self { remaining: delay }
    }
}

/// Окно неуязвимости после пережитого попадания
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Invulnerability {
    pub remaining: f32,
}

impl Invulnerability {
    pub fn new(duration: f32) -> Self {
        Self {
            remaining: duration,
        }
    }
}

/// Конфиг: длительность неуязвимости, выдаваемой при попадании
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct HitRecovery {
    pub duration: f32,
}

impl Default for HitRecovery {
    fn default() -> Self {
        Self { duration: 0.5 }
    }
}

/// Конфиг: актор возрождается после смерти
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct RespawnPolicy {
    pub delay: f32,
}

impl Default for RespawnPolicy {
    fn default() -> Self {
        Self { delay: 5.0 }
    }
}

/// Взведенный таймер возрождения (вешается при смерти)
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct RespawnTimer {
    pub remaining: f32,
}

impl RespawnTimer {
    pub fn new(delay: f32) -> Self {
        Self { remaining: delay }
    }
}

/// Система: деспавн по таймеру
pub fn tick_despawn_after(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    let delta = time.delta_secs();

    for (entity, mut timer) in query.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Система: снятие неуязвимости по истечении окна
pub fn tick_invulnerability(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut Invulnerability)>,
) {
    let delta = time.delta_secs();

    for (entity, mut window) in query.iter_mut() {
        window.remaining -= delta;
        if window.remaining <= 0.0 {
            commands.entity(entity).remove::<Invulnerability>();
        }
    }
}

/// Система: возрождение по таймеру
///
/// Воскрешает на домашней позиции с полным здоровьем и свежим Idle FSM.
/// Таймер снимается в момент срабатывания (повторного запуска нет).
pub fn tick_respawn(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut RespawnTimer, &Home, &mut Health, &mut Transform)>,
    mut changed_events: EventWriter<HealthChanged>,
) {
    let delta = time.delta_secs();

    for (entity, mut timer, home, mut health, mut transform) in query.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining > 0.0 {
            continue;
        }

        health.revive();
        transform.translation = home.position.extend(transform.translation.z);

        commands
            .entity(entity)
            .remove::<(RespawnTimer, Dead)>()
            .insert(EnemyState::default());

        changed_events.write(HealthChanged {
            entity,
            current: health.current,
        });
        crate::log_info(&format!("entity {:?} respawned at home", entity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respawn_timer_counts_down() {
        let mut timer = RespawnTimer::new(1.0);
        timer.remaining -= 0.4;
        assert!(timer.remaining > 0.0);
        timer.remaining -= 0.7;
        assert!(timer.remaining <= 0.0);
    }
}
