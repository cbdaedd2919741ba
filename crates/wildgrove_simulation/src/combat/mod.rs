//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Health, Attacker, Harvestable, таймеры
//! - Combat rules: capability-диспетчеризация, cooldown gating, смерть
//! - Events: DamageDealt, EntityDied, StrikeRejected, VictoryAchieved
//!
//! Снаружи остаются: коллайдеры/физика (симуляция считает контакты по
//! дистанциям), анимация замаха, звук, damage flash.

use bevy::prelude::*;

pub mod attacker;
pub mod capability;
pub mod damage;
pub mod harvest;
pub mod hitbox;
pub mod projectile;

// Re-export основных типов
pub use attacker::{tick_attack_cooldowns, Attacker};
pub use capability::Capability;
pub use damage::{
    AttackIntent, DamageDealt, Dead, EntityDied, HealCommand, Healed, HealthChanged,
    StrikeRejected, CORPSE_LINGER,
};
pub use harvest::{HarvestOutcome, Harvestable, HarvestableDepleted, HarvestableShaken};
pub use hitbox::{StrikeCommand, StrikeContact, StrikeHitbox};
pub use projectile::Projectile;

use crate::director::{GameDirector, VictoryAchieved};
use crate::loot::{self, ResourceCollected};
use crate::timers;
use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок внутри тика (через SimulationSet):
/// 1. Timers — cooldown'ы и окна неуязвимости
/// 2. Strikes — спавн/разрешение хитбоксов, стрелы, интенты, контактный урон
/// 3. Deaths — обработка смертей, лут, победа
/// 4. Cleanup — respawn/despawn таймеры
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<StrikeCommand>()
            .add_event::<StrikeContact>()
            .add_event::<AttackIntent>()
            .add_event::<HealCommand>()
            .add_event::<DamageDealt>()
            .add_event::<Healed>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>()
            .add_event::<StrikeRejected>()
            .add_event::<HarvestableShaken>()
            .add_event::<HarvestableDepleted>()
            .add_event::<ResourceCollected>()
            .add_event::<VictoryAchieved>();

        app.init_resource::<GameDirector>();

        app.add_systems(
            FixedUpdate,
            (
                (attacker::tick_attack_cooldowns, timers::tick_invulnerability)
                    .chain()
                    .in_set(SimulationSet::Timers),
                // Полет стрел — вместе с движением акторов
                projectile::fly_projectiles.in_set(SimulationSet::Movement),
                (
                    hitbox::spawn_strike_hitboxes,
                    hitbox::resolve_strike_hitboxes,
                    projectile::collide_projectiles,
                    damage::resolve_strike_contacts,
                    damage::apply_attack_intents,
                    damage::apply_contact_damage,
                    damage::apply_heal_commands,
                )
                    .chain()
                    .in_set(SimulationSet::Strikes),
                (damage::handle_deaths, loot::pickup_loot)
                    .chain()
                    .in_set(SimulationSet::Deaths),
                (timers::tick_despawn_after, timers::tick_respawn)
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
