//! Attacker component — характеристики атакующего актора

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Attacker — акторы, способные бить в ближнем бою
///
/// Cooldown стартует с нуля: первый удар доступен сразу после спавна.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Attacker {
    /// Базовый урон удара
    pub base_damage: u32,
    /// Cooldown между ударами (секунды)
    pub attack_cooldown: f32,
    /// Текущий cooldown таймер (0 = готов)
    #[serde(skip)]
    pub cooldown_timer: f32,
}

impl Default for Attacker {
    fn default() -> Self {
        Self {
            base_damage: 10,
            attack_cooldown: 1.2,
            cooldown_timer: 0.0,
        }
    }
}

impl Attacker {
    pub fn can_attack(&self) -> bool {
        self.cooldown_timer <= 0.0
    }

    /// Начать удар (взвести cooldown)
    pub fn start_attack(&mut self) {
        self.cooldown_timer = self.attack_cooldown;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }
    }
}

/// System: обновление attack cooldown таймеров
pub fn tick_attack_cooldowns(mut query: Query<&mut Attacker>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut attacker in query.iter_mut() {
        attacker.tick(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attacker_cooldown() {
        let mut attacker = Attacker::default();
        assert!(attacker.can_attack());

        attacker.start_attack();
        assert!(!attacker.can_attack());
        assert_eq!(attacker.cooldown_timer, 1.2);

        attacker.tick(0.6);
        assert!(!attacker.can_attack());

        attacker.tick(0.6);
        assert!(attacker.can_attack());
        assert_eq!(attacker.cooldown_timer, 0.0);
    }

    #[test]
    fn test_cooldown_gating_over_ticks() {
        // cooldown 0.5s, тик 0.1s, 20 тиков → ровно 4 удара (первый сразу)
        let mut attacker = Attacker {
            attack_cooldown: 0.5,
            ..Default::default()
        };

        let mut attacks = 0;
        for _ in 0..20 {
            attacker.tick(0.1);
            if attacker.can_attack() {
                attacker.start_attack();
                attacks += 1;
            }
        }

        assert_eq!(attacks, 4);
    }
}
