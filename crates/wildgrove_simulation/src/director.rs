//! GameDirector — состояние партии (win condition)
//!
//! Ресурс вместо глобального singleton'а: живет в World, инжектится
//! системам через Res/ResMut. Сцену победы грузит внешний scene director
//! по событию VictoryAchieved.

use bevy::prelude::*;

/// Счетчик живых врагов + флаг победы
#[derive(Resource, Debug, Default)]
pub struct GameDirector {
    enemies_remaining: u32,
    victory_fired: bool,
}

impl GameDirector {
    pub fn register_enemy(&mut self) {
        self.enemies_remaining += 1;
    }

    pub fn enemies_remaining(&self) -> u32 {
        self.enemies_remaining
    }

    /// Возвращает true ровно один раз — когда пал последний враг
    pub fn enemy_defeated(&mut self) -> bool {
        self.enemies_remaining = self.enemies_remaining.saturating_sub(1);

        if self.enemies_remaining == 0 && !self.victory_fired {
            self.victory_fired = true;
            true
        } else {
            false
        }
    }
}

/// Событие: все враги побеждены
#[derive(Event, Debug, Default, Clone, Copy)]
pub struct VictoryAchieved;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_victory_fires_once() {
        let mut director = GameDirector::default();
        director.register_enemy();
        director.register_enemy();

        assert!(!director.enemy_defeated());
        assert!(director.enemy_defeated()); // последний враг
        assert!(!director.enemy_defeated()); // повторно не срабатывает
    }

    #[test]
    fn test_counter_never_underflows() {
        let mut director = GameDirector::default();
        assert!(director.enemy_defeated()); // 0 → 0, но победа один раз
        assert_eq!(director.enemies_remaining(), 0);
    }
}
