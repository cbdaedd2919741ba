//! Компоненты игрока: экипировка, инвентарь, контактный урон, скрытность

use bevy::prelude::*;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::combat::Capability;

/// Маркер игрока
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Экипированный инструмент/оружие
///
/// None = пустые руки, удар не выполняется.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Equipped {
    pub capability: Option<Capability>,
    /// Базовый урон удара этим инструментом
    pub base_damage: u32,
}

impl Default for Equipped {
    fn default() -> Self {
        Self {
            capability: None,
            base_damage: 1,
        }
    }
}

impl Equipped {
    /// Циклическое переключение экипировки: None → Sword → ... → Bow → None.
    /// direction = +1 вперед, -1 назад.
    pub fn cycle(&mut self, direction: i32) {
        // Слот 0 = пустые руки, дальше по порядку Capability::ALL
        let slots = Capability::ALL.len() as i32 + 1;
        let current = match self.capability {
            None => 0,
            Some(cap) => {
                Capability::ALL.iter().position(|c| *c == cap).unwrap_or(0) as i32 + 1
            }
        };

        let next = (current + direction).rem_euclid(slots);
        self.capability = if next == 0 {
            None
        } else {
            Some(Capability::ALL[next as usize - 1])
        };
    }
}

/// Скрытность (приседание): враги замечают актора с уменьшенной дистанции
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Stealthed;

/// Контактный урон: столкновение с враждебным актором ранит его
///
/// Cooldown — на стороне атакующего, один и тот же контакт
/// не тикает урон каждый кадр.
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ContactDamage {
    pub damage: u32,
    pub cooldown: f32,
    pub radius: f32,
    /// Оставшийся cooldown (0 = готов)
    #[serde(skip)]
    pub timer: f32,
}

impl Default for ContactDamage {
    fn default() -> Self {
        Self {
            damage: 10,
            cooldown: 0.5,
            radius: 0.6,
            timer: 0.0,
        }
    }
}

impl ContactDamage {
    pub fn ready(&self) -> bool {
        self.timer <= 0.0
    }

    pub fn trigger(&mut self) {
        self.timer = self.cooldown;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - delta).max(0.0);
        }
    }
}

/// Инвентарь собранных ресурсов (имя → количество)
#[derive(Component, Debug, Clone, Default)]
pub struct Inventory {
    items: HashMap<String, u32>,
}

impl Inventory {
    /// Добавляет ресурс, возвращает новое количество
    pub fn add(&mut self, resource: &str, amount: u32) -> u32 {
        let entry = self.items.entry(resource.to_string()).or_insert(0);
        *entry += amount;
        *entry
    }

    pub fn count(&self, resource: &str) -> u32 {
        self.items.get(resource).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
