//! Harvestables — ресурсные объекты (деревья, камни, грядки)
//!
//! Своя прочность вместо Health: ресурс не участвует в бою, не умирает,
//! а "вырабатывается" правильным инструментом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::Capability;

/// Ресурсный объект с прочностью и требуемым инструментом
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct Harvestable {
    /// Единственный инструмент, который снимает прочность
    pub required: Capability,
    pub durability: u32,
    pub max_durability: u32,
}

impl Harvestable {
    pub fn new(required: Capability, durability: u32) -> Self {
        Self {
            required,
            durability,
            max_durability: durability,
        }
    }

    /// Разрешение удара: точное совпадение инструмента или отказ.
    ///
    /// Отказ не ошибка — вызывающий решает, логировать ли его.
    pub fn strike(&mut self, tool: Capability, damage: u32) -> HarvestOutcome {
        if tool != self.required {
            return HarvestOutcome::WrongTool {
                required: self.required,
            };
        }

        self.durability = self.durability.saturating_sub(damage);
        if self.durability == 0 {
            HarvestOutcome::Depleted
        } else {
            HarvestOutcome::Chipped {
                remaining: self.durability,
            }
        }
    }
}

/// Результат удара по ресурсу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Неверный инструмент: урона нет, контакт все равно потрачен
    WrongTool { required: Capability },
    /// Прочность снята, ресурс еще стоит
    Chipped { remaining: u32 },
    /// Прочность исчерпана — ресурс разрушается, падает лут
    Depleted,
}

impl HarvestOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, HarvestOutcome::WrongTool { .. })
    }
}

/// Событие: ресурс получил принятый удар (тряска для презентации)
#[derive(Event, Debug, Clone)]
pub struct HarvestableShaken {
    pub entity: Entity,
}

/// Событие: ресурс исчерпан и разрушен
#[derive(Event, Debug, Clone)]
pub struct HarvestableDepleted {
    pub entity: Entity,
    pub harvester: Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_tool_rejected_no_damage() {
        let mut tree = Harvestable::new(Capability::Axe, 5);

        let outcome = tree.strike(Capability::Sword, 3);

        assert!(!outcome.accepted());
        assert_eq!(
            outcome,
            HarvestOutcome::WrongTool {
                required: Capability::Axe
            }
        );
        assert_eq!(tree.durability, 5); // нетронута
    }

    #[test]
    fn test_correct_tool_full_damage() {
        let mut tree = Harvestable::new(Capability::Axe, 5);

        let outcome = tree.strike(Capability::Axe, 3);

        assert!(outcome.accepted());
        assert_eq!(outcome, HarvestOutcome::Chipped { remaining: 2 });
    }

    #[test]
    fn test_depletion() {
        let mut rock = Harvestable::new(Capability::Pick, 4);

        assert_eq!(
            rock.strike(Capability::Pick, 2),
            HarvestOutcome::Chipped { remaining: 2 }
        );
        // Урон больше остатка — исчерпание без паники
        assert_eq!(rock.strike(Capability::Pick, 10), HarvestOutcome::Depleted);
        assert_eq!(rock.durability, 0);
    }
}
