//! Capability — классификация инструмента/оружия удара
//!
//! Диспетчер урона матчит по классификации, а не по runtime-типу цели:
//! ресурсы требуют точного совпадения, боевые акторы принимают только оружие.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Чем наносится удар
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Capability {
    Sword,
    Axe,
    Pick,
    Hoe,
    Bow,
}

impl Capability {
    /// Порядок слотов экипировки (циклическое переключение)
    pub const ALL: [Capability; 5] = [
        Capability::Sword,
        Capability::Axe,
        Capability::Pick,
        Capability::Hoe,
        Capability::Bow,
    ];

    /// Оружие ранит боевых акторов; инструменты — только harvestables
    pub fn is_weapon(&self) -> bool {
        matches!(self, Capability::Sword | Capability::Bow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Sword => "sword",
            Capability::Axe => "axe",
            Capability::Pick => "pick",
            Capability::Hoe => "hoe",
            Capability::Bow => "bow",
        }
    }
}
