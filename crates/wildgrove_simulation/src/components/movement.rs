//! Movement компоненты: входной вектор, скорость, дом, маршрут патруля

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Входной вектор движения (high-level intent)
///
/// AI-системы и внешний input-слой пишут direction на логическом тике,
/// интеграция в Transform происходит на fixed тике.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    /// Направление движения (normalized или ZERO)
    pub direction: Vec2,
}

/// Скорость движения актора (метры/сек)
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MoveSpeed {
    pub speed: f32,
}

impl Default for MoveSpeed {
    fn default() -> Self {
        Self { speed: 2.0 } // базовая скорость ходьбы NPC
    }
}

/// Домашняя позиция — точка спавна, к ней возвращается AI из погони
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Home {
    pub position: Vec2,
}

impl Home {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }
}

/// Маршрут патруля: упорядоченные waypoint'ы, обход по кругу
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<Vec2>,
    pub current: usize,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points, current: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn current_point(&self) -> Option<Vec2> {
        self.points.get(self.current).copied()
    }

    /// Переход к следующему waypoint (wrap по кругу)
    pub fn advance(&mut self) {
        if !self.points.is_empty() {
            self.current = (self.current + 1) % self.points.len();
        }
    }
}
