//! AI decision-making module
//!
//! Один параметризованный FSM для всех врагов: патруль и separation —
//! опции конфига, не отдельные варианты поведения.
//!
//! Порядок выполнения (chained, внутри SimulationSet::Decisions):
//! 1. ai_transitions — обновление EnemyState по дистанциям
//! 2. ai_movement_from_state — конвертация state → MovementInput
//! 3. ai_attack_execution — генерация AttackIntent событий

use bevy::prelude::*;

pub mod fsm;

// Re-export основных типов
pub use fsm::{next_state, EnemyAiConfig, EnemyState, StateChanged, TickInputs};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StateChanged>();

        app.add_systems(
            FixedUpdate,
            (
                fsm::ai_transitions,
                fsm::ai_movement_from_state,
                fsm::ai_attack_execution,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Decisions),
        );
    }
}
