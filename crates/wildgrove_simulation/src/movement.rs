//! Интеграция движения: MovementInput → Transform на fixed-шаге
//!
//! Решения (кто куда идет) принимаются AI/внешним input'ом раньше в тике;
//! здесь только velocity × dt и обновление взгляда.

use bevy::prelude::*;

use crate::combat::Dead;
use crate::components::{Facing, MoveSpeed, MovementInput};
use crate::SimulationSet;

/// Система: применение движения
///
/// Нулевой input оставляет Facing нетронутым (анти-мерцание idle-позы).
pub fn apply_movement(
    mut query: Query<(&MovementInput, &MoveSpeed, &mut Transform, &mut Facing), Without<Dead>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (input, speed, mut transform, mut facing) in query.iter_mut() {
        if input.direction.length_squared() <= 0.0001 {
            continue;
        }

        let velocity = input.direction * speed.speed;
        transform.translation += (velocity * delta).extend(0.0);
        facing.update(input.direction);
    }
}

/// Plugin движения (fixed-шаг, после AI решений)
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            apply_movement.in_set(SimulationSet::Movement),
        );
    }
}
