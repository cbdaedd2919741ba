//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики живых существ (faction, health, facing)
//! - movement: перемещение (MovementInput, MoveSpeed, Home, PatrolRoute)
//! - player: игрок (Player marker, Equipped, Inventory, ContactDamage, Stealthed)

pub mod actor;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use player::*;
