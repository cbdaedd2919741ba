//! WILDGROVE Simulation Core
//!
//! Headless ECS-симуляция боя и AI для 2D action игры (strategic layer).
//! Engine shell (рендер, физика, анимация, input, звук, сцены) — внешний
//! слой: он шлет интенты (StrikeCommand, HealCommand), слушает события
//! (DamageDealt, StateChanged, VictoryAchieved) и рисует результат.
//!
//! Весь тик — одна детерминированная цепочка систем в FixedUpdate:
//! Timers → Decisions → Movement → Strikes → Deaths → Cleanup.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod director;
pub mod logger;
pub mod loot;
pub mod movement;
pub mod spatial;
pub mod timers;

// Re-export базовых типов для удобства
pub use ai::{next_state, AiPlugin, EnemyAiConfig, EnemyState, StateChanged, TickInputs};
pub use combat::{
    AttackIntent, Attacker, Capability, CombatPlugin, DamageDealt, Dead, EntityDied,
    HealCommand, Healed, HealthChanged, Harvestable, HarvestableDepleted, HarvestableShaken,
    Projectile, StrikeCommand, StrikeHitbox, StrikeRejected,
};
pub use components::*;
pub use director::{GameDirector, VictoryAchieved};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use loot::{LootDrop, LootTable, ResourceCollected};
pub use movement::MovementPlugin;
pub use timers::{DespawnAfter, HitRecovery, Invulnerability, RespawnPolicy, RespawnTimer};

/// Фазы симуляционного тика (FixedUpdate, строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Cooldown'ы, окна неуязвимости
    Timers,
    /// AI решения: FSM transitions, movement intent, attack intent
    Decisions,
    /// Интеграция velocity → Transform, полет снарядов
    Movement,
    /// Разрешение ударов и применение урона
    Strikes,
    /// Обработка смертей, лут, победа
    Deaths,
    /// Respawn/despawn таймеры
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (не трогаем seed, если host уже вставил свой)
            .init_resource::<DeterministicRng>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Timers,
                    SimulationSet::Decisions,
                    SimulationSet::Movement,
                    SimulationSet::Strikes,
                    SimulationSet::Deaths,
                    SimulationSet::Cleanup,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((AiPlugin, MovementPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создает minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}

/// Прогоняет ровно `ticks` fixed-тиков, минуя wall-clock
///
/// Time<Fixed> продвигается вручную на свой timestep, затем напрямую
/// запускается FixedUpdate schedule: результат не зависит от реального
/// времени между вызовами (иначе детерминизм тестов случаен).
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();

    for _ in 0..ticks {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты сериализуются через Debug, порядок — по Entity ID.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
