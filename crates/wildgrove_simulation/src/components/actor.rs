//! Базовые компоненты акторов: Actor, Health, Facing

use bevy::prelude::*;

/// Фракция игрока (один актор)
pub const PLAYER_FACTION: u64 = 0;
/// Фракция враждебных NPC
pub const ENEMY_FACTION: u64 = 1;

/// Актор (игрок, враг) — базовый компонент для живых существ
///
/// Автоматически добавляет Health и Facing через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Facing)]
pub struct Actor {
    /// Stable ID фракции (hostility = разные фракции)
    pub faction_id: u64,
}

/// Результат операции над Health
///
/// Системы конвертируют его в события (DamageDealt, Healed, EntityDied),
/// сама структура событий не знает.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Операция проигнорирована: актор мертв, величина нулевая,
    /// или значение и так на границе
    Ignored,
    /// Значение изменилось, актор жив
    Changed { delta: u32 },
    /// Значение упало до нуля — смерть (срабатывает ровно один раз)
    Fatal { delta: u32 },
}

impl HealthChange {
    pub fn delta(&self) -> u32 {
        match self {
            HealthChange::Ignored => 0,
            HealthChange::Changed { delta } | HealthChange::Fatal { delta } => *delta,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, HealthChange::Fatal { .. })
    }
}

/// Здоровье актора
///
/// Инварианты:
/// - 0 ≤ current ≤ max
/// - после смерти (dead = true) ни урон, ни лечение не меняют current;
///   снимает флаг только revive()
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
    dead: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn percentage(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Урон. Мертвым и от нулевой величины — no-op.
    /// Fatal возвращается ровно один раз, на переходе current → 0.
    pub fn take_damage(&mut self, amount: u32) -> HealthChange {
        if self.dead || amount == 0 {
            return HealthChange::Ignored;
        }

        let delta = amount.min(self.current);
        self.current = self.current.saturating_sub(amount);

        if self.current == 0 {
            self.dead = true;
            HealthChange::Fatal { delta }
        } else {
            HealthChange::Changed { delta }
        }
    }

    /// Лечение. Мертвым, от нулевой величины и на полном здоровье — no-op.
    pub fn heal(&mut self, amount: u32) -> HealthChange {
        if self.dead || amount == 0 || self.current == self.max {
            return HealthChange::Ignored;
        }

        let healed = amount.min(self.max - self.current);
        self.current += healed;
        HealthChange::Changed { delta: healed }
    }

    /// Прямое выставление значения (clamp в [0, max]).
    /// Ноль запускает обычный путь смерти.
    pub fn set(&mut self, value: u32) -> HealthChange {
        if self.dead {
            return HealthChange::Ignored;
        }

        let clamped = value.min(self.max);
        if clamped == self.current {
            return HealthChange::Ignored;
        }

        let delta = self.current.abs_diff(clamped);
        self.current = clamped;

        if self.current == 0 {
            self.dead = true;
            HealthChange::Fatal { delta }
        } else {
            HealthChange::Changed { delta }
        }
    }

    /// Полное восстановление. Мертвым — no-op (их возвращает revive).
    pub fn restore_full(&mut self) -> HealthChange {
        if self.dead || self.current == self.max {
            return HealthChange::Ignored;
        }

        let delta = self.max - self.current;
        self.current = self.max;
        HealthChange::Changed { delta }
    }

    /// Воскрешение: безусловно снимает флаг смерти и восстанавливает max.
    pub fn revive(&mut self) {
        self.dead = false;
        self.current = self.max;
    }
}

/// Направление взгляда + доминантная ось последнего движения
///
/// Ось сохраняется через кадры с нулевой скоростью — idle-поза анимации
/// не дергается, когда актор останавливается.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing {
    /// Последнее ненулевое направление движения (unit)
    pub direction: Vec2,
    /// Доминантная ось: (±1, 0) или (0, ±1)
    pub axis: Vec2,
    /// Горизонтальный flip спрайта
    pub flip_x: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            direction: Vec2::NEG_Y, // смотрим "вниз" при спавне
            axis: Vec2::NEG_Y,
            flip_x: false,
        }
    }
}

impl Facing {
    /// Обновление от вектора движения. Нулевой вектор игнорируется —
    /// направление и ось переживают остановку.
    pub fn update(&mut self, movement: Vec2) {
        if movement.length_squared() <= 0.0001 {
            return;
        }

        self.direction = movement.normalize();

        if self.direction.x.abs() > 0.01 {
            self.flip_x = self.direction.x < 0.0;
        }

        self.axis = if self.direction.x.abs() > self.direction.y.abs() {
            Vec2::new(self.direction.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, self.direction.y.signum())
        };
    }
}
