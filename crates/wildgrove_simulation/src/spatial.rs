//! Пространственные запросы поверх снепшотов позиций
//!
//! Адаптер между симуляцией и "миром": дистанции, overlap-круги, поиск
//! ближайшего врага, separation. Все запросы — read-only по Transform
//! на момент начала тика; коллайдеры и физика живут снаружи.

use bevy::prelude::*;

use crate::components::{Actor, Health, Stealthed};

/// Позиция актора в 2D-плоскости (z = слой отрисовки, симуляции не виден)
pub fn position_2d(transform: &Transform) -> Vec2 {
    transform.translation.truncate()
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Ближайший живой враг (другая фракция) в радиусе
///
/// Возвращает (entity, дистанция, цель скрытна).
pub fn nearest_hostile(
    self_entity: Entity,
    self_faction: u64,
    self_pos: Vec2,
    max_range: f32,
    targets: &Query<(Entity, &Actor, &Transform, &Health, Option<&Stealthed>)>,
) -> Option<(Entity, f32, bool)> {
    let mut nearest: Option<(Entity, f32, bool)> = None;

    for (target_entity, target_actor, target_transform, target_health, stealthed) in
        targets.iter()
    {
        if target_entity == self_entity {
            continue;
        }

        // Только враги (другая фракция), только живые
        if target_actor.faction_id == self_faction {
            continue;
        }
        if !target_health.is_alive() {
            continue;
        }

        let dist = distance(self_pos, position_2d(target_transform));
        if dist > max_range {
            continue;
        }

        match nearest {
            Some((_, best, _)) if dist >= best => {}
            _ => nearest = Some((target_entity, dist, stealthed.is_some())),
        }
    }

    nearest
}

/// Entity в круге (контактный урон, подбор лута, хитбоксы)
///
/// Принимает снепшот (entity, позиция); возвращает пары (entity, дистанция),
/// отсортированные по дистанции — детерминированный порядок обхода вместо
/// порядка хранения ECS.
pub fn overlap_circle(
    center: Vec2,
    radius: f32,
    positions: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Vec<(Entity, f32)> {
    let mut hits: Vec<(Entity, f32)> = positions
        .into_iter()
        .map(|(entity, pos)| (entity, distance(center, pos)))
        .filter(|(_, dist)| *dist <= radius)
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.index().cmp(&b.0.index())));
    hits
}

/// Суммарный вектор отталкивания от соседей в радиусе
///
/// Σ normalize(self - neighbor) / max(|self - neighbor|, ε):
/// чем ближе сосед, тем сильнее вклад.
pub fn accumulate_separation(
    self_pos: Vec2,
    neighbors: impl IntoIterator<Item = Vec2>,
    radius: f32,
) -> Vec2 {
    const MIN_DISTANCE: f32 = 0.01;

    let mut separation = Vec2::ZERO;
    for neighbor in neighbors {
        let away = self_pos - neighbor;
        let dist = away.length();
        if dist > radius {
            continue;
        }
        separation += away.normalize_or_zero() / dist.max(MIN_DISTANCE);
    }

    separation
}

/// Вмешивает separation в направление движения
pub fn blend_separation(direction: Vec2, separation: Vec2, force: f32) -> Vec2 {
    (direction + separation * force).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_circle_sorted_by_distance() {
        let positions = [
            (Entity::from_raw(1), Vec2::new(2.0, 0.0)),
            (Entity::from_raw(2), Vec2::new(0.5, 0.0)),
            (Entity::from_raw(3), Vec2::new(9.0, 0.0)), // вне радиуса
        ];

        let hits = overlap_circle(Vec2::ZERO, 3.0, positions);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, Entity::from_raw(2)); // ближайший первым
        assert_eq!(hits[1].0, Entity::from_raw(1));
    }

    #[test]
    fn test_separation_points_away() {
        let self_pos = Vec2::new(0.0, 0.0);
        let neighbor = Vec2::new(0.5, 0.0); // сосед справа, ближе радиуса 1.0

        let separation = accumulate_separation(self_pos, [neighbor], 1.0);

        // Отталкивание влево, от соседа
        assert!(separation.x < 0.0);
        assert_eq!(separation.y, 0.0);
    }

    #[test]
    fn test_separation_ignores_outside_radius() {
        let separation =
            accumulate_separation(Vec2::ZERO, [Vec2::new(5.0, 0.0)], 1.0);
        assert_eq!(separation, Vec2::ZERO);
    }

    #[test]
    fn test_closer_neighbor_pushes_harder() {
        let near = accumulate_separation(Vec2::ZERO, [Vec2::new(0.2, 0.0)], 1.0);
        let far = accumulate_separation(Vec2::ZERO, [Vec2::new(0.9, 0.0)], 1.0);

        assert!(near.length() > far.length());
    }

    #[test]
    fn test_blend_keeps_away_component() {
        // Оба врага идут к одной цели справа, сосед вплотную сверху:
        // итоговый вектор должен иметь составляющую "вниз", от соседа
        let direction = Vec2::new(1.0, 0.0);
        let separation = accumulate_separation(Vec2::ZERO, [Vec2::new(0.0, 0.3)], 1.0);

        let blended = blend_separation(direction, separation, 0.6);

        assert!(blended.y < 0.0);
        assert!(blended.x > 0.0); // к цели все еще движемся
        assert!((blended.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_blend_zero_separation_is_identity() {
        let blended = blend_separation(Vec2::new(0.0, 1.0), Vec2::ZERO, 0.6);
        assert_eq!(blended, Vec2::new(0.0, 1.0));
    }
}
