//! Movement events

use bevy::prelude::*;

/// Event: entity должен идти к destination
///
/// Генерируется:
/// - AI (Wanderer) при выборе новой точки
/// - Player input (click-to-move) на стороне host'а
///
/// Обрабатывается: process_move_requests (movement становится текущим действием)
#[derive(Event, Debug, Clone, Copy)]
pub struct MoveRequested {
    pub entity: Entity,
    pub destination: Vec3,
}

/// Event: сменить скорость агента (м/с)
#[derive(Event, Debug, Clone, Copy)]
pub struct SpeedRequested {
    pub entity: Entity,
    pub speed: f32,
}

/// Event: entity умер и его агент выключен
///
/// Один раз на смерть. Restore снова включает агента, поэтому мёртвый entity
/// после restore получит ещё один MoverHalted на следующем tick.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverHalted {
    pub entity: Entity,
}
