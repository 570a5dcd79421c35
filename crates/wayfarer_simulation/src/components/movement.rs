//! Movement компоненты

use bevy::prelude::*;

/// Entity, которым управляет MovementController
///
/// Сам компонент состояния не хранит: всё runtime-состояние живёт в NavAgent
/// (если он есть). Required Transform - controller пишет в него при restore.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Mover;

/// Stable ID entity для save/load (переживает перезапуск сессии)
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveableEntity {
    pub id: String,
}

impl SaveableEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
