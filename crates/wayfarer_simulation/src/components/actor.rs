//! Базовые компоненты акторов: Actor, Health, Vitality

use bevy::prelude::*;

/// Актор (NPC, игрок) - базовый компонент для живых существ
///
/// Автоматически добавляет Health через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Actor {
    /// Stable ID фракции
    pub faction_id: u64,
}

/// Жив ли владелец entity
///
/// Movement читает только этот флаг; кто и как наносит урон - не его забота.
pub trait Vitality {
    fn is_dead(&self) -> bool;
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

impl Vitality for Health {
    fn is_dead(&self) -> bool {
        !self.is_alive()
    }
}

/// Entity без компонента здоровья считается живым
impl<T: Vitality> Vitality for Option<&T> {
    fn is_dead(&self) -> bool {
        self.is_some_and(|vitality| vitality.is_dead())
    }
}
