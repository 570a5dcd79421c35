//! Navigation domain - path-following агент
//!
//! Содержит:
//! - PathAgent (capability: то, что MovementController умеет просить у навигации)
//! - NavAgent (ECS компонент, реализующий PathAgent)
//! - headless (straight-line backend для headless симуляции и тестов)
//!
//! Реальный pathfinding (navmesh, avoidance) живёт во внешнем backend'е:
//! он читает NavAgent.destination и пишет NavAgent.velocity.

use bevy::prelude::*;

pub mod headless;

pub use headless::{step_nav_agents, HeadlessNavigationPlugin};

/// Capability: агент, который ведёт entity к destination
pub trait PathAgent {
    fn destination(&self) -> Vec3;
    fn set_destination(&mut self, destination: Vec3);

    fn is_stopped(&self) -> bool;
    fn set_stopped(&mut self, stopped: bool);

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);

    /// Сбросить текущий путь (destination остаётся как есть)
    fn reset_path(&mut self);
}

/// Navigation агент entity
///
/// Инварианты:
/// - disabled агент не имеет пути и не двигается
/// - set_destination на enabled агенте всегда выставляет путь
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub destination: Vec3,
    pub stopped: bool,
    pub velocity: Vec3,
    pub enabled: bool,
    /// true пока агент ведёт entity к destination
    pub has_path: bool,
    /// Метры в секунду
    pub speed: f32,
    /// Дистанция, на которой цель считается достигнутой
    pub stopping_distance: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: Vec3::ZERO,
            stopped: false,
            velocity: Vec3::ZERO,
            enabled: true,
            has_path: false,
            speed: 3.5,
            stopping_distance: 0.1,
        }
    }
}

impl NavAgent {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..default()
        }
    }

    /// Агент активно ведёт entity (есть путь, не на паузе, включён)
    pub fn is_following_path(&self) -> bool {
        self.enabled && self.has_path && !self.stopped
    }
}

impl PathAgent for NavAgent {
    fn destination(&self) -> Vec3 {
        self.destination
    }

    fn set_destination(&mut self, destination: Vec3) {
        self.destination = destination;
        if self.enabled {
            self.has_path = true;
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
        if stopped {
            self.velocity = Vec3::ZERO;
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            // Выключенный агент теряет путь: после включения он стоит на месте
            self.has_path = false;
            self.velocity = Vec3::ZERO;
        }
        self.enabled = enabled;
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn reset_path(&mut self) {
        self.has_path = false;
    }
}
