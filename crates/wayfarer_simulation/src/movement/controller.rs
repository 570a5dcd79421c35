//! MovementController - movement intent одного entity
//!
//! Controller - короткоживущий view поверх компонентов entity, собирается
//! заново на каждый вызов системы. Опциональные capabilities (агент, animator)
//! передаются явно при сборке: нет агента - все movement операции no-op.

use bevy::prelude::*;
use serde_json::Value;

use crate::actions::{ActionId, ActionScheduler};
use crate::animation::{AnimationSink, FORWARD_SPEED};
use crate::components::Vitality;
use crate::navigation::PathAgent;
use crate::save::{decode_pose, Pose, SnapshotError};

/// Action ID, под которым movement регистрируется в ActionScheduler
pub const MOVEMENT: ActionId = ActionId("movement");

/// Что произошло за tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Нет агента или entity уже мёртв и агент выключен
    Idle,
    /// Animator синхронизирован со скоростью агента
    Synced,
    /// Entity умер на этом tick: агент остановлен и выключен навсегда
    Halted,
}

/// Результат restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Версия save без movement данных, transform не тронут
    Ignored,
    Applied,
}

pub struct MovementController<'a> {
    transform: &'a mut Transform,
    agent: Option<&'a mut dyn PathAgent>,
    animator: Option<&'a mut dyn AnimationSink>,
}

impl<'a> MovementController<'a> {
    pub fn new(transform: &'a mut Transform) -> Self {
        Self {
            transform,
            agent: None,
            animator: None,
        }
    }

    pub fn with_agent(mut self, agent: Option<&'a mut dyn PathAgent>) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_animator(mut self, animator: Option<&'a mut dyn AnimationSink>) -> Self {
        self.animator = animator;
        self
    }

    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Агент ведёт entity (enabled и не на паузе)
    pub fn is_moving(&self) -> bool {
        self.agent
            .as_deref()
            .is_some_and(|agent| agent.is_enabled() && !agent.is_stopped())
    }

    /// Initialize: публикует стартовый ForwardSpeed до первого tick
    pub fn initialize(&mut self) {
        self.sync_animator();
    }

    /// Movement становится текущим действием entity, затем move_to.
    ///
    /// Возвращает действие, которое было вытеснено (его владелец должен
    /// получить отмену).
    pub fn request_move(
        &mut self,
        scheduler: &mut dyn ActionScheduler,
        destination: Vec3,
    ) -> Option<ActionId> {
        let displaced = scheduler.start_action(MOVEMENT);
        self.move_to(destination);
        displaced
    }

    pub fn move_to(&mut self, destination: Vec3) {
        let Some(agent) = self.agent.as_deref_mut() else {
            return;
        };
        agent.set_destination(destination);
        agent.set_stopped(false);
    }

    pub fn set_speed(&mut self, speed: f32) {
        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_speed(speed);
        }
    }

    /// Пауза агента. Destination сохраняется - move_to продолжит движение.
    pub fn cancel(&mut self) {
        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_stopped(true);
        }
    }

    pub fn tick(&mut self, vitality: &dyn Vitality) -> TickOutcome {
        let Some(enabled) = self.agent.as_deref().map(|agent| agent.is_enabled()) else {
            return TickOutcome::Idle;
        };

        if !vitality.is_dead() {
            self.sync_animator();
            return TickOutcome::Synced;
        }

        // Смерть необратима: выключенный агент мёртвого entity больше не трогаем
        if !enabled {
            return TickOutcome::Idle;
        }

        let here = self.transform.translation;
        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_destination(here);
            agent.reset_path();
            agent.set_velocity(Vec3::ZERO);
            agent.set_stopped(true);
        }
        self.sync_animator();
        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_enabled(false);
        }

        TickOutcome::Halted
    }

    /// Скорость вперёд в local space: z-компонента velocity агента,
    /// переведённой в систему координат entity
    pub fn forward_speed(&self) -> f32 {
        let velocity = self
            .agent
            .as_deref()
            .map(|agent| agent.velocity())
            .unwrap_or(Vec3::ZERO);
        (self.transform.rotation.inverse() * velocity).z
    }

    fn sync_animator(&mut self) {
        let speed = self.forward_speed();
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.set_float(FORWARD_SPEED, speed);
        }
    }

    pub fn capture(&self) -> Pose {
        Pose::from_transform(&*self.transform)
    }

    pub fn capture_state(&self) -> Result<Value, SnapshotError> {
        self.capture().to_value()
    }

    /// Телепорт в pose. Агент выключается на время записи transform,
    /// чтобы не корректировать телепорт своим путём.
    pub fn restore(&mut self, pose: &Pose) {
        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_enabled(false);
        }

        pose.apply_to(self.transform);

        if let Some(agent) = self.agent.as_deref_mut() {
            agent.set_enabled(true);
        }
    }

    pub fn restore_state(
        &mut self,
        state: &Value,
        version: u32,
    ) -> Result<RestoreOutcome, SnapshotError> {
        match decode_pose(version, state)? {
            Some(pose) => {
                self.restore(&pose);
                Ok(RestoreOutcome::Applied)
            }
            None => Ok(RestoreOutcome::Ignored),
        }
    }
}
