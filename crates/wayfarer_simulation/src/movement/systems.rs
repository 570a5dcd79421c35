//! Movement systems - ECS обвязка MovementController

use bevy::prelude::*;

use super::{MoveRequested, MoverHalted, MovementController, SpeedRequested, TickOutcome, MOVEMENT};
use crate::actions::{ActionCanceled, CurrentAction};
use crate::animation::{AnimationSink, AnimatorParams};
use crate::components::{Health, Mover};
use crate::logger;
use crate::navigation::{NavAgent, PathAgent};
use crate::SimulationConfig;

fn path_agent<'a>(agent: &'a mut Option<Mut<NavAgent>>) -> Option<&'a mut dyn PathAgent> {
    agent.as_deref_mut().map(|agent| agent as &mut dyn PathAgent)
}

fn animation_sink<'a>(
    animator: &'a mut Option<Mut<AnimatorParams>>,
) -> Option<&'a mut dyn AnimationSink> {
    animator.as_deref_mut().map(|animator| animator as &mut dyn AnimationSink)
}

/// Система: initialize для только что появившихся Mover
///
/// Агент получает скорость и stopping distance из SimulationConfig.
pub fn initialize_movers(
    config: Res<SimulationConfig>,
    mut query: Query<
        (Entity, &mut Transform, Option<&mut NavAgent>, Option<&mut AnimatorParams>),
        Added<Mover>,
    >,
) {
    for (entity, mut transform, mut agent, mut animator) in query.iter_mut() {
        match agent.as_deref_mut() {
            Some(agent) => {
                agent.set_speed(config.default_agent_speed);
                agent.stopping_distance = config.stopping_distance.max(0.0);
            }
            None => logger::log_warning(&format!(
                "Entity {:?}: Mover без NavAgent - movement команды будут игнорироваться",
                entity
            )),
        }

        MovementController::new(&mut transform)
            .with_agent(path_agent(&mut agent))
            .with_animator(animation_sink(&mut animator))
            .initialize();
    }
}

/// Система: MoveRequested → request_move
///
/// Movement становится текущим действием entity. Вытесненное действие
/// получает ActionCanceled (его владелец сам остановится).
pub fn process_move_requests(
    mut requests: EventReader<MoveRequested>,
    mut movers: Query<
        (&mut Transform, Option<&mut NavAgent>, Option<&mut CurrentAction>),
        With<Mover>,
    >,
    mut canceled: EventWriter<ActionCanceled>,
) {
    for request in requests.read() {
        let Ok((mut transform, mut agent, scheduler)) = movers.get_mut(request.entity) else {
            logger::log_warning(&format!(
                "MoveRequested: entity {:?} is not a Mover",
                request.entity
            ));
            continue;
        };

        let mut controller =
            MovementController::new(&mut transform).with_agent(path_agent(&mut agent));

        let displaced = match scheduler {
            Some(mut scheduler) => controller.request_move(&mut *scheduler, request.destination),
            None => {
                // Без scheduler'а арбитража нет - просто идём
                controller.move_to(request.destination);
                None
            }
        };

        if let Some(action) = displaced {
            canceled.write(ActionCanceled {
                entity: request.entity,
                action,
            });
        }
    }
}

/// Система: SpeedRequested → set_speed
pub fn process_speed_requests(
    mut requests: EventReader<SpeedRequested>,
    mut movers: Query<(&mut Transform, Option<&mut NavAgent>), With<Mover>>,
) {
    for request in requests.read() {
        let Ok((mut transform, mut agent)) = movers.get_mut(request.entity) else {
            continue;
        };

        MovementController::new(&mut transform)
            .with_agent(path_agent(&mut agent))
            .set_speed(request.speed);
    }
}

/// Система: движение вытеснено другим действием → пауза агента
pub fn cancel_preempted_movement(
    mut canceled: EventReader<ActionCanceled>,
    mut movers: Query<(&mut Transform, Option<&mut NavAgent>), With<Mover>>,
) {
    for event in canceled.read() {
        if event.action != MOVEMENT {
            continue;
        }

        let Ok((mut transform, mut agent)) = movers.get_mut(event.entity) else {
            continue;
        };

        MovementController::new(&mut transform)
            .with_agent(path_agent(&mut agent))
            .cancel();
    }
}

/// Система: per-tick update всех Mover
///
/// Живые - animator sync. Умершие на этом tick - остановка + выключение агента
/// и один MoverHalted.
pub fn tick_movers(
    mut movers: Query<
        (
            Entity,
            &mut Transform,
            Option<&mut NavAgent>,
            Option<&mut AnimatorParams>,
            Option<&Health>,
        ),
        With<Mover>,
    >,
    mut halted: EventWriter<MoverHalted>,
) {
    for (entity, mut transform, mut agent, mut animator, health) in movers.iter_mut() {
        let outcome = MovementController::new(&mut transform)
            .with_agent(path_agent(&mut agent))
            .with_animator(animation_sink(&mut animator))
            .tick(&health);

        if outcome == TickOutcome::Halted {
            logger::log_info(&format!("💀 Entity {:?}: dead, navigation disabled", entity));
            halted.write(MoverHalted { entity });
        }
    }
}
