//! Movement domain - movement intent, animator sync, save/load позы
//!
//! Содержит:
//! - MovementController (логика одного entity поверх capabilities)
//! - events (MoveRequested, SpeedRequested, MoverHalted)
//! - systems (ECS обвязка controller'а)
//!
//! Порядок в FixedUpdate (MovementSet):
//! 1. Commands - move/speed/cancel запросы, отмена вытесненного movement
//! 2. Tick - смерть + animator sync
//!
//! Navigation backend (headless или внешний) двигает агентов после Tick.

use bevy::prelude::*;

pub mod controller;
pub mod events;
pub mod systems;

#[cfg(test)]
mod controller_tests;

pub use controller::{MovementController, RestoreOutcome, TickOutcome, MOVEMENT};
pub use events::*;
pub use systems::*;

use crate::actions::{process_cancel_requests, ActionCanceled, CancelActionRequested};
use crate::SimulationConfig;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovementSet {
    Commands,
    Tick,
}

/// Movement Plugin
///
/// Регистрирует events и movement системы в FixedUpdate.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        // SimulationPlugin кладёт свой config раньше, init его не перезапишет
        app.init_resource::<SimulationConfig>();

        app.add_event::<MoveRequested>()
            .add_event::<SpeedRequested>()
            .add_event::<MoverHalted>()
            .add_event::<ActionCanceled>()
            .add_event::<CancelActionRequested>();

        app.configure_sets(
            FixedUpdate,
            (MovementSet::Commands, MovementSet::Tick).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                initialize_movers,
                process_move_requests,
                process_speed_requests,
                process_cancel_requests,
                cancel_preempted_movement,
            )
                .chain()
                .in_set(MovementSet::Commands),
        )
        .add_systems(FixedUpdate, tick_movers.in_set(MovementSet::Tick));
    }
}
