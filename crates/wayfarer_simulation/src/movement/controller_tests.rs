//! Tests for MovementController.

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use bevy::prelude::*;
use serde_json::json;

use super::controller::{MovementController, RestoreOutcome, TickOutcome, MOVEMENT};
use crate::actions::{ActionId, ActionScheduler, CurrentAction};
use crate::animation::{AnimationSink, AnimatorParams, FORWARD_SPEED};
use crate::components::Health;
use crate::navigation::{NavAgent, PathAgent};
use crate::save::{decoder_for, SnapshotDecoder, SnapshotError, CURRENT_SAVE_VERSION};

const EPS: f32 = 1e-4;

fn dead() -> Health {
    Health { current: 0, max: 100 }
}

/// Сравниваем повёрнутые оси, а не компоненты кватерниона (q и -q - одно и то же)
fn assert_same_rotation(actual: Quat, expected: Quat) {
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        let diff = (actual * axis - expected * axis).length();
        assert!(diff < 1e-3, "rotation mismatch on {:?}: {:?} vs {:?}", axis, actual, expected);
    }
}

/// Журнал вызовов, общий для scheduler'а и агента
type CallLog = Rc<RefCell<Vec<&'static str>>>;

struct RecordingScheduler {
    calls: CallLog,
    inner: CurrentAction,
}

impl ActionScheduler for RecordingScheduler {
    fn start_action(&mut self, action: ActionId) -> Option<ActionId> {
        self.calls.borrow_mut().push("start_action");
        self.inner.start_action(action)
    }

    fn current_action(&self) -> Option<ActionId> {
        self.inner.current_action()
    }

    fn cancel_current_action(&mut self) -> Option<ActionId> {
        self.inner.cancel_current_action()
    }
}

struct RecordingAgent {
    calls: CallLog,
    inner: NavAgent,
}

impl PathAgent for RecordingAgent {
    fn destination(&self) -> Vec3 {
        self.inner.destination()
    }
    fn set_destination(&mut self, destination: Vec3) {
        self.calls.borrow_mut().push("set_destination");
        self.inner.set_destination(destination);
    }
    fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }
    fn set_stopped(&mut self, stopped: bool) {
        self.calls.borrow_mut().push("set_stopped");
        self.inner.set_stopped(stopped);
    }
    fn velocity(&self) -> Vec3 {
        self.inner.velocity()
    }
    fn set_velocity(&mut self, velocity: Vec3) {
        self.inner.set_velocity(velocity);
    }
    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }
    fn set_enabled(&mut self, enabled: bool) {
        self.inner.set_enabled(enabled);
    }
    fn speed(&self) -> f32 {
        self.inner.speed()
    }
    fn set_speed(&mut self, speed: f32) {
        self.inner.set_speed(speed);
    }
    fn reset_path(&mut self) {
        self.inner.reset_path();
    }
}

// ===== move_to / set_speed / cancel =====

#[test]
fn test_move_to_without_agent_is_noop() {
    let original = Transform::from_xyz(1.0, 2.0, 3.0);
    let mut transform = original;
    let mut animator = AnimatorParams::default();

    let mut controller =
        MovementController::new(&mut transform).with_animator(Some(&mut animator));
    controller.move_to(Vec3::new(50.0, 0.0, -8.0));
    controller.set_speed(9.0);
    controller.cancel();
    assert!(!controller.has_agent());
    assert!(!controller.is_moving());

    assert_eq!(transform, original);
    assert_eq!(animator.float(FORWARD_SPEED), None);
}

#[test]
fn test_move_to_sets_destination_and_unpauses() {
    let mut transform = Transform::default();
    let mut agent = NavAgent {
        stopped: true,
        ..default()
    };

    let target = Vec3::new(4.0, 0.0, -2.0);
    let mut controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));
    controller.move_to(target);
    assert!(controller.is_moving());

    assert_eq!(agent.destination, target);
    assert!(!agent.stopped);
    assert!(agent.has_path);
}

#[test]
fn test_move_to_reissue_is_idempotent() {
    let mut transform = Transform::default();
    let mut agent = NavAgent::default();
    let target = Vec3::new(1.0, 0.0, 1.0);

    let mut controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));
    controller.move_to(target);
    controller.move_to(target);

    assert_eq!(agent.destination, target);
    assert!(!agent.stopped);
}

#[test]
fn test_set_speed_forwards_to_agent() {
    let mut transform = Transform::default();
    let mut agent = NavAgent::default();

    MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .set_speed(6.5);

    assert_eq!(agent.speed, 6.5);
}

#[test]
fn test_cancel_pauses_but_keeps_destination() {
    let mut transform = Transform::default();
    let mut agent = NavAgent::default();
    let target = Vec3::new(0.0, 0.0, 12.0);

    {
        let mut controller =
            MovementController::new(&mut transform).with_agent(Some(&mut agent));
        controller.move_to(target);
        controller.cancel();
        assert!(!controller.is_moving());
    }
    assert!(agent.stopped);
    assert_eq!(agent.destination, target);

    // Повторный move_to продолжает движение
    MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .move_to(target);
    assert!(!agent.stopped);
}

// ===== request_move =====

#[test]
fn test_request_move_starts_action_before_moving() {
    let calls: CallLog = Rc::default();
    let mut scheduler = RecordingScheduler {
        calls: calls.clone(),
        inner: CurrentAction::default(),
    };
    let mut agent = RecordingAgent {
        calls: calls.clone(),
        inner: NavAgent::default(),
    };
    let mut transform = Transform::default();

    MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .request_move(&mut scheduler, Vec3::X);

    assert_eq!(
        *calls.borrow(),
        vec!["start_action", "set_destination", "set_stopped"]
    );
    assert_eq!(scheduler.current_action(), Some(MOVEMENT));
}

#[test]
fn test_request_move_reports_displaced_action() {
    const ATTACK: ActionId = ActionId("attack");
    let mut scheduler = CurrentAction::default();
    scheduler.start_action(ATTACK);

    let mut transform = Transform::default();
    let mut agent = NavAgent::default();
    let mut controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));

    assert_eq!(controller.request_move(&mut scheduler, Vec3::Z), Some(ATTACK));
    // Повторный запрос движения ничего не вытесняет
    assert_eq!(controller.request_move(&mut scheduler, Vec3::X), None);
    assert_eq!(scheduler.current_action(), Some(MOVEMENT));
}

#[test]
fn test_request_move_without_agent_still_takes_ownership() {
    let mut scheduler = CurrentAction::default();
    let mut transform = Transform::default();

    MovementController::new(&mut transform).request_move(&mut scheduler, Vec3::X);

    assert_eq!(scheduler.current_action(), Some(MOVEMENT));
    assert_eq!(transform, Transform::default());
}

// ===== tick / animator sync =====

#[test]
fn test_tick_syncs_local_forward_speed() {
    // Entity повернут лицом к мировому +X
    let mut transform = Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2));
    let mut agent = NavAgent {
        velocity: Vec3::new(2.0, 0.0, 0.0),
        ..default()
    };
    let mut animator = AnimatorParams::default();

    let outcome = MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .with_animator(Some(&mut animator))
        .tick(&Health::default());

    assert_eq!(outcome, TickOutcome::Synced);
    let speed = animator.float(FORWARD_SPEED).unwrap();
    assert!((speed - 2.0).abs() < EPS, "forward speed = {}", speed);
}

#[test]
fn test_sideways_and_backward_velocity() {
    let mut transform = Transform::default(); // forward = +Z
    let mut agent = NavAgent {
        velocity: Vec3::new(3.0, 0.0, 0.0),
        ..default()
    };

    {
        let controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));
        assert!(controller.forward_speed().abs() < EPS);
    }

    agent.velocity = Vec3::new(0.0, 0.0, -1.5);
    let controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));
    assert!((controller.forward_speed() + 1.5).abs() < EPS);
}

#[test]
fn test_tick_without_agent_is_idle() {
    let mut transform = Transform::default();
    let mut animator = AnimatorParams::default();

    let outcome = MovementController::new(&mut transform)
        .with_animator(Some(&mut animator))
        .tick(&dead());

    assert_eq!(outcome, TickOutcome::Idle);
    assert_eq!(animator.float(FORWARD_SPEED), None);
}

#[test]
fn test_death_halts_exactly_once() {
    let position = Vec3::new(3.0, 0.0, 4.0);
    let mut transform = Transform::from_translation(position);
    let mut agent = NavAgent {
        destination: Vec3::new(20.0, 0.0, 20.0),
        has_path: true,
        velocity: Vec3::new(0.0, 0.0, 3.0),
        ..default()
    };
    let mut animator = AnimatorParams::default();
    animator.set_float(FORWARD_SPEED, 3.0);

    let health = dead();
    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let outcome = MovementController::new(&mut transform)
            .with_agent(Some(&mut agent))
            .with_animator(Some(&mut animator))
            .tick(&health);
        outcomes.push(outcome);
    }

    assert_eq!(
        outcomes,
        vec![TickOutcome::Halted, TickOutcome::Idle, TickOutcome::Idle]
    );
    assert_eq!(agent.destination, position);
    assert!(!agent.has_path);
    assert_eq!(agent.velocity, Vec3::ZERO);
    assert!(agent.stopped);
    assert!(!agent.enabled);
    assert_eq!(animator.float(FORWARD_SPEED), Some(0.0));
    assert_eq!(transform.translation, position);
}

#[test]
fn test_dead_entity_ignores_move_after_halt() {
    let mut transform = Transform::default();
    let mut agent = NavAgent::default();

    let health = dead();
    let mut controller = MovementController::new(&mut transform).with_agent(Some(&mut agent));
    controller.tick(&health);
    controller.move_to(Vec3::new(5.0, 0.0, 5.0));
    assert_eq!(controller.tick(&health), TickOutcome::Idle);

    // Выключенный агент не получает путь
    assert!(!agent.enabled);
    assert!(!agent.is_following_path());
}

// ===== save / load =====

#[test]
fn test_capture_restore_round_trip_current_version() {
    let mut source = Transform::from_xyz(7.5, 0.25, -3.0);
    source.rotation = Quat::from_euler(
        EulerRot::YXZ,
        135f32.to_radians(),
        10f32.to_radians(),
        -5f32.to_radians(),
    );

    let state = MovementController::new(&mut source)
        .capture_state()
        .unwrap();

    let mut target = Transform::default();
    let mut agent = NavAgent::default();
    let outcome = MovementController::new(&mut target)
        .with_agent(Some(&mut agent))
        .restore_state(&state, CURRENT_SAVE_VERSION)
        .unwrap();

    assert_eq!(outcome, RestoreOutcome::Applied);
    assert!((target.translation - source.translation).length() < EPS);
    assert_same_rotation(target.rotation, source.rotation);
    assert!(agent.enabled, "agent must be re-enabled after restore");
}

#[test]
fn test_restore_drops_stale_path() {
    let mut transform = Transform::default();
    let mut agent = NavAgent::default();
    agent.set_destination(Vec3::new(30.0, 0.0, 0.0));

    let state = json!({ "Position": [1.0, 0.0, 1.0], "Rotation": [0.0, 0.0, 0.0] });
    MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .restore_state(&state, CURRENT_SAVE_VERSION)
        .unwrap();

    assert!(agent.enabled);
    assert!(!agent.has_path);
    assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 1.0));
}

#[test]
fn test_restore_pre_history_version_is_ignored() {
    let original = Transform::from_xyz(-1.0, 0.0, 2.0);
    let mut transform = original;
    let mut agent = NavAgent {
        enabled: false,
        ..default()
    };

    let state = json!({ "Position": [9.0, 9.0, 9.0], "Rotation": [0.0, 45.0, 0.0] });
    let outcome = MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .restore_state(&state, 3)
        .unwrap();

    assert_eq!(outcome, RestoreOutcome::Ignored);
    assert_eq!(transform, original);
    assert!(!agent.enabled, "ignored restore must not touch the agent");
}

#[test]
fn test_restore_wrapped_vectors_version_4() {
    let state = json!({
        "Position": { "x": 1.0, "y": 2.0, "z": 3.0 },
        "Rotation": { "x": 0.0, "y": 90.0, "z": 0.0 },
    });

    let mut transform = Transform::default();
    MovementController::new(&mut transform)
        .restore_state(&state, 4)
        .unwrap();

    assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
    assert_same_rotation(transform.rotation, Quat::from_rotation_y(FRAC_PI_2));

    let euler = MovementController::new(&mut transform).capture().euler_degrees;
    assert!((euler - Vec3::new(0.0, 90.0, 0.0)).length() < 1e-2, "euler = {:?}", euler);
}

#[test]
fn test_current_version_rejects_wrapped_vectors() {
    let state = json!({
        "Position": { "x": 1.0, "y": 2.0, "z": 3.0 },
        "Rotation": { "x": 0.0, "y": 90.0, "z": 0.0 },
    });
    let original = Transform::from_xyz(5.0, 5.0, 5.0);
    let mut transform = original;

    let result = MovementController::new(&mut transform).restore_state(&state, CURRENT_SAVE_VERSION);

    assert!(matches!(result, Err(SnapshotError::Json(_))));
    assert_eq!(transform, original);
}

#[test]
fn test_malformed_snapshot_leaves_transform_untouched() {
    let original = Transform::from_xyz(0.5, 0.0, 0.5);
    let mut transform = original;
    let mut agent = NavAgent::default();

    let state = json!({ "Position": [1.0, 2.0] });
    let result = MovementController::new(&mut transform)
        .with_agent(Some(&mut agent))
        .restore_state(&state, CURRENT_SAVE_VERSION);

    assert!(result.is_err());
    assert_eq!(transform, original);
    assert!(agent.enabled);
}

#[test]
fn test_decoder_boundaries() {
    assert_eq!(decoder_for(0), None);
    assert_eq!(decoder_for(3), None);
    assert_eq!(decoder_for(4), Some(SnapshotDecoder::WrappedVectors));
    assert_eq!(decoder_for(5), Some(SnapshotDecoder::FlatVectors));
    assert_eq!(decoder_for(42), Some(SnapshotDecoder::FlatVectors));
}
