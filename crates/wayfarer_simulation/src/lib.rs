//! Wayfarer Simulation Core
//!
//! Headless ECS-симуляция на Bevy 0.16: movement intent акторов,
//! animator sync и save/load их позы.
//!
//! Разделение ответственности:
//! - ECS = movement intent, action ownership, смерть, persistence
//! - Host (engine bridge) = pathfinding, rendering, animation blending
//!
//! Без host'а навигацию подменяет HeadlessNavigationPlugin (straight-line).

use bevy::ecs::event::event_update_system;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod actions;
pub mod ai;
pub mod animation;
pub mod components;
pub mod logger;
pub mod movement;
pub mod navigation;
pub mod save;

pub use actions::{ActionCanceled, ActionId, ActionScheduler, CancelActionRequested, CurrentAction};
pub use ai::{AIPlugin, Wanderer};
pub use animation::{AnimationSink, AnimatorParams, ParamId, FORWARD_SPEED};
pub use components::*;
pub use movement::{
    MoveRequested, MoverHalted, MovementController, MovementPlugin, MovementSet, RestoreOutcome,
    SpeedRequested, TickOutcome, MOVEMENT,
};
pub use navigation::{HeadlessNavigationPlugin, NavAgent, PathAgent};
pub use save::{
    capture_world, restore_world, Pose, RestoreReport, SaveError, SaveFile, SnapshotError,
    CURRENT_SAVE_VERSION,
};

/// Настройки симуляции
#[derive(Resource, Debug, Clone)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f64,
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Скорость агента по умолчанию (м/с) для spawn_mover
    pub default_agent_speed: f32,
    /// Дистанция "цель достигнута" (м)
    pub stopping_distance: f32,
    /// Подключать straight-line навигацию (false - pathfinding даёт host)
    pub headless_navigation: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            default_agent_speed: 3.5,
            stopping_distance: 0.1,
            headless_navigation: true,
        }
    }
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz))
            .insert_resource(self.config.clone());

        // create_headless_app уже мог положить RNG со своим seed
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(self.config.seed));
        }

        app.add_plugins((MovementPlugin, AIPlugin));

        if self.config.headless_navigation {
            app.add_plugins(HeadlessNavigationPlugin);
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Один детерминированный simulation tick
///
/// Host вызывает его сам вместо app.update(): дельта всегда равна fixed
/// timestep, поэтому прогон не зависит от реального времени.
///
/// First (и вместе с ним swap event буферов) здесь не запускается, поэтому
/// event'ы обновляем сами после FixedUpdate: event живёт два tick'а.
pub fn run_fixed_tick(app: &mut App) {
    let world = app.world_mut();
    let timestep = world.resource::<Time<Fixed>>().timestep();
    world.resource_mut::<Time>().advance_by(timestep);
    world.run_schedule(FixedUpdate);

    if let Err(err) = world.run_system_once(event_update_system) {
        logger::log_error(&format!("Event buffers not updated: {}", err));
    }
}

/// Spawn helper: Mover с агентом, animator'ом и scheduler'ом
pub fn spawn_mover(
    commands: &mut Commands,
    config: &SimulationConfig,
    id: impl Into<String>,
    position: Vec3,
) -> Entity {
    let agent = NavAgent {
        destination: position,
        speed: config.default_agent_speed,
        stopping_distance: config.stopping_distance,
        ..default()
    };

    commands
        .spawn((
            Actor::default(),
            Mover,
            SaveableEntity::new(id),
            Transform::from_translation(position),
            agent,
            AnimatorParams::default(),
            CurrentAction::default(),
        ))
        .id()
}

/// Snapshot мира для сравнения детерминизма
///
/// Байты Debug-представления компонента, отсортированные по Entity index.
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
