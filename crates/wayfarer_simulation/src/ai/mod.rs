//! AI - простейшее блуждание NPC
//!
//! Wanderer выбирает случайную точку вокруг home, когда его агент простаивает,
//! и отправляет её через MoveRequested (как игрок кликом).

use bevy::prelude::*;
use rand::Rng;

use crate::components::{Health, Mover, Vitality};
use crate::movement::{MoveRequested, MovementSet};
use crate::navigation::NavAgent;
use crate::DeterministicRng;

/// NPC, который бродит вокруг home в радиусе radius (по XZ)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Mover)]
pub struct Wanderer {
    pub home: Vec3,
    pub radius: f32,
}

impl Default for Wanderer {
    fn default() -> Self {
        Self {
            home: Vec3::ZERO,
            radius: 8.0,
        }
    }
}

/// Система: новая точка для простаивающих Wanderer
pub fn wander(
    mut rng: ResMut<DeterministicRng>,
    wanderers: Query<(Entity, &Wanderer, &NavAgent, Option<&Health>)>,
    mut requests: EventWriter<MoveRequested>,
) {
    for (entity, wanderer, agent, health) in wanderers.iter() {
        if health.is_dead() || !agent.enabled || agent.has_path {
            continue;
        }

        let radius = wanderer.radius.max(0.0);
        let offset = Vec3::new(
            rng.rng.gen_range(-radius..=radius),
            0.0,
            rng.rng.gen_range(-radius..=radius),
        );
        let destination = wanderer.home + offset;

        crate::logger::log(&format!(
            "🚶 Wanderer {:?}: new destination {:?}",
            entity, destination
        ));
        requests.write(MoveRequested {
            entity,
            destination,
        });
    }
}

/// AI Plugin
///
/// wander запускается до MovementSet::Commands, чтобы запрос обработался
/// в том же tick.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, wander.before(MovementSet::Commands));
    }
}
