//! Headless navigation backend
//!
//! Straight-line движение к destination без navmesh. Используется когда внешний
//! pathfinding не подключен (headless симуляция, тесты). Obstacles не учитываются.

use bevy::prelude::*;

use super::NavAgent;

/// Forward ось entity в local space (+Z)
pub const LOCAL_FORWARD: Vec3 = Vec3::Z;

/// Система: продвигает агентов к destination
///
/// Работает в FixedUpdate. Пишет NavAgent.velocity (его читает animator sync)
/// и поворачивает entity лицом к направлению движения.
pub fn step_nav_agents(mut query: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in query.iter_mut() {
        if !agent.enabled {
            continue;
        }

        if !agent.is_following_path() {
            if agent.velocity != Vec3::ZERO {
                agent.velocity = Vec3::ZERO;
            }
            continue;
        }

        let to_target = agent.destination - transform.translation;
        let distance = to_target.length();

        if distance <= agent.stopping_distance {
            // Цель достигнута - путь закончен
            agent.velocity = Vec3::ZERO;
            agent.has_path = false;
            continue;
        }

        let direction = to_target / distance;
        let step = (agent.speed * delta).min(distance);

        transform.translation += direction * step;
        agent.velocity = direction * agent.speed;

        let flat = Vec3::new(direction.x, 0.0, direction.z);
        if flat.length_squared() > 1e-6 {
            transform.rotation = Quat::from_rotation_y(flat.x.atan2(flat.z));
        }
    }
}

/// Plugin: headless backend для NavAgent
///
/// Добавлять только когда нет внешнего pathfinding backend'а.
pub struct HeadlessNavigationPlugin;

impl Plugin for HeadlessNavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            step_nav_agents.after(crate::movement::MovementSet::Tick),
        );
    }
}
