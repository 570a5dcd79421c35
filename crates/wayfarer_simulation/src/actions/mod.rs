//! Action scheduling - кто сейчас "владеет" entity
//!
//! В каждый момент у entity максимум одно текущее действие (movement, атака, ...).
//! Новое действие вытесняет старое; вытесненный владелец получает ActionCanceled
//! и сам останавливает свою активность.

use bevy::prelude::*;

/// Идентификатор действия (movement, attack, interaction...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub &'static str);

/// Capability: арбитр текущего действия
pub trait ActionScheduler {
    /// Делает `action` текущим. Возвращает вытесненное действие (если было другое).
    fn start_action(&mut self, action: ActionId) -> Option<ActionId>;

    fn current_action(&self) -> Option<ActionId>;

    /// Снимает текущее действие, возвращает его
    fn cancel_current_action(&mut self) -> Option<ActionId>;
}

/// Текущее действие entity
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentAction {
    action: Option<ActionId>,
}

impl ActionScheduler for CurrentAction {
    fn start_action(&mut self, action: ActionId) -> Option<ActionId> {
        if self.action == Some(action) {
            return None;
        }
        self.action.replace(action)
    }

    fn current_action(&self) -> Option<ActionId> {
        self.action
    }

    fn cancel_current_action(&mut self) -> Option<ActionId> {
        self.action.take()
    }
}

/// Event: действие entity отменено (вытеснено или снято явно)
///
/// Каждый владелец действия слушает этот event и останавливает себя,
/// если `action` - его.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCanceled {
    pub entity: Entity,
    pub action: ActionId,
}

/// Event: снять текущее действие entity (player "stop", cutscene start)
#[derive(Event, Debug, Clone, Copy)]
pub struct CancelActionRequested {
    pub entity: Entity,
}

/// Система: обработка CancelActionRequested
pub fn process_cancel_requests(
    mut requests: EventReader<CancelActionRequested>,
    mut schedulers: Query<&mut CurrentAction>,
    mut canceled: EventWriter<ActionCanceled>,
) {
    for request in requests.read() {
        let Ok(mut scheduler) = schedulers.get_mut(request.entity) else {
            continue;
        };

        if let Some(action) = scheduler.cancel_current_action() {
            crate::logger::log(&format!(
                "Entity {:?}: action '{}' canceled by request",
                request.entity, action.0
            ));
            canceled.write(ActionCanceled {
                entity: request.entity,
                action,
            });
        }
    }
}
