//! Save/load - persistence позы Mover entity
//!
//! SaveFile хранит версию формата out-of-band (одна на файл) и state каждого
//! SaveableEntity под ключом компонента ("Mover").
//!
//! Restore никогда не паникует: битый или отсутствующий state пропускается
//! с warning'ом, остальные entity восстанавливаются.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub mod snapshot;


pub use snapshot::{
    decode_pose, decoder_for, Pose, SerializableVector3, SnapshotDecoder, WrappedSnapshot,
    CURRENT_SAVE_VERSION, WRAPPED_VECTORS_VERSION,
};

use crate::components::{Mover, SaveableEntity};
use crate::logger;
use crate::movement::{MovementController, RestoreOutcome};
use crate::navigation::{NavAgent, PathAgent};

/// Ключ movement state внутри записи entity
pub const MOVER_STATE_KEY: &str = "Mover";

/// Ошибка декодирования pose snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed pose snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pose snapshot contains non-finite values")]
    NonFinite,
}

/// Ошибка чтения/записи save файла
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Save файл целиком
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    /// SaveableEntity.id → (component key → state)
    pub entities: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Default for SaveFile {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            entities: BTreeMap::new(),
        }
    }
}

impl SaveFile {
    pub fn mover_state(&self, id: &str) -> Option<&Value> {
        self.entities.get(id)?.get(MOVER_STATE_KEY)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Итог restore_world (для логов и тестов)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub applied: usize,
    /// Версия save без movement данных
    pub ignored: usize,
    /// Битый state, entity пропущен
    pub malformed: usize,
    /// Entity в мире без записи в save
    pub missing: usize,
}

/// Снимает позы всех сохраняемых Mover в SaveFile текущей версии
pub fn capture_world(world: &mut World) -> Result<SaveFile, SaveError> {
    let mut save = SaveFile::default();

    let mut query = world.query_filtered::<(&SaveableEntity, &Transform), With<Mover>>();
    for (saveable, transform) in query.iter(world) {
        let state = Pose::from_transform(transform).to_value()?;
        save.entities
            .entry(saveable.id.clone())
            .or_default()
            .insert(MOVER_STATE_KEY.to_string(), state);
    }

    logger::log_info(&format!(
        "💾 Captured {} entities (save v{})",
        save.entities.len(),
        save.version
    ));
    Ok(save)
}

/// Восстанавливает позы Mover из SaveFile
pub fn restore_world(world: &mut World, save: &SaveFile) -> RestoreReport {
    let mut report = RestoreReport::default();

    let mut query = world
        .query_filtered::<(&SaveableEntity, &mut Transform, Option<&mut NavAgent>), With<Mover>>();
    for (saveable, mut transform, mut agent) in query.iter_mut(world) {
        let Some(state) = save.mover_state(&saveable.id) else {
            report.missing += 1;
            continue;
        };

        let result = MovementController::new(&mut transform)
            .with_agent(agent.as_deref_mut().map(|agent| agent as &mut dyn PathAgent))
            .restore_state(state, save.version);

        match result {
            Ok(RestoreOutcome::Applied) => report.applied += 1,
            Ok(RestoreOutcome::Ignored) => report.ignored += 1,
            Err(err) => {
                logger::log_warning(&format!(
                    "Restore skipped for '{}': {}",
                    saveable.id, err
                ));
                report.malformed += 1;
            }
        }
    }

    logger::log_info(&format!("💾 Restore (save v{}): {:?}", save.version, report));
    report
}
