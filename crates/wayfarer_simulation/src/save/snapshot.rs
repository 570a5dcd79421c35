//! Pose snapshot: позиция + ориентация entity для save/load
//!
//! Формат версий:
//! - 1..=3: movement данных нет, restore игнорируется
//! - 4: каждый вектор завёрнут в объект `{"x":..,"y":..,"z":..}`
//! - 5+: плоские массивы `[x, y, z]`
//!
//! Каждый legacy формат изолирован в своём decoder'е, чтобы его можно было
//! удалить целиком, когда окно миграции закроется.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SnapshotError;

/// Первая версия save, в которой есть movement данные (wrapped vectors)
pub const WRAPPED_VECTORS_VERSION: u32 = 4;

/// Версия, которую пишет capture
pub const CURRENT_SAVE_VERSION: u32 = 5;

/// Позиция + Euler rotation (градусы), как они лежат в save
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub euler_degrees: Vec3,
}

impl Pose {
    /// Снимает pose с transform (world position + Euler в градусах)
    pub fn from_transform(transform: &Transform) -> Self {
        // Порядок YXZ: сначала Z, потом X, потом Y (yaw последним)
        let (yaw, pitch, roll) = transform.rotation.to_euler(EulerRot::YXZ);
        Self {
            position: transform.translation,
            euler_degrees: Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees()),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.euler_degrees.y.to_radians(),
            self.euler_degrees.x.to_radians(),
            self.euler_degrees.z.to_radians(),
        )
    }

    pub fn apply_to(&self, transform: &mut Transform) {
        transform.translation = self.position;
        transform.rotation = self.rotation();
    }

    /// Текущий формат (плоские массивы)
    pub fn to_value(&self) -> Result<Value, SnapshotError> {
        let snapshot = FlatSnapshot {
            position: self.position.to_array(),
            rotation: self.euler_degrees.to_array(),
        };
        Ok(serde_json::to_value(snapshot)?)
    }
}

/// Save 5+: `{ "Position": [x,y,z], "Rotation": [x,y,z] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlatSnapshot {
    #[serde(rename = "Position")]
    position: [f32; 3],
    #[serde(rename = "Rotation")]
    rotation: [f32; 3],
}

/// Save 4: векторы завёрнуты в отдельный serializable объект
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SerializableVector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<SerializableVector3> for Vec3 {
    fn from(value: SerializableVector3) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedSnapshot {
    #[serde(rename = "Position")]
    pub position: SerializableVector3,
    #[serde(rename = "Rotation")]
    pub rotation: SerializableVector3,
}

/// Способ декодирования pose для конкретной версии save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotDecoder {
    WrappedVectors,
    FlatVectors,
}

/// Выбор decoder'а по версии save. `None` - в этой версии movement данных нет.
///
/// Граница `== 4` / `> 4` фиксирована форматом, не сдвигать.
pub fn decoder_for(version: u32) -> Option<SnapshotDecoder> {
    match version {
        v if v < WRAPPED_VECTORS_VERSION => None,
        WRAPPED_VECTORS_VERSION => Some(SnapshotDecoder::WrappedVectors),
        _ => Some(SnapshotDecoder::FlatVectors),
    }
}

impl SnapshotDecoder {
    pub fn decode(self, state: &Value) -> Result<Pose, SnapshotError> {
        let pose = match self {
            SnapshotDecoder::WrappedVectors => {
                let snapshot = WrappedSnapshot::deserialize(state)?;
                Pose {
                    position: snapshot.position.into(),
                    euler_degrees: snapshot.rotation.into(),
                }
            }
            SnapshotDecoder::FlatVectors => {
                let snapshot = FlatSnapshot::deserialize(state)?;
                Pose {
                    position: Vec3::from_array(snapshot.position),
                    euler_degrees: Vec3::from_array(snapshot.rotation),
                }
            }
        };

        if !pose.position.is_finite() || !pose.euler_degrees.is_finite() {
            return Err(SnapshotError::NonFinite);
        }

        Ok(pose)
    }
}

/// Decode pose для версии save. `Ok(None)` - версия без movement данных.
pub fn decode_pose(version: u32, state: &Value) -> Result<Option<Pose>, SnapshotError> {
    match decoder_for(version) {
        Some(decoder) => decoder.decode(state).map(Some),
        None => Ok(None),
    }
}
