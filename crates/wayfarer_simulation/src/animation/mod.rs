//! Animation parameters - sink для locomotion blend параметров
//!
//! Rendering/animation backend читает AnimatorParams и сам решает, как блендить.

use bevy::prelude::*;
use std::collections::HashMap;

/// Hashed имя animator параметра
///
/// FNV-1a (64 bit) - const fn, поэтому ID параметров задаются константами.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ParamId(pub u64);

impl ParamId {
    pub const fn from_name(name: &str) -> Self {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let bytes = name.as_bytes();
        let mut hash = OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

/// Скорость вперёд в local space entity (locomotion blend)
pub const FORWARD_SPEED: ParamId = ParamId::from_name("ForwardSpeed");

/// Capability: куда писать float параметры анимации
pub trait AnimationSink {
    fn set_float(&mut self, id: ParamId, value: f32);
}

/// Float параметры animator'а entity
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AnimatorParams {
    floats: HashMap<ParamId, f32>,
}

impl AnimatorParams {
    pub fn float(&self, id: ParamId) -> Option<f32> {
        self.floats.get(&id).copied()
    }
}

impl AnimationSink for AnimatorParams {
    fn set_float(&mut self, id: ParamId, value: f32) {
        self.floats.insert(id, value);
    }
}
