//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (Actor, Health, Vitality)
//! - movement: маркер Mover + пометка SaveableEntity для save/load

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
