//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Entity order is list order (and collision outcomes follow it)
//! - No rendering or platform dependencies

pub mod entity;
pub mod physics;
pub mod spawn;
pub mod strategy;
pub mod world;

pub use entity::{Agent, Entity, EntityKind, Foe, Projectile, Rect, WallSide};
pub use spawn::{FoeRegistry, SpawnPoint, SpawnZone};
pub use strategy::{Brain, Chase, FoeView, Patrol, Strategy, StrategyRegistry};
pub use world::{GameEvent, TickInput, World};
