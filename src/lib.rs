//! Ledgewalker - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, enemy AI, spawning)
//! - `level`: Level-data ingestion (walls, foe placements, spawn zones)
//! - `tuning`: Data-driven game balance
//! - `stats`: Score and kill-counter bookkeeping
//!
//! Rendering, audio, raw input capture and on-disk persistence are external
//! collaborators: the library consumes a per-tick input snapshot and exposes
//! entity state plus a stream of `GameEvent`s for whoever draws or saves.

pub mod level;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use sim::{GameEvent, TickInput, World};
pub use stats::Scoreboard;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// World tile size; also the enemy separation threshold
    pub const TILE_SIZE: f32 = 32.0;

    /// Downward acceleration, world units per second squared (y-up world)
    pub const GRAVITY: f32 = -1800.0;

    /// Enemy separation push, world units per second; each crowding pair
    /// contributes exactly `SEPARATION_PUSH * dt` of displacement per frame
    pub const SEPARATION_PUSH: f32 = 48.0;

    /// Ally contact longer than this forces a patrol direction redraw
    pub const ALLY_CONTACT_LIMIT: f32 = 0.2;

    /// Patrol direction-change interval is drawn from this range (seconds)
    pub const PATROL_INTERVAL_MIN: f32 = 2.0;
    pub const PATROL_INTERVAL_MAX: f32 = 5.0;
    /// Stagger applied after an ally-contact redraw (subtracted from the timer)
    pub const PATROL_STAGGER_MIN: f32 = 0.5;
    pub const PATROL_STAGGER_MAX: f32 = 1.5;

    /// Chasing foes wall-climb after this much continuous wall contact
    pub const WALL_JUMP_DELAY: f32 = 0.15;
    /// Chase activation radius around the player
    pub const AGGRO_RANGE: f32 = 320.0;

    /// Player air jumps allowed after leaving the ground (double jump)
    pub const MAX_AIR_JUMPS: u8 = 1;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 640.0;
    pub const PROJECTILE_TTL: f32 = 1.2;
    pub const PROJECTILE_SIZE: f32 = 6.0;

    /// Default hit windows (seconds)
    pub const INVINCIBILITY_TIME: f32 = 0.6;
    pub const HIT_STUN_TIME: f32 = 0.25;
    pub const HIT_FLASH_TIME: f32 = 0.4;
}
