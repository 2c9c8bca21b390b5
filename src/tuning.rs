//! Data-driven game balance
//!
//! Numeric knobs for the player and the foe archetypes, embedded defaults
//! first, JSON override second. Level data refers to foe archetypes by
//! `FoeParams::name`.

use serde::{Deserialize, Serialize};

/// Player movement and combat parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerParams {
    pub max_health: f32,
    /// Damage the player's body deals to a foe on contact
    pub contact_damage: f32,
    /// Damage carried by each fired projectile
    pub projectile_damage: f32,
    pub move_speed: f32,
    pub jump_speed: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            contact_damage: 10.0,
            projectile_damage: 15.0,
            move_speed: 200.0,
            jump_speed: 620.0,
            width: 24.0,
            height: 28.0,
        }
    }
}

/// One foe archetype, as the spawn factories build it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoeParams {
    pub name: String,
    pub max_health: f32,
    pub contact_damage: f32,
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Score awarded when this foe dies
    pub score: u32,
    pub width: f32,
    pub height: f32,
    /// Default strategy label, overridable per spawn point
    pub strategy: String,
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub player: PlayerParams,
    pub foes: Vec<FoeParams>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerParams::default(),
            foes: vec![
                FoeParams {
                    name: "walker".to_string(),
                    max_health: 50.0,
                    contact_damage: 8.0,
                    move_speed: 120.0,
                    jump_speed: 460.0,
                    score: 10,
                    width: 24.0,
                    height: 28.0,
                    strategy: "patrol".to_string(),
                },
                FoeParams {
                    name: "stalker".to_string(),
                    max_health: 80.0,
                    contact_damage: 12.0,
                    move_speed: 160.0,
                    jump_speed: 520.0,
                    score: 25,
                    width: 24.0,
                    height: 32.0,
                    strategy: "hunter".to_string(),
                },
            ],
        }
    }
}

impl Tuning {
    /// Parse a tuning sheet from JSON. The only fallible path in the crate
    /// outside level loading.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn foe(&self, name: &str) -> Option<&FoeParams> {
        self.foes.iter().find(|f| f.name == name)
    }
}
