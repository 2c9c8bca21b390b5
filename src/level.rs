//! Level-data ingestion
//!
//! The boundary with the tile-map collaborator: whatever parses map files
//! emits a `LevelData`, and `build_world` turns it into a running world.
//! The core imposes no format beyond these serde types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Entity, Rect, SpawnPoint, SpawnZone, World};
use crate::tuning::Tuning;

/// A foe placed directly by the level author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoePlacement {
    /// Archetype name from the tuning sheet
    pub kind: String,
    pub pos: Vec2,
    /// Optional strategy label override
    #[serde(default)]
    pub strategy: Option<String>,
}

/// One spawn point as authored in level data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointData {
    pub pos: Vec2,
    pub factories: Vec<String>,
    #[serde(default)]
    pub strategies: Vec<String>,
}

/// One spawn zone as authored in level data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneData {
    pub bounds: Rect,
    pub min_population: usize,
    pub max_population: usize,
    pub min_player_distance: f32,
    pub points: Vec<PointData>,
}

/// Everything a level contributes to the initial world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub player_start: Vec2,
    pub walls: Vec<Rect>,
    #[serde(default)]
    pub foes: Vec<FoePlacement>,
    #[serde(default)]
    pub zones: Vec<ZoneData>,
}

impl LevelData {
    /// Parse level data from JSON; the fallible edge of level loading
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Build a world from authored level data and a tuning sheet.
///
/// Walls are ingested verbatim; authored foes go through the same factories
/// the spawn controller uses, so unknown archetypes degrade to a warning.
pub fn build_world(level: &LevelData, tuning: &Tuning, seed: u64) -> World {
    let mut world = World::with_tuning(seed, tuning);

    world.ingest(level.walls.iter().map(|r| Entity::wall(*r)));
    world.spawn_player(level.player_start);

    for placement in &level.foes {
        let forced: Vec<String> = placement.strategy.iter().cloned().collect();
        match world
            .foes
            .build(&placement.kind, placement.pos, &world.strategies, &forced)
        {
            Some(foe) => {
                world.push(foe);
            }
            None => {
                log::warn!("level places unknown foe '{}', skipping", placement.kind);
            }
        }
    }

    for zone_data in &level.zones {
        let mut zone = SpawnZone::new(
            zone_data.bounds,
            zone_data.min_population,
            zone_data.max_population,
        );
        zone.min_player_distance = zone_data.min_player_distance;
        zone.points = zone_data
            .points
            .iter()
            .map(|p| SpawnPoint {
                pos: p.pos,
                factories: p.factories.clone(),
                strategies: p.strategies.clone(),
            })
            .collect();
        world.add_zone(zone);
    }

    log::info!(
        "level built: {} walls, {} authored foes, {} zones",
        level.walls.len(),
        level.foes.len(),
        level.zones.len()
    );
    world
}

/// A small built-in level for the demo binary and smoke tests: a floor, two
/// side walls, a patroller, and a zone that feeds stalkers from the right.
pub fn demo_level() -> LevelData {
    LevelData {
        player_start: Vec2::new(0.0, 0.0),
        walls: vec![
            Rect::new(-512.0, -32.0, 1024.0, 32.0),
            Rect::new(-512.0, 0.0, 32.0, 256.0),
            Rect::new(480.0, 0.0, 32.0, 256.0),
        ],
        foes: vec![FoePlacement {
            kind: "walker".to_string(),
            pos: Vec2::new(160.0, 0.0),
            strategy: None,
        }],
        zones: vec![ZoneData {
            bounds: Rect::new(-512.0, -32.0, 1024.0, 320.0),
            min_population: 1,
            max_population: 4,
            min_player_distance: 128.0,
            points: vec![
                PointData {
                    pos: Vec2::new(320.0, 0.0),
                    factories: vec!["stalker".to_string()],
                    strategies: Vec::new(),
                },
                PointData {
                    pos: Vec2::new(-320.0, 0.0),
                    factories: vec!["walker".to_string(), "stalker".to_string()],
                    strategies: vec!["hunter".to_string()],
                },
            ],
        }],
    }
}
