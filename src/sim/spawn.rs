//! Wave-based enemy spawning
//!
//! A `SpawnZone` watches the player and keeps its local foe population
//! between bounds, spawning through named factories at authored points.
//! Zones track the foes they created by entity id; ownership stays with the
//! world's entity list.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use std::collections::HashMap;

use super::entity::{Agent, Entity, EntityKind, Foe, Rect};
use super::strategy::{Brain, Strategy, StrategyRegistry};
use super::world::GameEvent;
use crate::tuning::{FoeParams, Tuning};

/// A world position that can produce foes, with the archetypes allowed to
/// appear there and any strategy labels forced onto them
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub pos: Vec2,
    /// Foe archetype names; one is chosen uniformly at random per spawn
    pub factories: Vec<String>,
    /// Strategy labels applied to foes born here (several compose a Brain)
    pub strategies: Vec<String>,
}

/// A rectangle of the world that keeps itself populated while the player is
/// inside it
#[derive(Debug, Clone)]
pub struct SpawnZone {
    pub bounds: Rect,
    pub points: Vec<SpawnPoint>,
    /// Entity ids of live foes this zone spawned (tracks, does not own)
    pub tracked: Vec<u32>,
    /// A wave triggers when the tracked count drops to this or below
    pub min_population: usize,
    /// Tracked count never exceeds this
    pub max_population: usize,
    /// Points closer than this to the player sit a wave out
    pub min_player_distance: f32,
}

impl SpawnZone {
    pub fn new(bounds: Rect, min_population: usize, max_population: usize) -> Self {
        Self {
            bounds,
            points: Vec::new(),
            tracked: Vec::new(),
            min_population,
            max_population,
            min_player_distance: 96.0,
        }
    }

    /// Drop tracked ids whose entity is gone or already marked for removal
    fn purge(&mut self, entities: &[Entity]) {
        self.tracked
            .retain(|id| entities.iter().any(|e| e.id == *id && !e.removable));
    }
}

/// Maps archetype names to foe constructors. Registration is idempotent;
/// construction goes through the strategy registry for the behavior label.
pub struct FoeRegistry {
    table: HashMap<String, FoeParams>,
}

impl FoeRegistry {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register every archetype a tuning sheet carries
    pub fn from_tuning(tuning: &Tuning) -> Self {
        let mut reg = Self::new();
        for params in &tuning.foes {
            reg.register(params.clone());
        }
        reg
    }

    pub fn register(&mut self, params: FoeParams) {
        if self.table.contains_key(&params.name) {
            log::debug!("foe '{}' already registered, keeping existing params", params.name);
            return;
        }
        self.table.insert(params.name.clone(), params);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Build a fresh foe entity at `pos`. `forced` strategy labels override
    /// the archetype default: one label is used directly, several compose a
    /// Brain. Returns None for an unknown archetype.
    pub fn build(
        &self,
        name: &str,
        pos: Vec2,
        strategies: &StrategyRegistry,
        forced: &[String],
    ) -> Option<Entity> {
        let params = self.table.get(name)?;

        let strategy: Box<dyn Strategy> = match forced {
            [] => strategies.create(&params.strategy),
            [only] => strategies.create(only),
            many => {
                let mut brain = Brain::new();
                for label in many {
                    brain.insert(strategies.create(label));
                }
                Box::new(brain)
            }
        };

        let foe = Foe {
            agent: Agent::new(
                params.max_health,
                params.contact_damage,
                params.move_speed,
                params.jump_speed,
            ),
            strategy,
            touching_ally: false,
            score_value: params.score,
            name: params.name.clone(),
            score_awarded: false,
        };
        Some(Entity::new(
            pos,
            Vec2::new(params.width, params.height),
            EntityKind::Foe(foe),
        ))
    }
}

impl Default for FoeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every zone for one frame. New foes are staged and appended after the
/// zone's point scan, so they join the simulation on the next tick.
pub fn update_zones(
    zones: &mut [SpawnZone],
    entities: &mut Vec<Entity>,
    foes: &FoeRegistry,
    strategies: &StrategyRegistry,
    rng: &mut Pcg32,
    next_id: &mut u32,
    events: &mut Vec<GameEvent>,
) {
    let player = entities
        .iter()
        .find(|e| e.is_player() && !e.removable)
        .map(|e| e.center());

    for zone in zones.iter_mut() {
        zone.purge(entities);

        let Some(player_center) = player else {
            continue;
        };
        if !zone.bounds.contains(player_center) {
            continue;
        }
        if zone.tracked.len() > zone.min_population {
            continue;
        }

        // One wave: a single pass over the points, bounded by the population
        // headroom. A point that is unusable this wave spawns nothing.
        let mut budget = zone.max_population.saturating_sub(zone.tracked.len());
        let mut staged: Vec<Entity> = Vec::new();

        for point in &zone.points {
            if budget == 0 {
                break;
            }
            let usable: Vec<&String> = point
                .factories
                .iter()
                .filter(|name| foes.contains(name))
                .collect();
            if usable.is_empty() {
                log::warn!(
                    "spawn point at ({}, {}) has no usable foe factories",
                    point.pos.x,
                    point.pos.y
                );
                continue;
            }
            if point.pos.distance(player_center) < zone.min_player_distance {
                continue;
            }

            let name = usable[rng.random_range(0..usable.len())];
            // contains() above guarantees the build succeeds
            let Some(mut foe) = foes.build(name, point.pos, strategies, &point.strategies)
            else {
                continue;
            };
            foe.id = *next_id;
            *next_id += 1;

            zone.tracked.push(foe.id);
            events.push(GameEvent::Spawned {
                id: foe.id,
                name: name.clone(),
            });
            staged.push(foe);
            budget -= 1;
        }

        entities.extend(staged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn player_at(x: f32, y: f32) -> Entity {
        let mut e = Entity::new(
            Vec2::new(x, y),
            Vec2::new(24.0, 28.0),
            EntityKind::Player(Agent::new(100.0, 10.0, 200.0, 620.0)),
        );
        e.id = 1;
        e
    }

    fn setup() -> (FoeRegistry, StrategyRegistry, Pcg32) {
        (
            FoeRegistry::from_tuning(&Tuning::default()),
            StrategyRegistry::with_defaults(),
            Pcg32::seed_from_u64(42),
        )
    }

    fn point(x: f32, y: f32, factories: &[&str]) -> SpawnPoint {
        SpawnPoint {
            pos: Vec2::new(x, y),
            factories: factories.iter().map(|s| s.to_string()).collect(),
            strategies: Vec::new(),
        }
    }

    #[test]
    fn single_point_wave_spawns_exactly_one_foe() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(0.0, 0.0, 400.0, 400.0), 3, 15);
        zone.min_player_distance = 10.0;
        // 20 units from the player center, comfortably past the minimum
        zone.points.push(point(32.0, 14.0, &["walker"]));

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );

        assert_eq!(entities.len(), 2, "one point bounds the wave to one foe");
        assert_eq!(zones[0].tracked.len(), 1);
        assert!(matches!(&events[0], GameEvent::Spawned { name, .. } if name == "walker"));
    }

    #[test]
    fn points_too_close_to_player_sit_out() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(0.0, 0.0, 400.0, 400.0), 3, 15);
        zone.min_player_distance = 100.0;
        zone.points.push(point(20.0, 14.0, &["walker"]));
        zone.points.push(point(200.0, 14.0, &["walker"]));

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );

        assert_eq!(entities.len(), 2, "only the distant point may spawn");
        assert_eq!(entities[1].pos(), Vec2::new(200.0, 14.0));
    }

    #[test]
    fn factoryless_points_are_skipped_without_spending_budget() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(0.0, 0.0, 400.0, 400.0), 0, 1);
        zone.min_player_distance = 10.0;
        zone.points.push(point(150.0, 14.0, &[]));
        zone.points.push(point(160.0, 14.0, &["no-such-foe"]));
        zone.points.push(point(170.0, 14.0, &["walker"]));

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].pos(), Vec2::new(170.0, 14.0));
    }

    #[test]
    fn wave_respects_population_headroom() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(0.0, 0.0, 400.0, 400.0), 2, 2);
        zone.min_player_distance = 10.0;
        for i in 0..5 {
            zone.points.push(point(150.0 + i as f32 * 10.0, 14.0, &["walker"]));
        }

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );

        assert_eq!(entities.len(), 3, "budget caps the wave at max_population");
    }

    #[test]
    fn no_wave_outside_zone_or_above_minimum() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(1000.0, 0.0, 400.0, 400.0), 3, 15);
        zone.points.push(point(1100.0, 14.0, &["walker"]));

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );
        assert_eq!(entities.len(), 1, "player outside the zone");

        // Move the zone over the player but pretend it is already populated
        zones[0].bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        zones[0].tracked = vec![90, 91, 92, 93];
        // Fake live entities so the purge keeps them
        for id in [90, 91, 92, 93] {
            let mut foe = foes
                .build("walker", Vec2::new(300.0, 14.0), &strategies, &[])
                .unwrap();
            foe.id = id;
            entities.push(foe);
        }
        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );
        assert_eq!(zones[0].tracked.len(), 4, "population above minimum: no wave");
        assert_eq!(entities.len(), 5);
    }

    #[test]
    fn purge_forgets_removed_foes() {
        let (foes, strategies, mut rng) = setup();
        let mut zone = SpawnZone::new(Rect::new(0.0, 0.0, 400.0, 400.0), 0, 2);
        zone.min_player_distance = 10.0;
        zone.points.push(point(200.0, 14.0, &["walker"]));

        let mut entities = vec![player_at(0.0, 0.0)];
        let mut zones = vec![zone];
        let mut next_id = 2;
        let mut events = Vec::new();

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );
        assert_eq!(zones[0].tracked.len(), 1);

        // The foe dies and is marked for removal
        let foe_id = zones[0].tracked[0];
        entities
            .iter_mut()
            .find(|e| e.id == foe_id)
            .unwrap()
            .removable = true;

        update_zones(
            &mut zones, &mut entities, &foes, &strategies, &mut rng, &mut next_id, &mut events,
        );
        assert!(
            !zones[0].tracked.contains(&foe_id),
            "removable foes leave the tracking list"
        );
    }

    #[test]
    fn forced_strategies_override_archetype_default() {
        let (foes, strategies, _) = setup();

        // stalker defaults to "hunter"; force plain patrol instead
        let forced = vec!["patrol".to_string()];
        let e = foes
            .build("stalker", Vec2::ZERO, &strategies, &forced)
            .unwrap();
        assert!(!e.foe().unwrap().strategy.wants_separation());

        // Several labels compose a Brain (which defaults separation on)
        let forced = vec!["chase".to_string(), "patrol".to_string()];
        let e = foes
            .build("stalker", Vec2::ZERO, &strategies, &forced)
            .unwrap();
        assert!(e.foe().unwrap().strategy.wants_separation());
    }

    #[test]
    fn registry_registration_is_idempotent() {
        let mut reg = FoeRegistry::from_tuning(&Tuning::default());
        let before = reg.len();
        let mut dup = Tuning::default().foes[0].clone();
        dup.max_health = 9999.0;
        reg.register(dup);

        assert_eq!(reg.len(), before);
        let e = reg
            .build("walker", Vec2::ZERO, &StrategyRegistry::with_defaults(), &[])
            .unwrap();
        assert_eq!(
            e.agent().unwrap().max_health,
            50.0,
            "the original registration wins"
        );
    }

    #[test]
    fn unknown_archetype_builds_nothing() {
        let (foes, strategies, _) = setup();
        assert!(foes.build("dragon", Vec2::ZERO, &strategies, &[]).is_none());
    }
}
