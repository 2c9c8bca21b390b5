//! World orchestration: the fixed-timestep frame loop
//!
//! Owns the entity list and drives the per-tick order: purge marked
//! entities, per-entity update (agents consult input or strategy here),
//! physics resolution, then the spawn controller. Additions from spawning
//! land at the tail of the list and join the simulation next frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Agent, Entity, EntityKind, Projectile, Rect};
use super::physics;
use super::spawn::{self, FoeRegistry, SpawnZone};
use super::strategy::{FoeView, StrategyRegistry};
use crate::consts::*;
use crate::tuning::{PlayerParams, Tuning};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// One-frame "jump just pressed" edge
    pub jump: bool,
    /// One-frame "fire just pressed" edge
    pub fire: bool,
    /// World-space aim point for fired projectiles
    pub aim: Vec2,
}

/// Things that happened this frame, surfaced to rendering and persistence
/// collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned { id: u32, name: String },
    Damaged { id: u32, amount: f32 },
    /// Fired exactly once per foe death
    FoeKilled { name: String, score: u32 },
    PlayerKilled,
}

/// The simulation world
pub struct World {
    pub entities: Vec<Entity>,
    pub zones: Vec<SpawnZone>,
    pub strategies: StrategyRegistry,
    pub foes: FoeRegistry,
    player_params: PlayerParams,
    rng: Pcg32,
    seed: u64,
    next_id: u32,
    events: Vec<GameEvent>,
    player_down: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl World {
    /// An empty world with default registries and player parameters
    pub fn new(seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            zones: Vec::new(),
            strategies: StrategyRegistry::with_defaults(),
            foes: FoeRegistry::new(),
            player_params: PlayerParams::default(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_id: 1,
            events: Vec::new(),
            player_down: false,
            time_ticks: 0,
        }
    }

    /// A world whose foe registry and player parameters come from a tuning
    /// sheet
    pub fn with_tuning(seed: u64, tuning: &Tuning) -> Self {
        let mut world = Self::new(seed);
        world.foes = FoeRegistry::from_tuning(tuning);
        world.player_params = tuning.player.clone();
        world
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Add an entity, assigning its id
    pub fn push(&mut self, mut entity: Entity) -> u32 {
        entity.id = self.next_id;
        self.next_id += 1;
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Take a level loader's entity list verbatim
    pub fn ingest(&mut self, entities: impl IntoIterator<Item = Entity>) {
        let before = self.entities.len();
        for e in entities {
            self.push(e);
        }
        log::info!("ingested {} entities", self.entities.len() - before);
    }

    /// Create the player from the world's player parameters
    pub fn spawn_player(&mut self, pos: Vec2) -> u32 {
        let p = &self.player_params;
        let agent = Agent::new(p.max_health, p.contact_damage, p.move_speed, p.jump_speed);
        let entity = Entity::new(pos, Vec2::new(p.width, p.height), EntityKind::Player(agent));
        self.push(entity)
    }

    pub fn add_zone(&mut self, zone: SpawnZone) {
        self.zones.push(zone);
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.is_player())
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Drain the events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the world by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.time_ticks += 1;

        // Entities marked last frame leave now; the one-frame lag lets a
        // death visual render once before the body disappears
        self.entities.retain(|e| !e.removable);

        // Read-only view data for strategies, snapshotted before mutation
        let walls: Vec<Rect> = self
            .entities
            .iter()
            .filter(|e| e.solid)
            .map(|e| *e.bbox())
            .collect();
        let player_center = self
            .entities
            .iter()
            .find(|e| e.is_player())
            .map(|e| e.center());

        let Self {
            entities,
            zones,
            strategies,
            foes,
            player_params,
            rng,
            next_id,
            events,
            player_down,
            ..
        } = self;

        // Projectiles staged during the update pass: (spawn center, direction)
        let mut shots: Vec<(Vec2, Vec2)> = Vec::new();

        for e in entities.iter_mut() {
            let center = e.center();
            let mut advance_projectile = false;

            match &mut e.kind {
                EntityKind::Wall => {}

                EntityKind::Player(agent) => {
                    agent.tick_timers(dt);
                    if agent.grounded {
                        agent.jump_count = 0;
                    }

                    if agent.alive() && agent.stun_left <= 0.0 {
                        let dir = (input.right as i32 - input.left as i32) as f32;
                        e.vel.x = dir * agent.move_speed;
                        if e.vel.x > 0.0 {
                            agent.facing_left = false;
                        } else if e.vel.x < 0.0 {
                            agent.facing_left = true;
                        }

                        if input.jump {
                            if agent.grounded {
                                e.vel.y = agent.jump_speed;
                            } else if agent.jump_count < MAX_AIR_JUMPS {
                                agent.jump_count += 1;
                                e.vel.y = agent.jump_speed;
                            }
                        }

                        if input.fire {
                            // Zero-length aim degrades to the facing direction
                            let aim_dir = (input.aim - center).try_normalize().unwrap_or(
                                if agent.facing_left {
                                    Vec2::NEG_X
                                } else {
                                    Vec2::X
                                },
                            );
                            shots.push((center, aim_dir));
                        }
                    } else if agent.alive() {
                        // Stunned: no input, horizontal motion stops
                        e.vel.x = 0.0;
                    }

                    if !agent.alive() && !*player_down {
                        *player_down = true;
                        events.push(GameEvent::PlayerKilled);
                    }
                }

                EntityKind::Foe(foe) => {
                    foe.agent.tick_timers(dt);

                    if foe.agent.alive() {
                        if foe.agent.stun_left <= 0.0 {
                            let view = FoeView {
                                pos: center,
                                move_speed: foe.agent.move_speed,
                                jump_speed: foe.agent.jump_speed,
                                grounded: foe.agent.grounded,
                                wall_contact: foe.agent.wall_contact,
                                touching_ally: foe.touching_ally,
                                player: player_center,
                                walls: &walls,
                            };
                            let cmd = foe.strategy.decide(&view, rng, dt);
                            // x always applies; y only when the strategy
                            // claims vertical, otherwise gravity owns it
                            e.vel.x = cmd.x;
                            if cmd.y != 0.0 {
                                e.vel.y = cmd.y;
                            }
                            if e.vel.x > 0.0 {
                                foe.agent.facing_left = false;
                            } else if e.vel.x < 0.0 {
                                foe.agent.facing_left = true;
                            }
                        }
                    } else {
                        if !foe.score_awarded {
                            foe.score_awarded = true;
                            events.push(GameEvent::FoeKilled {
                                name: foe.name.clone(),
                                score: foe.score_value,
                            });
                        }
                        if foe.agent.hit_flash_left <= 0.0 {
                            e.removable = true;
                        }
                    }
                }

                EntityKind::Projectile(p) => {
                    p.ttl -= dt;
                    if p.ttl <= 0.0 {
                        e.removable = true;
                    } else {
                        advance_projectile = true;
                    }
                }
            }

            if advance_projectile {
                let step = e.vel * dt;
                e.translate(step);
            }
        }

        for (center, dir) in shots {
            let size = Vec2::splat(PROJECTILE_SIZE);
            let mut shot = Entity::new(
                center - size / 2.0,
                size,
                EntityKind::Projectile(Projectile {
                    damage: player_params.projectile_damage,
                    ttl: PROJECTILE_TTL,
                }),
            );
            shot.vel = dir * PROJECTILE_SPEED;
            shot.id = *next_id;
            *next_id += 1;
            entities.push(shot);
        }

        physics::resolve(entities, dt, events);

        spawn::update_zones(zones, entities, foes, strategies, rng, next_id, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::SpawnPoint;

    const DT: f32 = 1.0 / 120.0;

    /// Floor plus player standing on it, already settled
    fn arena(seed: u64) -> World {
        let mut world = World::with_tuning(seed, &Tuning::default());
        world.ingest([Entity::wall(Rect::new(-400.0, -32.0, 800.0, 32.0))]);
        world.spawn_player(Vec2::new(0.0, 0.0));
        // Settle onto the floor
        for _ in 0..10 {
            world.tick(&TickInput::default(), DT);
        }
        world
    }

    fn add_foe(world: &mut World, name: &str, pos: Vec2) -> u32 {
        let foe = world
            .foes
            .build(name, pos, &world.strategies, &[])
            .expect("archetype exists");
        world.push(foe)
    }

    #[test]
    fn marked_entities_leave_on_the_next_tick() {
        let mut world = arena(1);
        let id = add_foe(&mut world, "walker", Vec2::new(2000.0, 0.0));

        world
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .unwrap()
            .removable = true;
        assert!(world.entity(id).is_some(), "still present until the next tick");

        world.tick(&TickInput::default(), DT);
        assert!(world.entity(id).is_none());
    }

    #[test]
    fn foe_death_awards_score_exactly_once() {
        let mut world = arena(2);
        let id = add_foe(&mut world, "walker", Vec2::new(2000.0, 0.0));
        world.take_events();

        {
            let foe = world.entities.iter_mut().find(|e| e.id == id).unwrap();
            foe.agent_mut().unwrap().health = 0.0;
        }

        for _ in 0..5 {
            world.tick(&TickInput::default(), DT);
        }
        let kills: Vec<_> = world
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::FoeKilled { .. }))
            .collect();
        assert_eq!(kills.len(), 1, "kill reward fires exactly once");
        assert!(
            matches!(&kills[0], GameEvent::FoeKilled { name, score } if name == "walker" && *score == 10)
        );
        assert!(world.entity(id).is_none(), "corpse purged after the visual window");
    }

    #[test]
    fn dead_foes_stop_consulting_their_strategy() {
        let mut world = arena(3);
        let id = add_foe(&mut world, "stalker", Vec2::new(60.0, 0.0));

        {
            let foe = world.entities.iter_mut().find(|e| e.id == id).unwrap();
            let agent = foe.agent_mut().unwrap();
            agent.health = 0.0;
            // Keep the corpse around long enough to observe it
            agent.hit_flash_left = 10.0;
        }
        world.tick(&TickInput::default(), DT);

        let foe = world.entity(id).unwrap();
        assert_eq!(foe.vel.x, 0.0, "no strategy output after death");
    }

    #[test]
    fn player_walks_and_jumps_on_input() {
        let mut world = arena(4);
        let x0 = world.player().unwrap().pos().x;

        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            world.tick(&input, DT);
        }
        assert!(world.player().unwrap().pos().x > x0);
        assert!(!world.player().unwrap().agent().unwrap().facing_left);

        assert!(world.player().unwrap().agent().unwrap().grounded);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        world.tick(&input, DT);
        assert!(world.player().unwrap().vel.y > 0.0);

        world.tick(&TickInput::default(), DT);
        assert!(!world.player().unwrap().agent().unwrap().grounded);
    }

    #[test]
    fn fire_stages_a_projectile_with_aim_fallback() {
        let mut world = arena(5);
        let center = world.player().unwrap().center();

        let input = TickInput {
            fire: true,
            aim: center + Vec2::new(50.0, 0.0),
            ..Default::default()
        };
        world.tick(&input, DT);
        let shot = world
            .entities
            .iter()
            .find(|e| e.is_projectile())
            .expect("projectile spawned");
        assert!(shot.vel.x > 0.0 && shot.vel.y == 0.0);

        // Aim exactly on the player center: deterministic facing fallback
        let mut world = arena(6);
        let center = world.player().unwrap().center();
        let input = TickInput {
            fire: true,
            aim: center,
            ..Default::default()
        };
        world.tick(&input, DT);
        let shot = world
            .entities
            .iter()
            .find(|e| e.is_projectile())
            .expect("projectile spawned");
        assert_eq!(shot.vel, Vec2::X * PROJECTILE_SPEED);
    }

    #[test]
    fn projectiles_expire_after_their_lifetime() {
        let mut world = arena(7);
        let center = world.player().unwrap().center();
        let input = TickInput {
            fire: true,
            // Straight up: nothing to hit
            aim: center + Vec2::new(0.0, 10.0),
            ..Default::default()
        };
        world.tick(&input, DT);
        assert!(world.entities.iter().any(|e| e.is_projectile()));

        let ticks = (PROJECTILE_TTL / DT) as usize + 3;
        for _ in 0..ticks {
            world.tick(&TickInput::default(), DT);
        }
        assert!(!world.entities.iter().any(|e| e.is_projectile()));
    }

    #[test]
    fn zone_spawns_arrive_at_the_list_tail() {
        let mut world = arena(8);
        let mut zone = SpawnZone::new(Rect::new(-400.0, -100.0, 800.0, 400.0), 1, 4);
        zone.min_player_distance = 50.0;
        zone.points.push(SpawnPoint {
            pos: Vec2::new(300.0, 0.0),
            factories: vec!["walker".to_string()],
            strategies: Vec::new(),
        });
        world.add_zone(zone);

        let count = world.entities.len();
        world.tick(&TickInput::default(), DT);

        assert!(world.entities.len() > count, "wave fired");
        let last = world.entities.last().unwrap();
        assert!(last.is_enemy());
        assert_eq!(last.pos(), Vec2::new(300.0, 0.0), "untouched until next frame");
        assert!(
            world
                .take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Spawned { .. }))
        );
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed: u64| {
            let mut world = arena(seed);
            add_foe(&mut world, "walker", Vec2::new(100.0, 0.0));
            add_foe(&mut world, "walker", Vec2::new(120.0, 0.0));
            add_foe(&mut world, "stalker", Vec2::new(-150.0, 0.0));
            let input = TickInput {
                right: true,
                ..Default::default()
            };
            for _ in 0..600 {
                world.tick(&input, DT);
            }
            world
                .entities
                .iter()
                .map(|e| (e.id, e.pos().x, e.pos().y))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(99), run(99), "identical seeds replay identically");
    }

    #[test]
    fn stunned_player_ignores_input() {
        let mut world = arena(9);
        {
            let player = world.entities.iter_mut().find(|e| e.is_player()).unwrap();
            player.agent_mut().unwrap().stun_left = 1.0;
        }
        let input = TickInput {
            right: true,
            jump: true,
            ..Default::default()
        };
        world.tick(&input, DT);
        let player = world.player().unwrap();
        assert_eq!(player.vel.x, 0.0);
        assert!(player.agent().unwrap().grounded, "no jump while stunned");
    }
}
