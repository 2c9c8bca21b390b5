//! Enemy decision strategies
//!
//! A strategy turns what a foe can see into a desired velocity once per
//! frame. Strategies are stateful (timers, directions) and never shared:
//! every foe owns a fresh instance built through the registry.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use std::collections::HashMap;

use super::entity::{Rect, WallSide};
use crate::consts::*;

/// Read-only snapshot of everything a strategy may consult.
///
/// The world rebuilds it per foe per frame; there are no back-references
/// into the entity list.
pub struct FoeView<'a> {
    /// Foe body center
    pub pos: Vec2,
    pub move_speed: f32,
    pub jump_speed: f32,
    pub grounded: bool,
    pub wall_contact: Option<WallSide>,
    /// Set by the previous physics pass
    pub touching_ally: bool,
    /// Player body center, if a player exists
    pub player: Option<Vec2>,
    /// Solid boxes for line-of-sight queries
    pub walls: &'a [Rect],
}

impl FoeView<'_> {
    /// True when the player is known and no wall blocks the sight line.
    /// An empty wall list (world data unavailable) counts as clear.
    pub fn sees_player(&self) -> bool {
        match self.player {
            None => false,
            Some(p) => !self.walls.iter().any(|w| w.segment_hits(self.pos, p)),
        }
    }
}

/// Per-frame decision contract for a foe.
///
/// `decide` returns a desired velocity; a zero y-component means "gravity
/// owns vertical velocity this frame".
pub trait Strategy {
    fn decide(&mut self, view: &FoeView, rng: &mut Pcg32, dt: f32) -> Vec2;

    /// Whether this strategy wants to act this frame (consulted by Brain)
    fn ready(&self, _view: &FoeView) -> bool {
        true
    }

    fn priority(&self) -> i32 {
        0
    }

    /// Whether the separation push may move this foe
    fn wants_separation(&self) -> bool {
        true
    }
}

/// Walks back and forth, redrawing direction on a randomized timer.
///
/// Extra redraw triggers: bumping a wall while moving, and sustained ally
/// contact. The ally-contact redraw is a coin flip with a negative timer
/// stagger, which desynchronizes two foes that collided while pacing in
/// lockstep.
pub struct Patrol {
    dir: f32,
    elapsed: f32,
    interval: f32,
    ally_time: f32,
}

impl Patrol {
    pub fn new() -> Self {
        // interval 0 forces a draw on the first decide
        Self {
            dir: 0.0,
            elapsed: 0.0,
            interval: 0.0,
            ally_time: 0.0,
        }
    }

    /// Current walk direction (-1, 0 or 1)
    pub fn dir(&self) -> f32 {
        self.dir
    }
}

impl Default for Patrol {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Patrol {
    fn decide(&mut self, view: &FoeView, rng: &mut Pcg32, dt: f32) -> Vec2 {
        self.elapsed += dt;
        if view.touching_ally {
            self.ally_time += dt;
        } else {
            self.ally_time = 0.0;
        }

        let wall_bump = self.dir != 0.0 && view.wall_contact.is_some();
        let ally_bump = self.ally_time > ALLY_CONTACT_LIMIT;

        if self.elapsed >= self.interval || wall_bump || ally_bump {
            self.interval = rng.random_range(PATROL_INTERVAL_MIN..PATROL_INTERVAL_MAX);
            if ally_bump {
                self.dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                self.elapsed = -rng.random_range(PATROL_STAGGER_MIN..PATROL_STAGGER_MAX);
                self.ally_time = 0.0;
            } else {
                self.dir = (rng.random_range(0..3i32) - 1) as f32;
                self.elapsed = 0.0;
            }
        }

        Vec2::new(0.5 * view.move_speed * self.dir, 0.0)
    }

    // Patrolling foes are allowed to overlap while crossing
    fn wants_separation(&self) -> bool {
        false
    }
}

/// Runs straight at the player's x, hopping up walls in the way
pub struct Chase {
    wall_time: f32,
}

impl Chase {
    pub fn new() -> Self {
        Self { wall_time: 0.0 }
    }
}

impl Default for Chase {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Chase {
    fn decide(&mut self, view: &FoeView, _rng: &mut Pcg32, dt: f32) -> Vec2 {
        let Some(target) = view.player else {
            return Vec2::ZERO;
        };

        // Ties break toward positive x
        let vx = if target.x >= view.pos.x {
            view.move_speed
        } else {
            -view.move_speed
        };

        // Wall climb: one impulse per sustained contact window, not a
        // continuous force
        let mut vy = 0.0;
        if view.grounded && view.wall_contact.is_some() {
            self.wall_time += dt;
            if self.wall_time > WALL_JUMP_DELAY {
                vy = view.jump_speed;
                self.wall_time = 0.0;
            }
        } else {
            self.wall_time = 0.0;
        }

        Vec2::new(vx, vy)
    }

    fn ready(&self, view: &FoeView) -> bool {
        match view.player {
            Some(p) => p.distance(view.pos) <= AGGRO_RANGE && view.sees_player(),
            None => false,
        }
    }

    fn priority(&self) -> i32 {
        10
    }
}

/// Priority arbitrator: delegates each frame to the highest-priority ready
/// strategy.
pub struct Brain {
    options: Vec<Box<dyn Strategy>>,
    /// Winner of the most recent decide, for separation delegation
    active: Option<usize>,
}

impl Brain {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            active: None,
        }
    }

    /// Add an option, keeping the list sorted by descending priority.
    /// The sort is stable, so equal priorities keep insertion order.
    pub fn insert(&mut self, strategy: Box<dyn Strategy>) {
        self.options.push(strategy);
        self.options
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    pub fn with(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.insert(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl Default for Brain {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Brain {
    fn decide(&mut self, view: &FoeView, rng: &mut Pcg32, dt: f32) -> Vec2 {
        self.active = self.options.iter().position(|s| s.ready(view));
        match self.active {
            Some(i) => self.options[i].decide(view, rng, dt),
            None => Vec2::ZERO,
        }
    }

    fn wants_separation(&self) -> bool {
        match self.active {
            Some(i) => self.options[i].wants_separation(),
            None => true,
        }
    }
}

type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy>>;

/// Maps level-authored labels to strategy constructors.
///
/// Registration is idempotent and every `create` returns a fresh,
/// independently-stateful instance.
pub struct StrategyRegistry {
    table: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// The built-in labels: "patrol", "chase" and "hunter" (a Brain that
    /// chases on sight and patrols otherwise).
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        reg.register("patrol", || Box::new(Patrol::new()));
        reg.register("chase", || Box::new(Chase::new()));
        reg.register("hunter", || {
            Box::new(
                Brain::new()
                    .with(Box::new(Chase::new()))
                    .with(Box::new(Patrol::new())),
            )
        });
        reg
    }

    pub fn register(
        &mut self,
        name: &str,
        factory: impl Fn() -> Box<dyn Strategy> + 'static,
    ) {
        if self.table.contains_key(name) {
            log::debug!("strategy '{name}' already registered, keeping existing factory");
            return;
        }
        self.table.insert(name.to_string(), Box::new(factory));
    }

    /// Build a fresh instance. An unknown label degrades to Patrol.
    pub fn create(&self, name: &str) -> Box<dyn Strategy> {
        match self.table.get(name) {
            Some(factory) => factory(),
            None => {
                log::warn!("unknown strategy '{name}', falling back to patrol");
                Box::new(Patrol::new())
            }
        }
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
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
