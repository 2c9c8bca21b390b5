//! World entity data model
//!
//! Everything that lives in the entity list: walls, the player, foes and
//! projectiles. Pure data plus bookkeeping accessors; behavior lives in
//! `strategy`, `physics` and `world`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::strategy::Strategy;
use crate::consts::*;

/// Axis-aligned bounding box, origin at the bottom-left corner (y-up world)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Closed-interval overlap: touching edges count. Used for every damage
    /// and projectile test so flush contact still registers a hit.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }

    /// Strict overlap on x, closed on y
    #[inline]
    pub fn overlaps_closed_y(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y <= other.y + other.h
            && other.y <= self.y + self.h
    }

    /// Strict overlap on y, closed on x
    #[inline]
    pub fn overlaps_closed_x(&self, other: &Rect) -> bool {
        self.x <= other.x + other.w
            && other.x <= self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// The same box translated by (dx, dy)
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Slab test: does the segment a->b pass through this box?
    /// Degenerate axes (no motion) fall back to a containment check, so there
    /// is no division by zero.
    pub fn segment_hits(&self, a: Vec2, b: Vec2) -> bool {
        let d = b - a;
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for (da, oa, lo, hi) in [
            (d.x, a.x, self.x, self.x + self.w),
            (d.y, a.y, self.y, self.y + self.h),
        ] {
            if da == 0.0 {
                if oa < lo || oa > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / da;
                let mut t1 = (lo - oa) * inv;
                let mut t2 = (hi - oa) * inv;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }
}

/// Which side of an agent is pressed against a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

/// Health, hit windows and movement capability shared by the player and foes
#[derive(Debug, Clone)]
pub struct Agent {
    pub health: f32,
    pub max_health: f32,
    /// Damage dealt on body contact
    pub damage: f32,

    /// Remaining hit windows (seconds)
    pub invincible_left: f32,
    pub stun_left: f32,
    pub hit_flash_left: f32,
    /// Window durations started by a landed hit
    pub invincible_time: f32,
    pub stun_time: f32,
    pub hit_flash_time: f32,

    pub grounded: bool,
    pub wall_contact: Option<WallSide>,
    /// Terminal fall speed while pressed against a wall (negative, y-up)
    pub wall_slide_speed: f32,
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Air jumps spent since last grounded
    pub jump_count: u8,
    pub facing_left: bool,
}

impl Agent {
    pub fn new(max_health: f32, damage: f32, move_speed: f32, jump_speed: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            damage,
            invincible_left: 0.0,
            stun_left: 0.0,
            hit_flash_left: 0.0,
            invincible_time: INVINCIBILITY_TIME,
            stun_time: HIT_STUN_TIME,
            hit_flash_time: HIT_FLASH_TIME,
            grounded: false,
            wall_contact: None,
            wall_slide_speed: -120.0,
            move_speed,
            jump_speed,
            jump_count: 0,
            facing_left: false,
        }
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.health > 0.0
    }

    /// The only damage path. A hit is swallowed while invincible or dead;
    /// a landed hit starts all three hit windows and returns true.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.alive() || self.invincible_left > 0.0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.invincible_left = self.invincible_time;
        self.stun_left = self.stun_time;
        self.hit_flash_left = self.hit_flash_time;
        true
    }

    /// Count down the hit windows by one frame
    pub fn tick_timers(&mut self, dt: f32) {
        self.invincible_left = (self.invincible_left - dt).max(0.0);
        self.stun_left = (self.stun_left - dt).max(0.0);
        self.hit_flash_left = (self.hit_flash_left - dt).max(0.0);
    }

    /// Whether the hit flash should currently be drawn
    #[inline]
    pub fn visual_hit_active(&self) -> bool {
        self.hit_flash_left > 0.0
    }
}

/// An enemy agent driven by a strategy
pub struct Foe {
    pub agent: Agent,
    /// Never absent; the default strategy is Patrol
    pub strategy: Box<dyn Strategy>,
    /// Rewritten by every physics pass
    pub touching_ally: bool,
    pub score_value: u32,
    /// Archetype identity, keyed by the kill counter
    pub name: String,
    /// Guarantees the kill reward fires exactly once
    pub score_awarded: bool,
}

impl std::fmt::Debug for Foe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Foe")
            .field("name", &self.name)
            .field("agent", &self.agent)
            .field("touching_ally", &self.touching_ally)
            .field("score_value", &self.score_value)
            .field("score_awarded", &self.score_awarded)
            .finish_non_exhaustive()
    }
}

/// A transient player shot
#[derive(Debug, Clone)]
pub struct Projectile {
    pub damage: f32,
    /// Remaining lifetime in seconds; expiry marks the entity removable
    pub ttl: f32,
}

/// What an entity is, as a closed sum
#[derive(Debug)]
pub enum EntityKind {
    Wall,
    Player(Agent),
    Foe(Foe),
    Projectile(Projectile),
}

/// A world entity: position + box + velocity + participation flags
#[derive(Debug)]
pub struct Entity {
    pub id: u32,
    pos: Vec2,
    bbox: Rect,
    pub vel: Vec2,
    /// Participates in AABB blocking
    pub solid: bool,
    /// Receives gravity each frame
    pub gravity: bool,
    /// Purged by the world at the start of the next tick
    pub removable: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec2, size: Vec2, kind: EntityKind) -> Self {
        let (solid, gravity) = match kind {
            EntityKind::Wall => (true, false),
            EntityKind::Player(_) | EntityKind::Foe(_) => (false, true),
            EntityKind::Projectile(_) => (false, false),
        };
        Self {
            id: 0,
            pos,
            bbox: Rect::new(pos.x, pos.y, size.x, size.y),
            vel: Vec2::ZERO,
            solid,
            gravity,
            removable: false,
            kind,
        }
    }

    /// A static solid covering `rect`
    pub fn wall(rect: Rect) -> Self {
        Self::new(
            Vec2::new(rect.x, rect.y),
            Vec2::new(rect.w, rect.h),
            EntityKind::Wall,
        )
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn bbox(&self) -> &Rect {
        &self.bbox
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.bbox.center()
    }

    /// The single position mutator: the bounding-box origin always mirrors
    /// the position.
    #[inline]
    pub fn set_pos(&mut self, p: Vec2) {
        self.pos = p;
        self.bbox.x = p.x;
        self.bbox.y = p.y;
    }

    #[inline]
    pub fn translate(&mut self, d: Vec2) {
        self.set_pos(self.pos + d);
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    #[inline]
    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Foe(_))
    }

    #[inline]
    pub fn is_agent(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_) | EntityKind::Foe(_))
    }

    #[inline]
    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, EntityKind::Projectile(_))
    }

    pub fn agent(&self) -> Option<&Agent> {
        match &self.kind {
            EntityKind::Player(a) => Some(a),
            EntityKind::Foe(f) => Some(&f.agent),
            _ => None,
        }
    }

    pub fn agent_mut(&mut self) -> Option<&mut Agent> {
        match &mut self.kind {
            EntityKind::Player(a) => Some(a),
            EntityKind::Foe(f) => Some(&mut f.agent),
            _ => None,
        }
    }

    pub fn foe(&self) -> Option<&Foe> {
        match &self.kind {
            EntityKind::Foe(f) => Some(f),
            _ => None,
        }
    }

    pub fn foe_mut(&mut self) -> Option<&mut Foe> {
        match &mut self.kind {
            EntityKind::Foe(f) => Some(f),
            _ => None,
        }
    }
}
