//! Per-frame physics and collision resolution
//!
//! Gravity, wall-slide clamping, enemy separation, projectile impacts, melee
//! contact damage and per-axis AABB resolution against solids. Entity order
//! is iteration order; when several entities compete for the same space the
//! earlier one resolves first (accepted ordering sensitivity).

use glam::Vec2;

use super::entity::{Entity, EntityKind, Rect, WallSide};
use super::world::GameEvent;
use crate::consts::*;

/// Advance every entity by one physics frame.
///
/// `update` has already run: agents carry their desired velocities and
/// projectiles have integrated their own motion.
pub fn resolve(entities: &mut [Entity], dt: f32, events: &mut Vec<GameEvent>) {
    integrate_gravity(entities, dt);
    // Uses last frame's wall flags, before they are reset below
    clamp_wall_slide(entities);
    reset_contact_flags(entities);

    // Potential displacement per entity, adjusted in place by separation and
    // the solid passes, committed once per entity
    let mut disp: Vec<Vec2> = entities.iter().map(|e| e.vel * dt).collect();

    apply_separation(entities, &mut disp, dt);
    resolve_projectiles(entities, events);
    resolve_solids(entities, &mut disp, events);
}

fn integrate_gravity(entities: &mut [Entity], dt: f32) {
    for e in entities.iter_mut() {
        if e.gravity {
            e.vel.y += GRAVITY * dt;
        }
    }
}

/// Falling while pressed against a wall is capped at the wall-slide speed
fn clamp_wall_slide(entities: &mut [Entity]) {
    for e in entities.iter_mut() {
        let clamp = match e.agent() {
            Some(a) if a.wall_contact.is_some() && !a.grounded && e.vel.y < 0.0 => {
                Some(a.wall_slide_speed)
            }
            _ => None,
        };
        if let Some(slide) = clamp {
            e.vel.y = e.vel.y.max(slide);
        }
    }
}

/// Contact flags are re-established only by collisions found this frame
fn reset_contact_flags(entities: &mut [Entity]) {
    for e in entities.iter_mut() {
        let gravity = e.gravity;
        if let Some(agent) = e.agent_mut() {
            if gravity {
                agent.grounded = false;
            }
            agent.wall_contact = None;
        }
    }
}

/// Crowding pass over living foes.
///
/// Any other living foe within one tile of horizontal distance sets
/// `touching_ally`; if this foe's strategy permits separation, each such
/// neighbor adds `SEPARATION_PUSH * dt` of displacement pointed away from
/// it. The push is recomputed from zero every frame and lands on the
/// displacement, never on velocity. A dead-even tie breaks on entity-list
/// index so superimposed foes part instead of drifting together.
fn apply_separation(entities: &mut [Entity], disp: &mut [Vec2], dt: f32) {
    let foes: Vec<(usize, f32, bool)> = entities
        .iter()
        .enumerate()
        .filter_map(|(i, e)| match &e.kind {
            EntityKind::Foe(f) if f.agent.alive() => {
                Some((i, e.center().x, f.strategy.wants_separation()))
            }
            _ => None,
        })
        .collect();

    for e in entities.iter_mut() {
        if let Some(f) = e.foe_mut() {
            f.touching_ally = false;
        }
    }
    if foes.len() < 2 {
        return;
    }

    for a in 0..foes.len() {
        let (ia, xa, wants_sep) = foes[a];
        let mut push = 0.0;
        let mut ally = false;

        for (b, &(ib, xb, _)) in foes.iter().enumerate() {
            if a == b {
                continue;
            }
            let dx = xa - xb;
            if dx.abs() < TILE_SIZE {
                ally = true;
                if wants_sep {
                    let dir = if dx == 0.0 {
                        if ia < ib { -1.0 } else { 1.0 }
                    } else {
                        dx.signum()
                    };
                    push += dir * SEPARATION_PUSH * dt;
                }
            }
        }

        if ally {
            if let Some(f) = entities[ia].foe_mut() {
                f.touching_ally = true;
            }
        }
        disp[ia].x += push;
    }
}

/// Projectiles resolve by plain overlap, not by the axis sweep: a solid
/// absorbs the shot, a living foe takes its damage, the player is ignored.
fn resolve_projectiles(entities: &mut [Entity], events: &mut Vec<GameEvent>) {
    for p in 0..entities.len() {
        let damage = match &entities[p].kind {
            EntityKind::Projectile(pr) if !entities[p].removable => pr.damage,
            _ => continue,
        };

        for j in 0..entities.len() {
            if j == p || entities[j].removable {
                continue;
            }
            if !entities[p].bbox().overlaps(entities[j].bbox()) {
                continue;
            }

            if entities[j].solid {
                entities[p].removable = true;
                break;
            }

            if entities[j].is_enemy() {
                let id = entities[j].id;
                let Some(foe) = entities[j].foe_mut() else {
                    continue;
                };
                if !foe.agent.alive() {
                    // Corpses waiting out their death visual don't eat shots
                    continue;
                }
                if foe.agent.apply_damage(damage) {
                    events.push(GameEvent::Damaged { id, amount: damage });
                }
                entities[p].removable = true;
                break;
            }
            // Player overlap is ignored: no friendly fire
        }
    }
}

/// Enemy/player body contact: the entity being processed damages the other
/// side. Both directions fire over the frame as each side takes its turn.
/// Runs regardless of displacement so the zero-displacement axis skip in
/// the solid pass stays a pure optimization.
fn melee_pass(entities: &mut [Entity], i: usize, events: &mut Vec<GameEvent>) {
    for j in 0..entities.len() {
        if j == i {
            continue;
        }
        let opposed = (entities[i].is_enemy() && entities[j].is_player())
            || (entities[i].is_player() && entities[j].is_enemy());
        if !opposed || !entities[i].bbox().overlaps(entities[j].bbox()) {
            continue;
        }

        let damage = entities[i].agent().map_or(0.0, |a| a.damage);
        if damage <= 0.0 {
            continue;
        }
        let id = entities[j].id;
        if let Some(target) = entities[j].agent_mut() {
            if target.alive() && target.apply_damage(damage) {
                events.push(GameEvent::Damaged { id, amount: damage });
            }
        }
    }
}

/// Per-axis sweep of mobile agents against solids: X first, then Y against
/// the already-resolved-in-X position, so a falling corner contact cannot
/// tunnel diagonally. Each blocking solid snaps the agent flush against its
/// near face and zeroes that velocity component.
///
/// Blocking overlap is closed on the motion axis and strict on the cross
/// axis: flush contact with the floor must not block walking along it.
fn resolve_solids(entities: &mut [Entity], disp: &mut [Vec2], events: &mut Vec<GameEvent>) {
    let solids: Vec<(usize, Rect)> = entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.solid)
        .map(|(i, e)| (i, *e.bbox()))
        .collect();

    for i in 0..entities.len() {
        if !entities[i].is_agent() {
            continue;
        }

        if entities[i].agent().is_some_and(|a| a.alive()) {
            melee_pass(entities, i, events);
        }

        let mut d = disp[i];

        if d.x != 0.0 {
            for &(j, sb) in &solids {
                if j == i {
                    continue;
                }
                let hypo = entities[i].bbox().offset(d.x, 0.0);
                if !hypo.overlaps_closed_x(&sb) {
                    continue;
                }
                let (flush_x, side) = if d.x > 0.0 {
                    (sb.x - entities[i].bbox().w, WallSide::Right)
                } else {
                    (sb.x + sb.w, WallSide::Left)
                };
                d.x = flush_x - entities[i].bbox().x;
                entities[i].vel.x = 0.0;
                if let Some(agent) = entities[i].agent_mut() {
                    agent.wall_contact = Some(side);
                }
            }
        }

        if d.y != 0.0 {
            for &(j, sb) in &solids {
                if j == i {
                    continue;
                }
                let hypo = entities[i].bbox().offset(d.x, d.y);
                if !hypo.overlaps_closed_y(&sb) {
                    continue;
                }
                let flush_y = if d.y < 0.0 {
                    // Landing
                    if let Some(agent) = entities[i].agent_mut() {
                        agent.grounded = true;
                    }
                    sb.y + sb.h
                } else {
                    sb.y - entities[i].bbox().h
                };
                d.y = flush_y - entities[i].bbox().y;
                entities[i].vel.y = 0.0;
            }
        }

        entities[i].translate(d);
        disp[i] = d;
    }
}
