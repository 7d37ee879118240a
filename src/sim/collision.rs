//! Collision detection and response
//!
//! Runs once per tick after everything has moved, in a fixed order: pickups,
//! projectile hits, vehicle pairs, then walls. Only active vehicles (alive and
//! not removed) take part.

use glam::Vec2;
use rand::Rng;

use super::effects;
use super::state::{EntityId, GameState, Vehicle, World};
use super::weapons::{apply_damage, explode};
use crate::consts::PAD_RADIUS;
use crate::tuning::{Tuning, WeaponKind};

/// Projectile hit radius added to the target's radius
pub const HIT_MARGIN: f32 = 10.0;
/// Wall contacts harder than this shake the camera (player only)
pub const HARD_IMPACT: f32 = 5.0;
/// Upper bound on obstacle push-out passes per vehicle per tick
pub const MAX_WALL_PASSES: usize = 4;

const WHITE: u32 = 0xffffff;

/// Run every collision stage in order
pub fn resolve_collisions(state: &mut GameState, tuning: &Tuning) {
    resolve_pickups(state, tuning);
    resolve_projectile_hits(state);
    resolve_vehicle_pairs(state);
    resolve_walls(state);
}

fn active_ids(state: &GameState) -> Vec<EntityId> {
    state
        .vehicles()
        .filter(|v| v.is_active())
        .map(|v| v.id)
        .collect()
}

/// Active vehicles driving over active pads collect a random weapon
pub fn resolve_pickups(state: &mut GameState, tuning: &Tuning) {
    for id in active_ids(state) {
        for pad_index in 0..state.world.pads.len() {
            let Some(v) = state.vehicle(id) else {
                break;
            };
            let pad = &state.world.pads[pad_index];
            if !pad.active || v.pos.distance(pad.pos) >= v.radius + PAD_RADIUS {
                continue;
            }

            let pad_pos = pad.pos;
            state.world.pads[pad_index].trigger();
            let pick = WeaponKind::PICKUPS
                [state.world.rng.random_range(0..WeaponKind::PICKUPS.len())];
            let stats = tuning.weapons.get(pick);

            let Some(v) = state.vehicle_mut(id) else {
                break;
            };
            v.equip(pick, stats);
            let pos = v.pos;
            log::debug!("{} picked up {}", v.name, pick.label());

            effects::shockwave(&mut state.world, pad_pos, 1.0, WHITE);
            effects::pickup_flourish(&mut state.world, pos, pick, stats.color);
        }
    }
}

/// Each live projectile damages at most one vehicle
pub fn resolve_projectile_hits(state: &mut GameState) {
    for i in 0..state.world.projectiles.len() {
        let p = &state.world.projectiles[i];
        if p.removed || p.is_airborne() {
            continue;
        }
        let (pos, owner) = (p.pos, p.owner);

        let target = state.vehicles().find(|v| {
            v.is_active()
                && Some(v.id) != owner
                && v.invulnerable <= 0.0
                && pos.distance(v.pos) < v.radius + HIT_MARGIN
        });
        let Some(target) = target.map(|v| v.id) else {
            continue;
        };

        let p = &mut state.world.projectiles[i];
        p.removed = true;
        let (damage, splash, color) = (p.damage, p.explosion_radius, p.color);

        match splash {
            Some(radius) => explode(state, pos, radius, damage, owner),
            None => {
                apply_damage(state, target, damage, owner);
                effects::spark(&mut state.world, pos, 8.0, color);
            }
        }
    }
}

/// Push overlapping vehicles apart and trade momentum
pub fn resolve_vehicle_pairs(state: &mut GameState) {
    let GameState {
        player,
        opponents,
        world,
        ..
    } = state;

    for i in 0..opponents.len() {
        if player.is_active() && opponents[i].is_active() {
            if let Some(mid) = separate(player, &mut opponents[i]) {
                effects::spark(world, mid, 3.0, WHITE);
                world.add_trauma(0.2);
            }
        }
    }

    for i in 0..opponents.len() {
        let (head, tail) = opponents.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if a.is_active() && b.is_active() {
                if let Some(mid) = separate(a, b) {
                    effects::spark(world, mid, 3.0, WHITE);
                }
            }
        }
    }
}

/// Resolve one overlapping pair; returns the contact midpoint if they touched
///
/// Each vehicle is pushed half the overlap along the centre line (+X when the
/// centres coincide) and receives half the other's prior speed as an impulse.
pub fn separate(a: &mut Vehicle, b: &mut Vehicle) -> Option<Vec2> {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;
    if dist >= min_dist {
        return None;
    }

    let normal = if dist > 0.0 { delta / dist } else { Vec2::X };
    let push = normal * (min_dist - dist) * 0.5;
    a.pos -= push;
    b.pos += push;

    let (va, vb) = (a.speed(), b.speed());
    a.vel -= normal * vb * 0.5;
    b.vel += normal * va * 0.5;

    Some((a.pos + b.pos) * 0.5)
}

/// Keep every active vehicle inside the arena and out of obstacles
pub fn resolve_walls(state: &mut GameState) {
    let GameState {
        player,
        opponents,
        world,
        ..
    } = state;

    if player.is_active() && resolve_wall(player, world) > HARD_IMPACT {
        world.add_trauma(0.1);
    }
    for v in opponents.iter_mut().filter(|v| v.is_active()) {
        resolve_wall(v, world);
    }
}

/// Clamp to the arena and push out of obstacles, bouncing at half speed
///
/// Returns the hardest obstacle impact speed (velocity along the normal).
pub fn resolve_wall(v: &mut Vehicle, world: &World) -> f32 {
    let mut impact: f32 = 0.0;

    for _ in 0..MAX_WALL_PASSES {
        clamp_to_bounds(v, world.bounds);

        let mut touched = false;
        for obstacle in &world.obstacles {
            let Some(contact) = obstacle.circle_contact(v.pos, v.radius, world.bounds) else {
                continue;
            };
            touched = true;
            v.pos += contact.normal * contact.penetration;
            let dot = v.vel.dot(contact.normal);
            v.vel = reflect(v.vel, contact.normal) * 0.5;
            impact = impact.max(dot.abs());
        }
        if !touched {
            break;
        }
    }
    clamp_to_bounds(v, world.bounds);
    impact
}

fn clamp_to_bounds(v: &mut Vehicle, bounds: Vec2) {
    let r = v.radius;
    if v.pos.x < r {
        v.pos.x = r;
        v.vel.x *= -0.5;
    }
    if v.pos.y < r {
        v.pos.y = r;
        v.vel.y *= -0.5;
    }
    if v.pos.x > bounds.x - r {
        v.pos.x = bounds.x - r;
        v.vel.x *= -0.5;
    }
    if v.pos.y > bounds.y - r {
        v.pos.y = bounds.y - r;
        v.vel.y *= -0.5;
    }
}

/// Reflect velocity off a surface with given normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
