//! Weapons, projectiles and damage
//!
//! Firing only spawns projectiles; hits are found by the collision pass and
//! routed back through [`apply_damage`] / [`explode`].

use glam::Vec2;
use rand::Rng;

use super::effects;
use super::state::{
    AiMode, Ammo, EntityId, GameState, KillEvent, Projectile, Vehicle, World,
};
use crate::consts::{KILL_SCORE, MOTION_SCALE};
use crate::tuning::{Delivery, WeaponKind, WeaponTable};
use crate::{angle_delta, angle_of, heading};

/// Mines and spikes are dropped this far behind the firer
pub const DROP_OFFSET: f32 = 40.0;
pub const DROP_RADIUS: f32 = 15.0;
pub const DROP_LIFETIME: f32 = 20.0;
/// Shots spawn this far beyond the vehicle's edge
pub const MUZZLE_GAP: f32 = 10.0;
pub const SHOT_LIFETIME: f32 = 2.0;
/// Peak height of a lobbed arc
pub const LOB_APEX: f32 = 100.0;
/// Max heading change of a homing projectile per tick (radians)
pub const HOMING_STEP: f32 = 0.1;
/// Radius used when testing projectiles against walls
pub const WALL_PROBE_RADIUS: f32 = 5.0;
/// Landing blast of a lobbed shot that runs out of time
pub const LOB_BLAST_RADIUS: f32 = 100.0;
pub const LOB_BLAST_DAMAGE: f32 = 70.0;

/// Try to fire the equipped weapon
///
/// Returns true if anything was launched. An exhausted limited weapon is
/// swapped back to the default without firing.
pub fn fire(vehicle: &mut Vehicle, aim_error: f32, weapons: &WeaponTable, world: &mut World) -> bool {
    if vehicle.fire_cooldown > 0.0 {
        return false;
    }
    if vehicle.ammo.is_empty() && vehicle.weapon != WeaponKind::DEFAULT {
        vehicle.weapon = WeaponKind::DEFAULT;
        vehicle.ammo = Ammo::Unlimited;
        return false;
    }

    let kind = vehicle.weapon;
    let stats = weapons.get(kind);
    vehicle.fire_cooldown = stats.fire_interval;
    vehicle.ammo.consume();

    let delivery = kind.delivery();
    if delivery == Delivery::Stationary {
        let id = world.next_entity_id();
        world.projectiles.push(Projectile {
            id,
            kind,
            pos: vehicle.pos - vehicle.facing() * DROP_OFFSET,
            vel: Vec2::ZERO,
            radius: DROP_RADIUS,
            damage: stats.damage,
            owner: Some(vehicle.id),
            time_left: DROP_LIFETIME,
            lifetime: DROP_LIFETIME,
            homing_target: None,
            height: None,
            explosion_radius: stats.explosion_radius,
            color: stats.color,
            removed: false,
        });
        return true;
    }

    for _ in 0..stats.count {
        let jitter = (world.rng.random::<f32>() - 0.5) * stats.spread;
        let dir = heading(vehicle.rotation + aim_error + jitter);
        let id = world.next_entity_id();
        world.projectiles.push(Projectile {
            id,
            kind,
            pos: vehicle.pos + dir * (vehicle.radius + MUZZLE_GAP),
            vel: dir * stats.speed,
            radius: if kind == WeaponKind::Cannon { 8.0 } else { 4.0 },
            damage: stats.damage,
            owner: Some(vehicle.id),
            time_left: SHOT_LIFETIME,
            lifetime: SHOT_LIFETIME,
            homing_target: (delivery == Delivery::Homing)
                .then_some(vehicle.lock)
                .flatten(),
            height: (delivery == Delivery::Lobbed).then_some(0.0),
            explosion_radius: stats.explosion_radius,
            color: stats.color,
            removed: false,
        });
    }

    // Recoil
    let facing = vehicle.facing();
    vehicle.vel -= facing * (stats.damage / 10.0);
    if vehicle.is_player() {
        world.add_trauma(stats.damage / 200.0);
    }
    effects::muzzle_flash(world, vehicle.pos + facing * 30.0, kind);
    true
}

/// Move projectiles, steer homing ones, expire and detonate
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let mut detonations = Vec::new();

    for i in 0..state.world.projectiles.len() {
        if state.world.projectiles[i].removed {
            continue;
        }

        let target_pos = state.world.projectiles[i]
            .homing_target
            .and_then(|id| state.vehicle(id))
            .filter(|v| !v.removed)
            .map(|v| v.pos);

        let world = &mut state.world;
        let p = &mut world.projectiles[i];
        p.time_left -= dt;

        if let Some(h) = p.height.as_mut() {
            let progress = 1.0 - p.time_left / p.lifetime;
            *h = if p.time_left <= 0.0 {
                0.0
            } else {
                (progress * std::f32::consts::PI).sin().max(0.0) * LOB_APEX
            };
        }

        if let Some(target) = target_pos {
            let current = angle_of(p.vel);
            let step = angle_delta(current, angle_of(target - p.pos)).clamp(-HOMING_STEP, HOMING_STEP);
            p.vel = heading(current + step) * p.vel.length();
        }

        p.pos += p.vel * dt * MOTION_SCALE;

        let (pos, lobbed) = (p.pos, p.is_lobbed());
        if !lobbed && world.blocked(pos, WALL_PROBE_RADIUS) {
            world.projectiles[i].removed = true;
            let color = world.projectiles[i].color;
            effects::spark(world, pos, 5.0, color);
            continue;
        }

        let p = &mut world.projectiles[i];
        if p.time_left <= 0.0 {
            p.removed = true;
            if lobbed {
                detonations.push((pos, p.owner));
            }
        }
    }

    for (pos, owner) in detonations {
        explode(state, pos, LOB_BLAST_RADIUS, LOB_BLAST_DAMAGE, owner);
    }
}

/// Visual blast plus linear-falloff damage to every active vehicle in range
///
/// The owner is not exempt. `damage <= 0` gives a purely visual explosion.
pub fn explode(state: &mut GameState, pos: Vec2, radius: f32, damage: f32, owner: Option<EntityId>) {
    effects::explosion(&mut state.world, pos);
    if damage <= 0.0 || radius <= 0.0 {
        return;
    }

    let hits: Vec<(EntityId, f32)> = state
        .vehicles()
        .filter(|v| v.is_active())
        .filter_map(|v| {
            let d = v.pos.distance(pos);
            (d < radius).then(|| (v.id, damage * (1.0 - d / radius)))
        })
        .collect();

    for (id, amount) in hits {
        apply_damage(state, id, amount, owner);
    }
}

/// Damage a vehicle and handle the kill if it drops to zero
pub fn apply_damage(state: &mut GameState, target: EntityId, amount: f32, attacker: Option<EntityId>) {
    let killer = attacker
        .and_then(|id| state.vehicle(id))
        .map(|v| v.name.clone());
    let player_id = state.player.id;

    let Some(victim) = state.vehicle_mut(target) else {
        return;
    };
    if !victim.is_active() {
        return;
    }

    victim.health = (victim.health - amount).max(0.0);
    let pos = victim.pos;
    let killed = victim.health <= 0.0;

    if killed {
        victim.alive = false;
        if !victim.is_player() {
            victim.removed = true;
        }
    } else if let Some(attacker) = attacker.filter(|a| *a != target) {
        let fleeing = victim.brain().is_some_and(|b| b.mode == AiMode::Flee);
        if victim.brain().is_some() && !fleeing {
            victim.lock = Some(attacker);
        }
    }
    let victim_name = victim.name.clone();

    effects::damage_text(&mut state.world, pos, amount);
    if !killed {
        return;
    }

    effects::explosion(&mut state.world, pos);
    if attacker == Some(player_id) {
        state.score += KILL_SCORE;
    }
    let killer = killer.unwrap_or_else(|| "Unknown".to_string());
    log::debug!("{} eliminated {}", killer, victim_name);
    state.kill_feed.push(KillEvent {
        killer,
        victim: victim_name,
        time: state.clock,
    });
}
