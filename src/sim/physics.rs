//! Vehicle physics: drift, boost, thrust, turning and integration
//!
//! Velocities are per-tick quantities; positions advance by
//! `vel * dt * MOTION_SCALE`.

use std::f32::consts::FRAC_PI_3;

use rand::Rng;

use super::effects::{self, ParticleKind, SparkTier};
use super::state::{Vehicle, World};
use super::tick::InputState;
use crate::consts::MOTION_SCALE;
use crate::tuning::{CarStats, Delivery};
use crate::{angle_delta, angle_of, normalize_angle};

/// Drift only engages above this speed
pub const DRIFT_MIN_SPEED: f32 = 2.0;
/// Friction while drifting (overrides the class value)
pub const DRIFT_FRICTION: f32 = 0.985;
/// Charge above which drift sparks appear
pub const DRIFT_SPARK_CHARGE: f32 = 1.0;
/// Charge needed for any boost on release
pub const DRIFT_BOOST_CHARGE: f32 = 1.2;
/// Charge needed for the long boost
pub const DRIFT_SUPER_CHARGE: f32 = 2.5;
pub const BOOST_MULT: f32 = 1.5;
/// Reverse thrust as a fraction of forward
pub const REVERSE_FACTOR: f32 = 0.5;
/// Player turn rate bonus over the class value
pub const PLAYER_TURN_MULT: f32 = 1.2;

/// Homing lock reach and half-angle of the forward cone
pub const LOCK_RANGE: f32 = 600.0;
pub const LOCK_CONE: f32 = FRAC_PI_3;

const DRIFT_BLUE: u32 = 0x3b82f6;

/// Advance one vehicle by `dt`
///
/// `input` is `Some` for the player; AI vehicles drive with the thrust their
/// brain chose and never drift. `speed_mult` is the wave's player speed bonus.
pub fn advance(
    vehicle: &mut Vehicle,
    input: Option<&InputState>,
    stats: &CarStats,
    speed_mult: f32,
    world: &mut World,
    dt: f32,
) {
    let drift_held = input.is_some_and(|i| i.drift);
    update_drift(vehicle, drift_held, world, dt);
    let boost = update_boost(vehicle, world, dt);

    let acc = match input {
        Some(input) => {
            let mut acc = 0.0;
            if input.forward {
                acc = stats.speed * boost * speed_mult;
            }
            if input.backward {
                acc = -stats.speed * REVERSE_FACTOR * speed_mult;
            }

            if acc != 0.0 || vehicle.speed() > 1.0 {
                let dir = if input.backward { -1.0 } else { 1.0 };
                let turn = stats.turn_speed * PLAYER_TURN_MULT * dir;
                if input.left {
                    vehicle.rotation -= turn;
                }
                if input.right {
                    vehicle.rotation += turn;
                }
                vehicle.rotation = normalize_angle(vehicle.rotation);
            }
            acc
        }
        None => vehicle.thrust * boost,
    };

    let friction = if vehicle.drifting {
        DRIFT_FRICTION
    } else {
        stats.friction
    };
    integrate(vehicle, acc, friction, dt);

    vehicle.fire_cooldown = (vehicle.fire_cooldown - dt).max(0.0);
}

/// Apply thrust along the facing, friction, then move
pub fn integrate(vehicle: &mut Vehicle, acc: f32, friction: f32, dt: f32) {
    vehicle.vel += vehicle.facing() * acc * dt;
    vehicle.vel *= friction;
    vehicle.pos += vehicle.vel * dt * MOTION_SCALE;
}

fn update_drift(vehicle: &mut Vehicle, held: bool, world: &mut World, dt: f32) {
    if held && vehicle.speed() > DRIFT_MIN_SPEED {
        if !vehicle.drifting {
            vehicle.drifting = true;
            vehicle.drift_charge = 0.0;
        }
        vehicle.drift_charge += dt;
        if vehicle.drift_charge > DRIFT_SPARK_CHARGE && world.rng.random::<f32>() < 0.3 {
            let tier = SparkTier::for_charge(vehicle.drift_charge);
            world.spawn_particle(vehicle.pos, 1.0, ParticleKind::DriftSpark { tier });
        }
        return;
    }

    if vehicle.drifting {
        if vehicle.drift_charge > DRIFT_BOOST_CHARGE {
            vehicle.boost_time = if vehicle.drift_charge > DRIFT_SUPER_CHARGE {
                2.0
            } else {
                1.0
            };
            effects::shockwave(world, vehicle.pos, 1.0, DRIFT_BLUE);
            if vehicle.is_player() {
                world.add_trauma(0.2);
            }
            log::debug!(
                "{} released drift at charge {:.2}",
                vehicle.name,
                vehicle.drift_charge
            );
        }
        vehicle.drifting = false;
    }
    vehicle.drift_charge = 0.0;
}

/// Count down boost and return the thrust multiplier for this tick
fn update_boost(vehicle: &mut Vehicle, world: &mut World, dt: f32) -> f32 {
    if vehicle.boost_time <= 0.0 {
        return 1.0;
    }
    vehicle.boost_time = (vehicle.boost_time - dt).max(0.0);
    if world.rng.random::<f32>() < 0.5 {
        let tail = vehicle.pos - vehicle.facing() * 20.0;
        world.spawn_particle(tail, 1.0, ParticleKind::BoostTrail);
    }
    BOOST_MULT
}

/// Pick the best homing target in front of the player
///
/// Candidates must be alive, within [`LOCK_RANGE`] and inside the forward
/// cone; closer and more centred targets score higher. Cleared whenever the
/// equipped weapon doesn't home.
pub fn acquire_lock(player: &mut Vehicle, opponents: &[Vehicle]) {
    if player.weapon.delivery() != Delivery::Homing {
        player.lock = None;
        return;
    }

    player.lock = opponents
        .iter()
        .filter(|o| o.is_active())
        .filter_map(|o| {
            let to = o.pos - player.pos;
            let dist = to.length();
            if dist > LOCK_RANGE {
                return None;
            }
            let off = angle_delta(player.rotation, angle_of(to)).abs();
            if off >= LOCK_CONE {
                return None;
            }
            let score = 1000.0 / dist.max(1.0) + 100.0 * (LOCK_CONE - off);
            Some((o.id, score))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
}
