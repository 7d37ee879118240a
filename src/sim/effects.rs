//! Visual events
//!
//! Particles never affect gameplay; they exist so a presentation layer has
//! something to draw. Each kind carries only the data it needs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::World;
use crate::heading;
use crate::tuning::WeaponKind;

/// Maximum live particles; the oldest are dropped first
pub const MAX_PARTICLES: usize = 512;

const WHITE: u32 = 0xffffff;
const FIRE_COUNT: usize = 20;

/// Drift charge level, shown as spark colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparkTier {
    Cool,
    Warm,
    Hot,
}

impl SparkTier {
    pub fn for_charge(charge: f32) -> Self {
        if charge > 2.5 {
            SparkTier::Hot
        } else if charge > 1.2 {
            SparkTier::Warm
        } else {
            SparkTier::Cool
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark { color: u32 },
    Fire { size: f32 },
    Shockwave { color: u32, start_radius: f32 },
    MuzzleFlash { weapon: WeaponKind },
    DriftSpark { tier: SparkTier },
    BoostTrail,
    RespawnBeam,
    DamageText { amount: u32 },
    WeaponLabel { weapon: WeaponKind },
    WaveBanner { wave: u32 },
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
    pub kind: ParticleKind,
}

impl World {
    /// Add a particle, evicting the oldest when full
    pub fn emit(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            let excess = self.particles.len() + 1 - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
        self.particles.push(particle);
    }

    /// Particle with a small random drift
    pub fn spawn_particle(&mut self, pos: Vec2, life: f32, kind: ParticleKind) {
        let vel = Vec2::new(
            self.rng.random::<f32>() - 0.5,
            self.rng.random::<f32>() - 0.5,
        ) * 2.0;
        self.emit(Particle {
            pos,
            vel,
            life,
            max_life: life,
            kind,
        });
    }
}

pub fn spark(world: &mut World, pos: Vec2, life: f32, color: u32) {
    world.spawn_particle(pos, life, ParticleKind::Spark { color });
}

pub fn shockwave(world: &mut World, pos: Vec2, life: f32, color: u32) {
    world.spawn_particle(
        pos,
        life,
        ParticleKind::Shockwave {
            color,
            start_radius: 10.0,
        },
    );
}

/// Fire burst plus shockwave; shakes the camera when on screen
pub fn explosion(world: &mut World, pos: Vec2) {
    for _ in 0..FIRE_COUNT {
        let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
        let speed = world.rng.random::<f32>() * 10.0;
        let size = 5.0 + world.rng.random::<f32>() * 10.0;
        let life = 0.5 + world.rng.random::<f32>() * 0.5;
        world.emit(Particle {
            pos,
            vel: heading(angle) * speed,
            life,
            max_life: 1.0,
            kind: ParticleKind::Fire { size },
        });
    }
    shockwave(world, pos, 0.5, WHITE);

    if world.camera.is_visible(pos) {
        world.add_trauma(0.5);
    }
}

pub fn damage_text(world: &mut World, pos: Vec2, amount: f32) {
    let amount = amount.max(0.0).ceil() as u32;
    world.spawn_particle(pos, 0.5, ParticleKind::DamageText { amount });
}

pub fn muzzle_flash(world: &mut World, pos: Vec2, weapon: WeaponKind) {
    world.spawn_particle(pos, 0.1, ParticleKind::MuzzleFlash { weapon });
}

/// Celebration burst when a vehicle collects a weapon
pub fn pickup_flourish(world: &mut World, pos: Vec2, weapon: WeaponKind, color: u32) {
    world.spawn_particle(pos, 1.0, ParticleKind::WeaponLabel { weapon });
    shockwave(world, pos, 0.6, color);

    match weapon {
        WeaponKind::Missile => {
            // Rising stream
            for _ in 0..10 {
                let jitter = Vec2::new(
                    world.rng.random::<f32>() - 0.5,
                    world.rng.random::<f32>() - 0.5,
                ) * 20.0;
                let rise = -20.0 - world.rng.random::<f32>() * 20.0;
                world.emit(Particle {
                    pos: pos + jitter,
                    vel: Vec2::new(0.0, rise),
                    life: 0.8,
                    max_life: 0.8,
                    kind: ParticleKind::Spark { color },
                });
            }
        }
        WeaponKind::MachineGun => {
            for i in 0..8 {
                let angle = std::f32::consts::TAU / 8.0 * i as f32 + world.rng.random::<f32>();
                world.emit(Particle {
                    pos,
                    vel: heading(angle) * 15.0,
                    life: 0.4,
                    max_life: 0.4,
                    kind: ParticleKind::Spark { color },
                });
            }
        }
        WeaponKind::Cannon | WeaponKind::Bomb => explosion(world, pos),
        WeaponKind::Mine | WeaponKind::Spikes => shockwave(world, pos, 1.0, color),
        WeaponKind::Shotgun => {
            for _ in 0..15 {
                let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
                let dist = world.rng.random::<f32>() * 30.0;
                world.emit(Particle {
                    pos: pos + heading(angle) * dist,
                    vel: Vec2::ZERO,
                    life: 0.5,
                    max_life: 0.5,
                    kind: ParticleKind::Spark { color },
                });
            }
        }
        WeaponKind::Blaster => {}
    }
}

/// Drift particles and fade-out
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.life -= dt;
        p.pos += p.vel * dt;
    }
    particles.retain(|p| p.life > 0.0);
}
