//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied delta time, clamped by the engine
//! - Seeded RNG only (`World::rng`)
//! - Stable iteration order (player first, then opponents in spawn order)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod effects;
pub mod geometry;
pub mod physics;
pub mod state;
pub mod tick;
pub mod wave;
pub mod weapons;

pub use effects::{MAX_PARTICLES, Particle, ParticleKind, SparkTier};
pub use geometry::{Obstacle, has_line_of_sight};
pub use state::{
    AiBrain, AiMode, Ammo, Camera, EntityId, GameState, KillEvent, PickupPad, Pilot, Projectile,
    Vehicle, World,
};
pub use tick::{InputState, TickOutcome, tick};
pub use wave::start_wave;
