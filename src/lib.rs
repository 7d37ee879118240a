//! Kart Brawl - top-down vehicular combat arena
//!
//! Core modules:
//! - `sim`: Simulation (vehicle physics, collisions, weapons, AI, waves)
//! - `engine`: Owned simulation instance, input port and HUD snapshot
//! - `tuning`: Data-driven game balance (car classes, weapons, wave curve)
//! - `arena`: Built-in arena layouts and arena config loading

pub mod arena;
pub mod engine;
pub mod error;
pub mod sim;
pub mod tuning;

pub use arena::ArenaConfig;
pub use engine::{InputPort, Simulation, Snapshot};
pub use error::ConfigError;
pub use tuning::{CarClass, Tuning, WeaponKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Upper bound on a single frame's delta time (prevents instability on stalls)
    pub const MAX_DT: f32 = 0.05;
    /// Velocities are stored in per-tick units; positions integrate `vel * dt * MOTION_SCALE`
    pub const MOTION_SCALE: f32 = 20.0;

    /// Seconds between the last opponent dying and the next wave starting
    pub const WAVE_TRANSITION_DELAY: f32 = 3.0;
    /// Health restored to the player at the start of each wave
    pub const WAVE_HEAL: f32 = 30.0;
    /// Spawn protection for freshly spawned opponents (seconds)
    pub const SPAWN_INVULNERABILITY: f32 = 2.0;
    /// Clearance radius used when validating spawn points
    pub const SPAWN_CLEARANCE: f32 = 40.0;

    /// Pickup contact radius added to the vehicle radius
    pub const PAD_RADIUS: f32 = 30.0;
    /// Seconds a pad stays inactive after being triggered
    pub const PAD_COOLDOWN: f32 = 10.0;

    /// Kill feed entries older than this (seconds) are evicted
    pub const KILL_FEED_WINDOW: f32 = 3.0;
    /// Score awarded to the player per kill
    pub const KILL_SCORE: u64 = 100;

    /// Half extents of the presentation viewport, used for "is it on screen" feedback
    pub const VIEW_HALF_WIDTH: f32 = 960.0;
    pub const VIEW_HALF_HEIGHT: f32 = 540.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest signed rotation from `from` to `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a direction vector (0 for the zero vector)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_angle_delta_takes_short_way() {
        let d = angle_delta(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-4);
        let d = angle_delta(0.1, -0.1);
        assert!((d + 0.2).abs() < 1e-5);
    }
}
