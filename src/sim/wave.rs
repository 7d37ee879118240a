//! Wave director
//!
//! Spawns each wave's opponents and schedules the next wave once the arena is
//! cleared.

use glam::Vec2;
use rand::Rng;

use super::effects::ParticleKind;
use super::state::{AiBrain, GameState, Pilot, Vehicle, World};
use crate::consts::*;
use crate::normalize_angle;
use crate::tuning::{CarClass, Tuning};

/// Opponent call signs
pub const BOT_NAMES: [&str; 15] = [
    "Speedy", "Crash", "DriftKing", "Turbo", "Nitro", "Axel", "Sprocket", "Vortex", "Glitch",
    "Rocket", "Shadow", "Blaze", "Neon", "Cyber", "Venom",
];

/// Random spawn tries before falling back to a grid scan
pub const SPAWN_ATTEMPTS: usize = 64;
const SPAWN_GRID_STEP: f32 = 50.0;

/// Begin wave `wave`: spawn its opponents, heal the player, show the banner
pub fn start_wave(state: &mut GameState, wave: u32, tuning: &Tuning) {
    state.wave = wave;
    state.transition = None;

    let params = tuning.waves.for_wave(wave);
    for _ in 0..params.opponent_count {
        spawn_opponent(state, tuning);
    }

    if state.player.alive {
        state.player.heal(WAVE_HEAL);
    }
    let banner_pos = state.player.pos;
    state
        .world
        .spawn_particle(banner_pos, 3.0, ParticleKind::WaveBanner { wave });

    log::info!(
        "Wave {} started: {} opponents, detection {:.0}, accuracy {:.2}",
        wave,
        params.opponent_count,
        params.detection_range,
        params.accuracy
    );
}

fn spawn_opponent(state: &mut GameState, tuning: &Tuning) {
    let world = &mut state.world;
    let class = CarClass::ALL[world.rng.random_range(0..CarClass::ALL.len())];
    let name = BOT_NAMES[world.rng.random_range(0..BOT_NAMES.len())];
    let rotation = normalize_angle(world.rng.random::<f32>() * std::f32::consts::TAU);
    let pos = spawn_point(world);
    let id = world.next_entity_id();

    let mut opponent = Vehicle::new(
        id,
        name,
        class,
        tuning.cars.get(class),
        pos,
        rotation,
        Pilot::Ai(AiBrain::default()),
    );
    opponent.invulnerable = SPAWN_INVULNERABILITY;

    world.spawn_particle(pos, 1.0, ParticleKind::RespawnBeam);
    state.opponents.push(opponent);
}

/// A clear spot for a new vehicle
///
/// Random tries first, then a deterministic scan of the arena; if nothing is
/// clear the arena centre is used.
pub fn spawn_point(world: &mut World) -> Vec2 {
    let bounds = world.bounds;
    for _ in 0..SPAWN_ATTEMPTS {
        let p = Vec2::new(
            world.rng.random::<f32>() * bounds.x,
            world.rng.random::<f32>() * bounds.y,
        );
        if !world.blocked(p, SPAWN_CLEARANCE) {
            return p;
        }
    }

    let mut y = SPAWN_CLEARANCE + 1.0;
    while y < bounds.y - SPAWN_CLEARANCE {
        let mut x = SPAWN_CLEARANCE + 1.0;
        while x < bounds.x - SPAWN_CLEARANCE {
            let p = Vec2::new(x, y);
            if !world.blocked(p, SPAWN_CLEARANCE) {
                return p;
            }
            x += SPAWN_GRID_STEP;
        }
        y += SPAWN_GRID_STEP;
    }

    log::warn!("No clear spawn point found, using arena centre");
    bounds * 0.5
}

/// Run the between-wave countdown; returns true when a new wave starts
pub fn update_transition(state: &mut GameState, tuning: &Tuning, dt: f32) -> bool {
    if state.transition.is_none() && state.opponents_remaining() == 0 {
        state.transition = Some(WAVE_TRANSITION_DELAY);
    }

    let due = match state.transition.as_mut() {
        Some(t) => {
            *t -= dt;
            *t <= 0.0
        }
        None => false,
    };
    if due {
        start_wave(state, state.wave + 1, tuning);
    }
    due
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaConfig;
    use crate::sim::geometry::Obstacle;
    use proptest::prelude::*;

    fn state() -> GameState {
        GameState::new(&ArenaConfig::maze(), CarClass::Enforcer, &Tuning::default(), 77)
    }

    #[test]
    fn test_start_wave_spawns_protected_opponents() {
        let tuning = Tuning::default();
        let mut s = state();
        start_wave(&mut s, 5, &tuning);
        assert_eq!(s.wave, 5);
        assert_eq!(s.opponents.len(), 3);
        for o in &s.opponents {
            assert!(!s.world.blocked(o.pos, SPAWN_CLEARANCE));
            assert_eq!(o.invulnerable, SPAWN_INVULNERABILITY);
            assert!(BOT_NAMES.contains(&o.name.as_str()));
            assert!(!o.is_player());
        }
        assert!(s
            .world
            .particles
            .iter()
            .any(|p| p.kind == ParticleKind::WaveBanner { wave: 5 }));
    }

    #[test]
    fn test_wave_heal_is_capped() {
        let tuning = Tuning::default();
        let mut s = state();
        s.player.health = s.player.max_health - 10.0;
        start_wave(&mut s, 1, &tuning);
        assert_eq!(s.player.health, s.player.max_health);

        s.player.health = 50.0;
        start_wave(&mut s, 2, &tuning);
        assert_eq!(s.player.health, 80.0);
    }

    #[test]
    fn test_cleared_wave_advances_after_delay() {
        let tuning = Tuning::default();
        let mut s = state();
        start_wave(&mut s, 1, &tuning);
        for o in &mut s.opponents {
            o.removed = true;
        }

        assert!(!update_transition(&mut s, &tuning, 1.0));
        assert!(s.transition.is_some());
        assert!(!update_transition(&mut s, &tuning, 1.0));
        assert!(update_transition(&mut s, &tuning, 1.0));
        assert_eq!(s.wave, 2);
        assert!(s.transition.is_none());
    }

    #[test]
    fn test_spawn_point_falls_back_to_centre() {
        let mut arena = ArenaConfig::grid();
        arena.obstacles = vec![Obstacle::new(0.0, 0.0, 2000.0, 2000.0)];
        let mut world = World::new(&arena, 1);
        assert_eq!(spawn_point(&mut world), Vec2::new(1000.0, 1000.0));
    }

    #[test]
    fn test_spawn_point_grid_scan_finds_pocket() {
        let mut arena = ArenaConfig::grid();
        // Everything blocked except a pocket in the bottom-right corner
        arena.obstacles = vec![
            Obstacle::new(0.0, 0.0, 2000.0, 1700.0),
            Obstacle::new(0.0, 1700.0, 1700.0, 300.0),
        ];
        let mut world = World::new(&arena, 1);
        let p = spawn_point(&mut world);
        assert!(!world.blocked(p, SPAWN_CLEARANCE));
    }

    proptest! {
        #[test]
        fn prop_opponent_count_never_shrinks(wave in 1u32..200) {
            let curve = Tuning::default().waves;
            let now = curve.for_wave(wave);
            let next = curve.for_wave(wave + 1);
            prop_assert!(next.opponent_count >= now.opponent_count);
            prop_assert!(next.detection_range >= now.detection_range);
            prop_assert!(now.opponent_count <= curve.max_opponents);
        }
    }
}
