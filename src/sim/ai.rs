//! Opponent decision making
//!
//! Every tick each opponent scores the vehicles it can detect, picks a mode
//! (flee, go for a weapon, attack, wander), steers toward the resulting point
//! and fires when its nose is on a visible target.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use super::geometry::{Obstacle, has_line_of_sight};
use super::state::{AiMode, EntityId, GameState, Vehicle};
use super::weapons;
use crate::tuning::{Tuning, WaveParams, WeaponKind};
use crate::{angle_delta, angle_of, normalize_angle};

/// Score a target needs before it counts as seen (line of sight alone gives 200)
pub const SIGHT_SCORE: f32 = 200.0;
/// Flee below this fraction of max health
pub const FLEE_HEALTH: f32 = 0.25;
/// Ranged weapons back off inside this distance
pub const STANDOFF_RANGE: f32 = 400.0;
/// Seconds between wander destinations
pub const WANDER_INTERVAL: f32 = 3.0;
/// Obstacle probe distance ahead of the car
pub const WHISKER_LENGTH: f32 = 80.0;
/// Fire when the target is within this heading error (radians)
pub const FIRE_CONE: f32 = 0.4;
/// Aim error at zero accuracy (radians, either side)
pub const MAX_AIM_ERROR: f32 = 0.25;

/// Best candidate from the target scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetChoice {
    pub id: EntityId,
    pub pos: Vec2,
    pub score: f32,
}

/// How attractive `target` is to `me`, or `None` when out of detection range
pub fn target_score(me: &Vehicle, target: &Vehicle, range: f32, obstacles: &[Obstacle]) -> Option<f32> {
    let dist = me.pos.distance(target.pos);
    if dist > range {
        return None;
    }
    let mut score = 1000.0 / (dist + 1.0);
    if target.is_player() {
        score += 50.0;
    }
    if target.health < 30.0 {
        score += 40.0;
    }
    if has_line_of_sight(me.pos, target.pos, obstacles) {
        score += 200.0;
    }
    Some(score)
}

/// Highest-scoring active vehicle other than `me`
pub fn best_target<'a>(
    me: &Vehicle,
    candidates: impl Iterator<Item = &'a Vehicle>,
    range: f32,
    obstacles: &[Obstacle],
) -> Option<TargetChoice> {
    candidates
        .filter(|t| t.id != me.id && t.is_active())
        .filter_map(|t| {
            target_score(me, t, range, obstacles).map(|score| TargetChoice {
                id: t.id,
                pos: t.pos,
                score,
            })
        })
        .fold(None, |best: Option<TargetChoice>, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
}

/// Mode priority: flee, restock, attack, wander
pub fn choose_mode(me: &Vehicle, best: Option<&TargetChoice>) -> AiMode {
    let top_score = best.map_or(f32::NEG_INFINITY, |b| b.score);
    if me.health < me.max_health * FLEE_HEALTH {
        AiMode::Flee
    } else if me.weapon == WeaponKind::DEFAULT && top_score < SIGHT_SCORE {
        AiMode::SeekItem
    } else if best.is_some() {
        AiMode::Attack
    } else {
        AiMode::Wander
    }
}

/// Think and steer for the opponent at `index`
pub fn update_opponent(state: &mut GameState, index: usize, tuning: &Tuning, wave: &WaveParams, dt: f32) {
    let Some(me) = state.opponents.get(index) else {
        return;
    };
    if !me.is_active() {
        return;
    }

    let best = best_target(me, state.vehicles(), wave.detection_range, &state.world.obstacles);
    let can_see = best.is_some_and(|b| b.score > SIGHT_SCORE);
    let stats = tuning.cars.get(me.class);
    let turn_rate = stats.turn_speed * wave.turn_skill;
    let mut speed = stats.speed;
    let mut mode = choose_mode(me, best.as_ref());
    let mut should_fire = false;
    let mut lock = me.lock;

    let mut steer = match (mode, best) {
        (AiMode::Flee, Some(threat)) => Some(me.pos + (me.pos - threat.pos)),
        (AiMode::SeekItem, _) => state
            .world
            .pads
            .iter()
            .filter(|p| p.active)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(me.pos)
                    .total_cmp(&b.pos.distance_squared(me.pos))
            })
            .map(|p| p.pos),
        (AiMode::Attack, Some(target)) => {
            if me.weapon.is_ranged() && me.pos.distance(target.pos) < STANDOFF_RANGE {
                speed = -speed * 0.5;
            }
            lock = Some(target.id);
            let aim = angle_delta(me.rotation, angle_of(target.pos - me.pos));
            should_fire = can_see && aim.abs() < FIRE_CONE;
            Some(target.pos)
        }
        _ => None,
    };
    if steer.is_none() {
        mode = AiMode::Wander;
    }

    let world = &mut state.world;
    let me = &mut state.opponents[index];
    me.lock = lock;

    if mode == AiMode::Wander {
        let bounds = world.bounds;
        if let Some(brain) = me.brain_mut() {
            brain.wander_timer -= dt;
            if brain.wander_timer <= 0.0 {
                brain.wander_target = Vec2::new(
                    world.rng.random::<f32>() * bounds.x,
                    world.rng.random::<f32>() * bounds.y,
                );
                brain.wander_timer = WANDER_INTERVAL;
            }
            steer = Some(brain.wander_target);
        }
    }

    if let Some(brain) = me.brain_mut() {
        brain.mode = mode;
        brain.steer_target = steer;
    }

    if let Some(target) = steer {
        let desired = angle_of(target - me.pos);
        let diff = angle_delta(me.rotation, desired);
        if diff.abs() > turn_rate {
            me.rotation += diff.signum() * turn_rate;
        } else {
            me.rotation = desired;
        }

        let whisker = me.pos + me.facing() * WHISKER_LENGTH;
        if world.blocked(whisker, me.radius) {
            speed = -speed * 0.5;
            me.rotation += turn_rate * 2.0;
        }
        me.rotation = normalize_angle(me.rotation);

        me.thrust = if diff.abs() < FRAC_PI_2 {
            speed
        } else {
            speed * 0.2
        };
    }

    if should_fire {
        let spread = (1.0 - wave.accuracy) * MAX_AIM_ERROR;
        let aim_error = (world.rng.random::<f32>() * 2.0 - 1.0) * spread;
        weapons::fire(me, aim_error, &tuning.weapons, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaConfig;
    use crate::sim::state::{AiBrain, Pilot};
    use crate::tuning::CarClass;

    fn setup() -> (GameState, Tuning) {
        let tuning = Tuning::default();
        let mut state = GameState::new(&ArenaConfig::grid(), CarClass::Speedster, &tuning, 21);
        // Open ground in the top-left quadrant, away from pads
        state.player.pos = Vec2::new(300.0, 800.0);
        let id = state.world.next_entity_id();
        state.opponents.push(Vehicle::new(
            id,
            "Glitch",
            CarClass::Speedster,
            tuning.cars.get(CarClass::Speedster),
            Vec2::new(300.0, 1100.0),
            0.0,
            Pilot::Ai(AiBrain::default()),
        ));
        (state, tuning)
    }

    fn mode(state: &GameState) -> AiMode {
        state.opponents[0].brain().map(|b| b.mode).unwrap_or_default()
    }

    fn wave() -> WaveParams {
        Tuning::default().waves.for_wave(10)
    }

    #[test]
    fn test_target_score_terms() {
        let (state, _) = setup();
        let me = &state.opponents[0];
        let score = target_score(me, &state.player, 2000.0, &[]).unwrap();
        let expected = 1000.0 / 301.0 + 50.0 + 200.0;
        assert!((score - expected).abs() < 1e-3);
        assert!(target_score(me, &state.player, 100.0, &[]).is_none());
    }

    #[test]
    fn test_low_health_flees_away_from_threat() {
        let (mut state, tuning) = setup();
        state.opponents[0].health = 10.0;
        update_opponent(&mut state, 0, &tuning, &wave(), 0.016);
        assert_eq!(mode(&state), AiMode::Flee);
        let target = state.opponents[0].brain().unwrap().steer_target.unwrap();
        assert!(target.y > state.opponents[0].pos.y);
    }

    #[test]
    fn test_flee_interrupts_attack() {
        let (mut state, tuning) = setup();
        state.opponents[0].rotation = -FRAC_PI_2;
        update_opponent(&mut state, 0, &tuning, &wave(), 0.016);
        assert_eq!(mode(&state), AiMode::Attack);

        state.opponents[0].health = state.opponents[0].max_health * FLEE_HEALTH - 1.0;
        update_opponent(&mut state, 0, &tuning, &wave(), 0.016);
        assert_eq!(mode(&state), AiMode::Flee);
        let target = state.opponents[0].brain().unwrap().steer_target.unwrap();
        assert!(target.y > state.player.pos.y);
        assert!(target.y > state.opponents[0].pos.y);
    }

    #[test]
    fn test_unarmed_without_sight_seeks_pad() {
        let (mut state, tuning) = setup();
        // Put the player out of detection range
        state.player.pos = Vec2::new(1900.0, 100.0);
        let w = tuning.waves.for_wave(1);
        update_opponent(&mut state, 0, &tuning, &w, 0.016);
        assert_eq!(mode(&state), AiMode::SeekItem);
        // Nearest active pad to (300, 1100) is (400, 1000)
        assert_eq!(
            state.opponents[0].brain().unwrap().steer_target,
            Some(Vec2::new(400.0, 1000.0))
        );
    }

    #[test]
    fn test_no_pads_falls_back_to_wander() {
        let (mut state, tuning) = setup();
        state.player.pos = Vec2::new(1900.0, 100.0);
        for pad in &mut state.world.pads {
            pad.trigger();
        }
        let w = tuning.waves.for_wave(1);
        update_opponent(&mut state, 0, &tuning, &w, 0.016);
        assert_eq!(mode(&state), AiMode::Wander);
        let brain = state.opponents[0].brain().unwrap();
        assert!((brain.wander_timer - WANDER_INTERVAL).abs() < 1e-6);
        assert_eq!(brain.steer_target, Some(brain.wander_target));
    }

    #[test]
    fn test_visible_target_is_attacked_and_shot() {
        let (mut state, tuning) = setup();
        // Facing straight at the player (up)
        state.opponents[0].rotation = -FRAC_PI_2;
        let shots = state.world.projectiles.len();
        update_opponent(&mut state, 0, &tuning, &wave(), 0.016);
        assert_eq!(mode(&state), AiMode::Attack);
        assert_eq!(state.opponents[0].lock, Some(state.player.id));
        assert_eq!(state.world.projectiles.len(), shots + 1);
    }

    #[test]
    fn test_ranged_weapon_keeps_distance() {
        let (mut state, tuning) = setup();
        state.opponents[0].equip(WeaponKind::Cannon, tuning.weapons.get(WeaponKind::Cannon));
        state.opponents[0].rotation = -FRAC_PI_2;
        state.opponents[0].fire_cooldown = 1.0;
        update_opponent(&mut state, 0, &tuning, &wave(), 0.016);
        assert_eq!(mode(&state), AiMode::Attack);
        assert!(state.opponents[0].thrust < 0.0);
    }

    #[test]
    fn test_turn_is_rate_limited() {
        let (mut state, tuning) = setup();
        state.opponents[0].rotation = FRAC_PI_2; // facing away from the player
        let w = wave();
        update_opponent(&mut state, 0, &tuning, &w, 0.016);
        let turn_rate = tuning.cars.speedster.turn_speed * w.turn_skill;
        let turned = angle_delta(FRAC_PI_2, state.opponents[0].rotation).abs();
        assert!((turned - turn_rate).abs() < 1e-4);
        // Heading error above 90 degrees: crawl
        assert!((state.opponents[0].thrust - tuning.cars.speedster.speed * 0.2).abs() < 1e-4);
    }
}
