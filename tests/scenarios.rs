//! End-to-end scenarios driven through the public API

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;
use kart_brawl::sim::{AiBrain, AiMode, InputState, Pilot, Vehicle};
use kart_brawl::{ArenaConfig, CarClass, InputPort, Simulation, Tuning, WeaponKind};

const DT: f32 = 1.0 / 60.0;

fn new_sim(seed: u64) -> (Simulation, InputPort, Rc<Cell<u32>>) {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut sim = Simulation::new(
        ArenaConfig::grid(),
        CarClass::Speedster,
        Tuning::default(),
        seed,
        move |_| counter.set(counter.get() + 1),
    );
    let port = InputPort::new();
    sim.start(port.clone());
    (sim, port, calls)
}

/// Empty the arena and hold off the next wave
fn quiet_arena(sim: &mut Simulation) {
    let state = sim.state_mut();
    state.opponents.clear();
    state.world.projectiles.clear();
    state.transition = Some(1000.0);
}

fn add_opponent(sim: &mut Simulation, pos: Vec2) {
    let stats = sim.tuning().cars.get(CarClass::Speedster).clone();
    let state = sim.state_mut();
    let id = state.world.next_entity_id();
    state.opponents.push(Vehicle::new(
        id,
        "Vortex",
        CarClass::Speedster,
        &stats,
        pos,
        0.0,
        Pilot::Ai(AiBrain::default()),
    ));
}

#[test]
fn test_wall_bounce_does_not_hurt() {
    let (mut sim, _port, _) = new_sim(11);
    quiet_arena(&mut sim);
    {
        let player = &mut sim.state_mut().player;
        player.pos = Vec2::new(40.0, 1000.0);
        player.vel = Vec2::new(-20.0, 0.0);
    }
    let health = sim.state().player.health;

    for _ in 0..5 {
        sim.frame(DT);
    }

    let player = &sim.state().player;
    assert_eq!(player.health, health);
    assert!(player.pos.x >= player.radius);
    assert!(player.vel.x > 0.0, "bounced back into the arena");
}

#[test]
fn test_ramming_a_pillar_bounces_without_damage() {
    let (mut sim, _port, _) = new_sim(19);
    quiet_arena(&mut sim);
    {
        // Heading right into the left face of the pillar at (500, 500)
        let player = &mut sim.state_mut().player;
        player.pos = Vec2::new(440.0, 600.0);
        player.vel = Vec2::new(25.0, 0.0);
    }
    let health = sim.state().player.health;

    for _ in 0..10 {
        sim.frame(DT);
    }

    let player = &sim.state().player;
    assert_eq!(player.health, health);
    assert!(player.vel.x < 0.0, "bounced off the pillar");
    assert!(player.pos.x <= 500.0 - player.radius + 1e-3);
}

#[test]
fn test_holding_fire_respects_interval() {
    let (mut sim, port, _) = new_sim(12);
    quiet_arena(&mut sim);
    sim.state_mut().player.pos = Vec2::new(250.0, 1400.0);
    port.set(InputState {
        fire: true,
        ..Default::default()
    });

    let seconds = 2.0;
    let mut shots = 0;
    let mut last = sim.state().player.fire_cooldown;
    for _ in 0..(seconds / DT) as usize {
        sim.frame(DT);
        let cooldown = sim.state().player.fire_cooldown;
        if cooldown > last {
            shots += 1;
        }
        last = cooldown;
    }

    let interval = sim.tuning().weapons.get(WeaponKind::Blaster).fire_interval;
    assert!(shots >= 2);
    assert!(shots as f32 <= seconds / interval + 1.0, "{shots} shots");
}

#[test]
fn test_wounded_opponent_flees() {
    let (mut sim, _port, _) = new_sim(13);
    quiet_arena(&mut sim);
    sim.state_mut().player.pos = Vec2::new(250.0, 800.0);
    add_opponent(&mut sim, Vec2::new(250.0, 1050.0));
    sim.state_mut().opponents[0].health = 10.0;

    sim.frame(DT);

    let opponent = &sim.state().opponents[0];
    let brain = opponent.brain().expect("opponent has a brain");
    assert_eq!(brain.mode, AiMode::Flee);
    let target = brain.steer_target.expect("fleeing toward a point");
    assert!(target.y > opponent.pos.y, "steers away from the player");
}

#[test]
fn test_cleared_wave_starts_next_with_heal() {
    let (mut sim, _port, _) = new_sim(14);
    {
        let state = sim.state_mut();
        state.opponents.clear();
        state.world.projectiles.clear();
        state.player.health = 50.0;
    }

    let mut started = None;
    for _ in 0..400 {
        let outcome = sim.frame(DT);
        if outcome.wave_started.is_some() {
            started = outcome.wave_started;
            break;
        }
    }

    assert_eq!(started, Some(2));
    let snap = sim.snapshot();
    assert_eq!(snap.wave, 2);
    assert_eq!(snap.health, 80.0);
    assert_eq!(snap.opponents_remaining, 1);
}

#[test]
fn test_pad_reactivates_after_cooldown() {
    let (mut sim, _port, _) = new_sim(15);
    quiet_arena(&mut sim);
    let pad_pos = sim.state().world.pads[2].pos;
    sim.state_mut().player.pos = pad_pos;

    sim.frame(0.05);
    assert!(!sim.state().world.pads[2].active);
    assert_ne!(sim.state().player.weapon, WeaponKind::DEFAULT);

    sim.state_mut().player.pos = Vec2::new(250.0, 700.0);
    for _ in 0..190 {
        sim.frame(0.05);
    }
    assert!(!sim.state().world.pads[2].active);

    for _ in 0..20 {
        sim.frame(0.05);
    }
    assert!(sim.state().world.pads[2].active);
}

#[test]
fn test_game_over_reported_exactly_once() {
    let (mut sim, _port, calls) = new_sim(16);
    sim.state_mut().player.health = 0.0;

    let first = sim.frame(DT);
    assert!(first.player_eliminated);
    for _ in 0..30 {
        assert!(!sim.frame(DT).player_eliminated);
    }
    assert_eq!(calls.get(), 1);
    assert!(sim.snapshot().game_over);
}

#[test]
fn test_stopped_simulation_stays_silent() {
    let (mut sim, port, calls) = new_sim(17);
    sim.stop();
    sim.state_mut().player.health = 0.0;
    let clock = sim.state().clock;

    for _ in 0..10 {
        sim.frame(DT);
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(sim.state().clock, clock);

    sim.start(port);
    sim.frame(DT);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_snapshot_serializes_to_json() {
    let (mut sim, port, _) = new_sim(18);
    port.set(InputState {
        forward: true,
        ..Default::default()
    });
    for _ in 0..30 {
        sim.frame(DT);
    }
    let json = serde_json::to_value(sim.snapshot()).expect("snapshot serializes");
    assert_eq!(json["wave"], 1);
    assert!(json["health"].as_f64().is_some_and(|h| h >= 0.0));
}
