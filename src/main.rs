//! Kart Brawl headless runner
//!
//! Drives a simulation with a simple autopilot and prints the final HUD
//! snapshot as JSON. Useful for balance checks and soak runs.
//!
//! Usage: `kart-brawl [ARENA] [CLASS] [SEED] [SECONDS] [TUNING.json]`

use std::cell::Cell;
use std::process::ExitCode;
use std::rc::Rc;

use kart_brawl::sim::{GameState, InputState};
use kart_brawl::{CarClass, InputPort, Simulation, Tuning, angle_delta, angle_of};

const FRAME_DT: f32 = 1.0 / 60.0;
/// Drift on for this many frames out of every `DRIFT_CYCLE`
const DRIFT_FRAMES: u64 = 60;
const DRIFT_CYCLE: u64 = 240;

struct Args {
    arena: String,
    class: CarClass,
    seed: u64,
    seconds: f32,
    tuning: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let arena = args.next().unwrap_or_else(|| "GRID".to_string());
    let class = match args.next() {
        Some(s) => CarClass::from_str(&s).ok_or_else(|| format!("unknown car class '{s}'"))?,
        None => CarClass::Speedster,
    };
    let seed = match args.next() {
        Some(s) => s.parse().map_err(|e| format!("bad seed '{s}': {e}"))?,
        None => 1,
    };
    let seconds = match args.next() {
        Some(s) => s.parse().map_err(|e| format!("bad duration '{s}': {e}"))?,
        None => 60.0,
    };
    Ok(Args {
        arena,
        class,
        seed,
        seconds,
        tuning: args.next(),
    })
}

fn load_tuning(path: Option<&str>) -> Result<Tuning, String> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("reading {path}: {e}"))?;
    Tuning::from_json(&json).map_err(|e| format!("loading {path}: {e}"))
}

/// Chase the nearest opponent and shoot when roughly lined up
fn autopilot(state: &GameState, frame: u64) -> InputState {
    let player = &state.player;
    let target = state
        .opponents
        .iter()
        .filter(|o| o.is_active())
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .total_cmp(&b.pos.distance_squared(player.pos))
        });

    let mut input = InputState {
        forward: true,
        drift: frame % DRIFT_CYCLE < DRIFT_FRAMES,
        ..Default::default()
    };
    if let Some(target) = target {
        let diff = angle_delta(player.rotation, angle_of(target.pos - player.pos));
        input.left = diff < -0.05;
        input.right = diff > 0.05;
        input.fire = diff.abs() < 0.3;
    }
    input
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            eprintln!("usage: kart-brawl [ARENA] [CLASS] [SEED] [SECONDS] [TUNING.json]");
            return ExitCode::FAILURE;
        }
    };
    let tuning = match load_tuning(args.tuning.as_deref()) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let final_score = Rc::new(Cell::new(None));
    let hook = Rc::clone(&final_score);
    let mut sim = Simulation::with_arena_id(&args.arena, args.class, tuning, args.seed, move |score| {
        hook.set(Some(score));
    });

    let port = InputPort::new();
    sim.start(port.clone());

    let frames = (args.seconds.max(0.0) / FRAME_DT) as u64;
    for frame in 0..frames {
        port.set(autopilot(sim.state(), frame));
        sim.frame(FRAME_DT);
        if final_score.get().is_some() {
            break;
        }
    }
    sim.stop();

    match final_score.get() {
        Some(score) => log::info!("Game over, final score {score}"),
        None => log::info!("Time up after {:.1}s", sim.state().clock),
    }

    match serde_json::to_string_pretty(&sim.snapshot()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("serializing snapshot: {e}");
            ExitCode::FAILURE
        }
    }
}
