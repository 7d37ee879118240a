//! Owned simulation instance
//!
//! `Simulation` wraps a [`GameState`] with the run lifecycle: an input port the
//! host writes into, start/stop, clamped frame stepping, a one-shot game-over
//! callback and a HUD snapshot.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::arena::ArenaConfig;
use crate::consts::MAX_DT;
use crate::sim::{EntityId, GameState, InputState, TickOutcome, start_wave, tick};
use crate::tuning::{CarClass, Tuning, WeaponKind};

/// Shared handle to the controls of the current frame
///
/// The host keeps one clone and writes key state into it; the simulation reads
/// it once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputPort {
    state: Rc<Cell<InputState>>,
}

impl InputPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, input: InputState) {
        self.state.set(input);
    }

    /// Modify the current controls in place
    pub fn update(&self, f: impl FnOnce(&mut InputState)) {
        let mut input = self.state.get();
        f(&mut input);
        self.state.set(input);
    }

    pub fn snapshot(&self) -> InputState {
        self.state.get()
    }
}

/// One kill feed line for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillFeedLine {
    pub killer: String,
    pub victim: String,
}

/// Read-only HUD view of the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub health: f32,
    pub max_health: f32,
    /// `None` for unlimited ammo
    pub ammo: Option<u32>,
    pub weapon: WeaponKind,
    pub score: u64,
    pub locked_target: Option<EntityId>,
    pub wave: u32,
    /// Newest first
    pub kill_feed: Vec<KillFeedLine>,
    pub boost_remaining: f32,
    /// 0 right after a shot, 1 when ready to fire
    pub recharge_progress: f32,
    pub drift_charge: f32,
    pub opponents_remaining: usize,
    pub game_over: bool,
}

type GameOverHook = Box<dyn FnMut(u64)>;

/// A single run of the game with its lifecycle
pub struct Simulation {
    state: GameState,
    arena: ArenaConfig,
    tuning: Tuning,
    class: CarClass,
    seed: u64,
    input: Option<InputPort>,
    on_game_over: GameOverHook,
    reported: bool,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena.id)
            .field("class", &self.class)
            .field("seed", &self.seed)
            .field("running", &self.is_running())
            .field("wave", &self.state.wave)
            .field("game_over", &self.state.game_over)
            .finish()
    }
}

impl Simulation {
    /// Create an idle simulation; nothing moves until [`Simulation::start`]
    ///
    /// `on_game_over` receives the final score exactly once per run.
    pub fn new(
        arena: ArenaConfig,
        class: CarClass,
        tuning: Tuning,
        seed: u64,
        on_game_over: impl FnMut(u64) + 'static,
    ) -> Self {
        let state = GameState::new(&arena, class, &tuning, seed);
        Self {
            state,
            arena,
            tuning,
            class,
            seed,
            input: None,
            on_game_over: Box::new(on_game_over),
            reported: false,
        }
    }

    /// Same as [`Simulation::new`] with a built-in arena looked up by id
    pub fn with_arena_id(
        id: &str,
        class: CarClass,
        tuning: Tuning,
        seed: u64,
        on_game_over: impl FnMut(u64) + 'static,
    ) -> Self {
        Self::new(ArenaConfig::by_id(id), class, tuning, seed, on_game_over)
    }

    /// Attach the input port and begin updating
    ///
    /// The first start (or a start after game over) begins wave 1 of a fresh
    /// run; restarting after `stop` resumes where the run left off.
    pub fn start(&mut self, port: InputPort) {
        if self.state.game_over {
            self.new_run();
        }
        if self.state.wave == 0 {
            start_wave(&mut self.state, 1, &self.tuning);
            log::info!(
                "Run started in {} as {} (seed {})",
                self.arena.name,
                self.tuning.cars.get(self.class).name,
                self.seed
            );
        }
        self.input = Some(port);
    }

    /// Detach input; later frames are ignored until the next start
    pub fn stop(&mut self) {
        if self.input.take().is_some() {
            log::debug!("Simulation stopped at {:.2}s", self.state.clock);
        }
    }

    pub fn is_running(&self) -> bool {
        self.input.is_some()
    }

    /// Advance one frame of `dt` seconds (clamped to `[0, MAX_DT]`)
    pub fn frame(&mut self, dt: f32) -> TickOutcome {
        let Some(port) = self.input.as_ref() else {
            return TickOutcome::default();
        };
        if self.state.game_over {
            return TickOutcome::default();
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        let input = port.snapshot();
        let outcome = tick(&mut self.state, &input, &self.tuning, dt);

        if outcome.player_eliminated && !self.reported {
            self.reported = true;
            (self.on_game_over)(self.state.score);
        }
        outcome
    }

    /// Throw away the current run and set up a fresh one with the next seed
    ///
    /// The new run waits for [`Simulation::start`] to begin wave 1. The input
    /// port stays attached if the simulation was running.
    pub fn new_run(&mut self) {
        self.seed = self.seed.wrapping_add(1);
        self.state = GameState::new(&self.arena, self.class, &self.tuning, self.seed);
        self.reported = false;
        if self.is_running() {
            start_wave(&mut self.state, 1, &self.tuning);
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts that script scenarios (editors, tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn arena(&self) -> &ArenaConfig {
        &self.arena
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// HUD view of the current run
    pub fn snapshot(&self) -> Snapshot {
        let player = &self.state.player;
        let interval = self.tuning.weapons.get(player.weapon).fire_interval;
        let recharge_progress = if interval > 0.0 {
            (1.0 - player.fire_cooldown / interval).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Snapshot {
            health: player.health.max(0.0),
            max_health: player.max_health,
            ammo: player.ammo.remaining(),
            weapon: player.weapon,
            score: self.state.score,
            locked_target: player.lock,
            wave: self.state.wave,
            kill_feed: self
                .state
                .kill_feed
                .iter()
                .rev()
                .map(|k| KillFeedLine {
                    killer: k.killer.clone(),
                    victim: k.victim.clone(),
                })
                .collect(),
            boost_remaining: player.boost_time,
            recharge_progress,
            drift_charge: player.drift_charge,
            opponents_remaining: self.state.opponents_remaining(),
            game_over: self.state.game_over,
        }
    }
}
