//! Game state and core simulation types
//!
//! Everything a run owns lives here. The store is split into the vehicles and a
//! [`World`] (arena, projectiles, particles, rng) so systems can borrow one
//! vehicle mutably while writing effects into the world.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::Particle;
use super::geometry::{self, Obstacle};
use crate::arena::ArenaConfig;
use crate::consts::*;
use crate::heading;
use crate::tuning::{CarClass, CarStats, Tuning, WeaponKind, WeaponStats};

/// Lobbed projectiles above this height fly over vehicles
pub const LOBBED_HIT_CEILING: f32 = 10.0;

/// Display name of the player's vehicle
pub const PLAYER_NAME: &str = "YOU";

/// Stable handle for vehicles and projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Rounds left in the equipped weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ammo {
    #[default]
    Unlimited,
    Rounds(u32),
}

impl Ammo {
    pub fn from_capacity(capacity: Option<u32>) -> Self {
        capacity.map_or(Ammo::Unlimited, Ammo::Rounds)
    }

    pub fn is_empty(self) -> bool {
        self == Ammo::Rounds(0)
    }

    /// Use one round (no-op when unlimited or already empty)
    pub fn consume(&mut self) {
        if let Ammo::Rounds(n) = self {
            *n = n.saturating_sub(1);
        }
    }

    pub fn remaining(self) -> Option<u32> {
        match self {
            Ammo::Unlimited => None,
            Ammo::Rounds(n) => Some(n),
        }
    }
}

/// Opponent behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiMode {
    #[default]
    Wander,
    SeekItem,
    Attack,
    Flee,
}

/// Per-opponent decision memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiBrain {
    pub mode: AiMode,
    /// Point the opponent is currently steering toward
    pub steer_target: Option<Vec2>,
    pub wander_target: Vec2,
    /// Seconds until a new wander point is picked
    pub wander_timer: f32,
}

/// Who drives a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pilot {
    Player,
    Ai(AiBrain),
}

/// A player or opponent car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: EntityId,
    pub name: String,
    pub class: CarClass,
    pub pos: Vec2,
    /// Per-tick units, see [`MOTION_SCALE`]
    pub vel: Vec2,
    /// Facing (radians); weapons always fire along it
    pub rotation: f32,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub weapon: WeaponKind,
    pub ammo: Ammo,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    pub drifting: bool,
    pub drift_charge: f32,
    pub boost_time: f32,
    pub invulnerable: f32,
    pub alive: bool,
    /// Marked for removal at the end of the tick
    pub removed: bool,
    /// Thrust requested by the AI this tick
    pub thrust: f32,
    /// Homing lock (player) or attack target (opponents)
    pub lock: Option<EntityId>,
    pub pilot: Pilot,
}

impl Vehicle {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        class: CarClass,
        stats: &CarStats,
        pos: Vec2,
        rotation: f32,
        pilot: Pilot,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            pos,
            vel: Vec2::ZERO,
            rotation,
            radius: stats.radius,
            health: stats.max_health,
            max_health: stats.max_health,
            weapon: WeaponKind::DEFAULT,
            ammo: Ammo::Unlimited,
            fire_cooldown: 0.0,
            drifting: false,
            drift_charge: 0.0,
            boost_time: 0.0,
            invulnerable: 0.0,
            alive: true,
            removed: false,
            thrust: 0.0,
            lock: None,
            pilot,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self.pilot, Pilot::Player)
    }

    /// Alive and not marked for removal
    #[inline]
    pub fn is_active(&self) -> bool {
        self.alive && !self.removed
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        heading(self.rotation)
    }

    pub fn brain(&self) -> Option<&AiBrain> {
        match &self.pilot {
            Pilot::Ai(brain) => Some(brain),
            Pilot::Player => None,
        }
    }

    pub fn brain_mut(&mut self) -> Option<&mut AiBrain> {
        match &mut self.pilot {
            Pilot::Ai(brain) => Some(brain),
            Pilot::Player => None,
        }
    }

    /// Swap in a weapon with its full ammo load
    pub fn equip(&mut self, kind: WeaponKind, stats: &WeaponStats) {
        self.weapon = kind;
        self.ammo = Ammo::from_capacity(stats.ammo);
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

/// A shot, shell, mine or bomb in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub kind: WeaponKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub owner: Option<EntityId>,
    pub time_left: f32,
    pub lifetime: f32,
    pub homing_target: Option<EntityId>,
    /// Arc height for lobbed shots (`None` = ground level)
    pub height: Option<f32>,
    pub explosion_radius: Option<f32>,
    /// Cosmetic, 0xRRGGBB
    pub color: u32,
    pub removed: bool,
}

impl Projectile {
    /// Lobbed and still high enough to pass over vehicles
    pub fn is_airborne(&self) -> bool {
        self.height.is_some_and(|h| h > LOBBED_HIT_CEILING)
    }

    pub fn is_lobbed(&self) -> bool {
        self.height.is_some()
    }
}

/// Weapon pickup spot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPad {
    pub pos: Vec2,
    pub active: bool,
    /// Seconds until reactivation (only meaningful while inactive)
    pub cooldown: f32,
}

impl PickupPad {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            active: true,
            cooldown: 0.0,
        }
    }

    pub fn trigger(&mut self) {
        self.active = false;
        self.cooldown = PAD_COOLDOWN;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.active {
            self.cooldown -= dt;
            if self.cooldown <= 0.0 {
                self.cooldown = 0.0;
                self.active = true;
            }
        }
    }
}

/// Kill feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    pub killer: String,
    pub victim: String,
    /// Simulation clock at the time of the kill
    pub time: f32,
}

/// Follow camera used for "is it on screen" feedback
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Camera {
    pub focus: Vec2,
    /// Current shake offset (presentation only)
    pub shake: Vec2,
}

impl Camera {
    pub fn is_visible(&self, p: Vec2) -> bool {
        let d = (p - self.focus).abs();
        d.x < VIEW_HALF_WIDTH && d.y < VIEW_HALF_HEIGHT
    }
}

/// Arena contents other than vehicles
#[derive(Debug, Clone)]
pub struct World {
    pub bounds: Vec2,
    pub obstacles: Vec<Obstacle>,
    pub pads: Vec<PickupPad>,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Impact/shake accumulator in [0, 1]
    pub trauma: f32,
    pub camera: Camera,
    pub rng: Pcg32,
    next_id: u32,
}

impl World {
    pub fn new(arena: &ArenaConfig, seed: u64) -> Self {
        Self {
            bounds: arena.bounds(),
            obstacles: arena.obstacles.clone(),
            pads: arena.pads.iter().copied().map(PickupPad::new).collect(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            trauma: 0.0,
            camera: Camera::default(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).min(1.0);
    }

    /// Circle would poke out of the arena or into an obstacle
    pub fn blocked(&self, p: Vec2, radius: f32) -> bool {
        geometry::blocked(p, radius, self.bounds, &self.obstacles)
    }

    /// Closest unblocked point to `target`, scanning outward in rings
    pub fn nearest_open_point(&self, target: Vec2, radius: f32) -> Option<Vec2> {
        const STEP: f32 = 20.0;
        if !self.blocked(target, radius) {
            return Some(target);
        }
        let max_ring = (self.bounds.max_element() / STEP).ceil() as u32;
        for ring in 1..=max_ring {
            let r = ring as f32 * STEP;
            let samples = (ring * 8).max(8);
            let found = (0..samples)
                .map(|i| target + heading(i as f32 / samples as f32 * std::f32::consts::TAU) * r)
                .filter(|p| !self.blocked(*p, radius))
                .min_by(|a, b| a.distance_squared(target).total_cmp(&b.distance_squared(target)));
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub player: Vehicle,
    /// Opponents in spawn order
    pub opponents: Vec<Vehicle>,
    pub world: World,
    /// Current wave (1-based, 0 before the first wave starts)
    pub wave: u32,
    /// Countdown to the next wave once the current one is cleared
    pub transition: Option<f32>,
    pub score: u64,
    pub kill_feed: Vec<KillEvent>,
    /// Seconds of simulated time
    pub clock: f32,
    pub game_over: bool,
}

impl GameState {
    /// Fresh run: empty arena with the player parked near the centre
    pub fn new(arena: &ArenaConfig, class: CarClass, tuning: &Tuning, seed: u64) -> Self {
        let mut world = World::new(arena, seed);
        let stats = tuning.cars.get(class);

        let start = world
            .nearest_open_point(arena.center(), stats.radius)
            .unwrap_or(arena.center());
        let id = world.next_entity_id();
        let player = Vehicle::new(
            id,
            PLAYER_NAME,
            class,
            stats,
            start,
            -std::f32::consts::FRAC_PI_2,
            Pilot::Player,
        );
        world.camera.focus = player.pos;

        Self {
            seed,
            player,
            opponents: Vec::new(),
            world,
            wave: 0,
            transition: None,
            score: 0,
            kill_feed: Vec::new(),
            clock: 0.0,
            game_over: false,
        }
    }

    pub fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        if self.player.id == id {
            return Some(&self.player);
        }
        self.opponents.iter().find(|v| v.id == id)
    }

    pub fn vehicle_mut(&mut self, id: EntityId) -> Option<&mut Vehicle> {
        if self.player.id == id {
            return Some(&mut self.player);
        }
        self.opponents.iter_mut().find(|v| v.id == id)
    }

    /// Player followed by opponents
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        std::iter::once(&self.player).chain(self.opponents.iter())
    }

    pub fn vehicles_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        std::iter::once(&mut self.player).chain(self.opponents.iter_mut())
    }

    /// Opponents not yet marked for removal
    pub fn opponents_remaining(&self) -> usize {
        self.opponents.iter().filter(|v| !v.removed).count()
    }
}
