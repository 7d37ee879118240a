//! Game balance tables
//!
//! Car classes, weapon stats and the wave difficulty curve. The simulation only
//! consumes these; defaults reproduce the shipped balance and any subset can be
//! overridden from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Vehicle class (fixed radius/speed/turn/friction/health profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarClass {
    #[default]
    Speedster,
    Enforcer,
    Drifter,
}

impl CarClass {
    pub const ALL: [CarClass; 3] = [CarClass::Speedster, CarClass::Enforcer, CarClass::Drifter];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speedster" => Some(CarClass::Speedster),
            "enforcer" => Some(CarClass::Enforcer),
            "drifter" => Some(CarClass::Drifter),
            _ => None,
        }
    }
}

/// How a weapon's projectiles travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Straight-line shot(s)
    Direct,
    /// Steers toward the firer's locked target
    Homing,
    /// Parabolic arc, immune to hits while airborne, explodes on landing
    Lobbed,
    /// Dropped behind the firer and left in place
    Stationary,
}

/// Weapon types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponKind {
    #[default]
    Blaster,
    MachineGun,
    Shotgun,
    Cannon,
    Missile,
    Mine,
    Bomb,
    Spikes,
}

impl WeaponKind {
    /// The unlimited weapon every vehicle falls back to
    pub const DEFAULT: WeaponKind = WeaponKind::Blaster;

    /// Everything a pickup pad can hand out
    pub const PICKUPS: [WeaponKind; 7] = [
        WeaponKind::MachineGun,
        WeaponKind::Shotgun,
        WeaponKind::Cannon,
        WeaponKind::Missile,
        WeaponKind::Mine,
        WeaponKind::Bomb,
        WeaponKind::Spikes,
    ];

    pub const fn delivery(self) -> Delivery {
        match self {
            WeaponKind::Missile => Delivery::Homing,
            WeaponKind::Bomb => Delivery::Lobbed,
            WeaponKind::Mine | WeaponKind::Spikes => Delivery::Stationary,
            _ => Delivery::Direct,
        }
    }

    /// Long-range kinds that AI drivers fire while keeping their distance
    pub const fn is_ranged(self) -> bool {
        matches!(self, WeaponKind::Missile | WeaponKind::Cannon)
    }

    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Blaster => "BLASTER",
            WeaponKind::MachineGun => "MACHINE_GUN",
            WeaponKind::Shotgun => "SHOTGUN",
            WeaponKind::Cannon => "CANNON",
            WeaponKind::Missile => "MISSILE",
            WeaponKind::Mine => "MINE",
            WeaponKind::Bomb => "BOMB",
            WeaponKind::Spikes => "SPIKES",
        }
    }
}

/// Physics profile of a car class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarStats {
    pub name: String,
    pub radius: f32,
    /// Base thrust
    pub speed: f32,
    /// Per-tick velocity retention (0-1]
    pub friction: f32,
    /// Radians per tick
    pub turn_speed: f32,
    pub max_health: f32,
    /// Cosmetic, 0xRRGGBB
    pub color: u32,
}

/// Per-class stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarTable {
    pub speedster: CarStats,
    pub enforcer: CarStats,
    pub drifter: CarStats,
}

impl Default for CarTable {
    fn default() -> Self {
        Self {
            speedster: CarStats {
                name: "Viper X-1".to_string(),
                radius: 20.0,
                speed: 16.0,
                friction: 0.95,
                turn_speed: 0.09,
                max_health: 100.0,
                color: 0x38bdf8,
            },
            enforcer: CarStats {
                name: "Goliath Tank".to_string(),
                radius: 28.0,
                speed: 11.0,
                friction: 0.92,
                turn_speed: 0.06,
                max_health: 220.0,
                color: 0xf87171,
            },
            drifter: CarStats {
                name: "Phantom Z".to_string(),
                radius: 22.0,
                speed: 14.0,
                friction: 0.97,
                turn_speed: 0.11,
                max_health: 140.0,
                color: 0xc084fc,
            },
        }
    }
}

impl CarTable {
    pub fn get(&self, class: CarClass) -> &CarStats {
        match class {
            CarClass::Speedster => &self.speedster,
            CarClass::Enforcer => &self.enforcer,
            CarClass::Drifter => &self.drifter,
        }
    }
}

/// Combat stats of one weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: f32,
    /// Seconds between shots
    pub fire_interval: f32,
    /// Projectile speed in per-tick units (0 = stationary)
    pub speed: f32,
    /// Projectiles per shot
    pub count: u32,
    /// Total angular spread (radians)
    pub spread: f32,
    /// Rounds granted on pickup (`None` = unlimited)
    pub ammo: Option<u32>,
    /// Splash radius (`None` = direct damage only)
    #[serde(default)]
    pub explosion_radius: Option<f32>,
    /// Cosmetic, 0xRRGGBB
    pub color: u32,
}

/// Cooldown numerator: a weapon rated `r` waits `FIRE_RATE_BASE / r` seconds
pub const FIRE_RATE_BASE: f32 = 60.0;

impl WeaponStats {
    /// Stats from a shipped fire rating (see [`FIRE_RATE_BASE`])
    #[allow(clippy::too_many_arguments)]
    const fn rated(
        damage: f32,
        fire_rate: f32,
        speed: f32,
        count: u32,
        spread: f32,
        ammo: Option<u32>,
        explosion_radius: Option<f32>,
        color: u32,
    ) -> Self {
        Self {
            damage,
            fire_interval: FIRE_RATE_BASE / fire_rate,
            speed,
            count,
            spread,
            ammo,
            explosion_radius,
            color,
        }
    }
}

/// Per-weapon stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub blaster: WeaponStats,
    pub machine_gun: WeaponStats,
    pub shotgun: WeaponStats,
    pub cannon: WeaponStats,
    pub missile: WeaponStats,
    pub mine: WeaponStats,
    pub bomb: WeaponStats,
    pub spikes: WeaponStats,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            blaster: WeaponStats::rated(15.0, 200.0, 25.0, 1, 0.02, None, None, 0xfbbf24),
            machine_gun: WeaponStats::rated(8.0, 70.0, 28.0, 1, 0.08, Some(100), None, 0x60a5fa),
            shotgun: WeaponStats::rated(8.0, 900.0, 20.0, 8, 0.4, Some(20), None, 0xf97316),
            cannon: WeaponStats::rated(60.0, 1500.0, 32.0, 1, 0.0, Some(12), Some(90.0), 0xef4444),
            missile: WeaponStats::rated(45.0, 1200.0, 18.0, 1, 0.0, Some(6), Some(60.0), 0x10b981),
            mine: WeaponStats::rated(90.0, 1000.0, 0.0, 1, 0.0, Some(5), Some(90.0), 0xec4899),
            bomb: WeaponStats::rated(80.0, 1100.0, 16.0, 1, 0.0, Some(8), Some(110.0), 0xeab308),
            spikes: WeaponStats::rated(30.0, 200.0, 0.0, 1, 0.0, Some(10), None, 0x94a3b8),
        }
    }
}

impl WeaponTable {
    pub fn get(&self, kind: WeaponKind) -> &WeaponStats {
        match kind {
            WeaponKind::Blaster => &self.blaster,
            WeaponKind::MachineGun => &self.machine_gun,
            WeaponKind::Shotgun => &self.shotgun,
            WeaponKind::Cannon => &self.cannon,
            WeaponKind::Missile => &self.missile,
            WeaponKind::Mine => &self.mine,
            WeaponKind::Bomb => &self.bomb,
            WeaponKind::Spikes => &self.spikes,
        }
    }

    fn entries(&self) -> [(WeaponKind, &WeaponStats); 8] {
        [
            (WeaponKind::Blaster, &self.blaster),
            (WeaponKind::MachineGun, &self.machine_gun),
            (WeaponKind::Shotgun, &self.shotgun),
            (WeaponKind::Cannon, &self.cannon),
            (WeaponKind::Missile, &self.missile),
            (WeaponKind::Mine, &self.mine),
            (WeaponKind::Bomb, &self.bomb),
            (WeaponKind::Spikes, &self.spikes),
        ]
    }
}

/// Difficulty curve parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveCurve {
    /// Wave at which every parameter stops growing
    pub saturation_wave: u32,
    pub base_opponents: f32,
    pub opponents_per_wave: f32,
    pub max_opponents: u32,
    pub detection_range: (f32, f32),
    pub accuracy: (f32, f32),
    pub turn_skill: (f32, f32),
    /// Player speed bonus per wave (multiplicative, 0.02 = +2%)
    pub player_speed_per_wave: f32,
}

impl Default for WaveCurve {
    fn default() -> Self {
        Self {
            saturation_wave: 20,
            base_opponents: 1.0,
            opponents_per_wave: 0.4,
            max_opponents: 8,
            detection_range: (400.0, 1400.0),
            accuracy: (0.2, 0.8),
            turn_skill: (0.5, 1.3),
            player_speed_per_wave: 0.02,
        }
    }
}

/// Resolved difficulty for a single wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub opponent_count: u32,
    pub detection_range: f32,
    /// 0-1, higher aims tighter
    pub accuracy: f32,
    /// Multiplier on class turn speed for AI drivers
    pub turn_skill: f32,
    pub player_speed_mult: f32,
}

impl WaveCurve {
    /// Difficulty parameters for wave `wave` (1-based; 0 is treated as 1)
    pub fn for_wave(&self, wave: u32) -> WaveParams {
        let saturation = self.saturation_wave.max(1);
        let n = wave.clamp(1, saturation);
        let t = if saturation > 1 {
            (n - 1) as f32 / (saturation - 1) as f32
        } else {
            1.0
        };
        let lerp = |(lo, hi): (f32, f32)| lo + (hi - lo) * t;

        let count = (self.base_opponents + self.opponents_per_wave * n as f32).floor();
        WaveParams {
            opponent_count: (count.max(0.0) as u32).min(self.max_opponents),
            detection_range: lerp(self.detection_range),
            accuracy: lerp(self.accuracy).clamp(0.0, 1.0),
            turn_skill: lerp(self.turn_skill),
            player_speed_mult: 1.0 + self.player_speed_per_wave * n as f32,
        }
    }
}

/// All balance tables consumed by the simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub cars: CarTable,
    pub weapons: WeaponTable,
    pub waves: WaveCurve,
}

impl Tuning {
    /// Parse a (possibly partial) tuning table and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Reject tables that would make the simulation degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        for class in CarClass::ALL {
            let car = self.cars.get(class);
            let field = |f: &str| format!("cars.{:?}.{}", class, f);
            if !(car.radius > 0.0) {
                return Err(ConfigError::invalid(field("radius"), "must be positive"));
            }
            if !(car.speed > 0.0) {
                return Err(ConfigError::invalid(field("speed"), "must be positive"));
            }
            if !(car.friction > 0.0 && car.friction <= 1.0) {
                return Err(ConfigError::invalid(field("friction"), "must be in (0, 1]"));
            }
            if !(car.turn_speed > 0.0) {
                return Err(ConfigError::invalid(field("turn_speed"), "must be positive"));
            }
            if !(car.max_health > 0.0) {
                return Err(ConfigError::invalid(field("max_health"), "must be positive"));
            }
        }

        for (kind, w) in self.weapons.entries() {
            let field = |f: &str| format!("weapons.{}.{}", kind.label(), f);
            if !(w.fire_interval > 0.0) {
                return Err(ConfigError::invalid(field("fire_interval"), "must be positive"));
            }
            if w.count == 0 {
                return Err(ConfigError::invalid(field("count"), "must be at least 1"));
            }
            if !(w.damage >= 0.0) || !(w.speed >= 0.0) || !(w.spread >= 0.0) {
                return Err(ConfigError::invalid(
                    field("damage/speed/spread"),
                    "must be non-negative",
                ));
            }
            if let Some(r) = w.explosion_radius {
                if !(r > 0.0) {
                    return Err(ConfigError::invalid(field("explosion_radius"), "must be positive"));
                }
            }
        }
        if self.weapons.get(WeaponKind::DEFAULT).ammo.is_some() {
            return Err(ConfigError::invalid(
                "weapons.BLASTER.ammo",
                "the default weapon must be unlimited",
            ));
        }

        let waves = &self.waves;
        if waves.saturation_wave == 0 {
            return Err(ConfigError::invalid("waves.saturation_wave", "must be at least 1"));
        }
        if waves.max_opponents == 0 {
            return Err(ConfigError::invalid("waves.max_opponents", "must be at least 1"));
        }
        if waves.opponents_per_wave < 0.0 || waves.player_speed_per_wave < 0.0 {
            return Err(ConfigError::invalid("waves", "per-wave growth must be non-negative"));
        }
        for (name, (lo, hi)) in [
            ("detection_range", waves.detection_range),
            ("accuracy", waves.accuracy),
            ("turn_skill", waves.turn_skill),
        ] {
            if !(hi >= lo) {
                return Err(ConfigError::invalid(
                    format!("waves.{name}"),
                    "upper bound must not be below lower bound",
                ));
            }
        }
        Ok(())
    }
}
