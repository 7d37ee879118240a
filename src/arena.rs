//! Arena layouts
//!
//! An arena is a bounded rectangle with static obstacles and pickup pad
//! positions. Three layouts ship built in; custom ones can be loaded from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::geometry::Obstacle;

/// Id of the arena used when a requested one doesn't exist
pub const DEFAULT_ARENA_ID: &str = "GRID";

/// Static description of an arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub id: String,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<Obstacle>,
    /// Pickup pad centres
    pub pads: Vec<Vec2>,
    /// Presentation only, ignored by the simulation
    #[serde(default)]
    pub grid_color: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
}

impl ArenaConfig {
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds() * 0.5
    }

    /// Ids of the built-in arenas
    pub const BUILT_IN: [&'static str; 3] = ["GRID", "MAZE", "ARENA"];

    /// Built-in arena by id (case-insensitive)
    pub fn built_in(id: &str) -> Option<Self> {
        match id.to_uppercase().as_str() {
            "GRID" => Some(Self::grid()),
            "MAZE" => Some(Self::maze()),
            "ARENA" => Some(Self::foundry()),
            _ => None,
        }
    }

    /// Built-in arena by id, falling back to the default arena for unknown ids
    pub fn by_id(id: &str) -> Self {
        Self::built_in(id).unwrap_or_else(|| {
            log::warn!("Unknown arena '{}', falling back to {}", id, DEFAULT_ARENA_ID);
            Self::grid()
        })
    }

    /// Parse a custom arena and validate its geometry
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let arena: ArenaConfig = serde_json::from_str(json)?;
        arena.validate()?;
        Ok(arena)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ConfigError::invalid("arena size", "width and height must be positive"));
        }
        for (i, o) in self.obstacles.iter().enumerate() {
            if !(o.width >= 0.0 && o.height >= 0.0) {
                return Err(ConfigError::invalid(
                    format!("obstacles[{i}]"),
                    "width and height must be non-negative",
                ));
            }
        }
        for (i, p) in self.pads.iter().enumerate() {
            if p.x < 0.0 || p.y < 0.0 || p.x > self.width || p.y > self.height {
                return Err(ConfigError::invalid(format!("pads[{i}]"), "outside the arena"));
            }
        }
        Ok(())
    }

    /// Sector 1: open grid with four pillars and a central block
    pub fn grid() -> Self {
        Self {
            id: "GRID".to_string(),
            name: "Sector 1: Neon Grid".to_string(),
            width: 2000.0,
            height: 2000.0,
            obstacles: vec![
                Obstacle::new(500.0, 500.0, 200.0, 200.0),
                Obstacle::new(1300.0, 500.0, 200.0, 200.0),
                Obstacle::new(500.0, 1300.0, 200.0, 200.0),
                Obstacle::new(1300.0, 1300.0, 200.0, 200.0),
                Obstacle::new(850.0, 850.0, 300.0, 300.0),
            ],
            pads: vec![
                Vec2::new(1000.0, 400.0),
                Vec2::new(1000.0, 1600.0),
                Vec2::new(400.0, 1000.0),
                Vec2::new(1600.0, 1000.0),
                Vec2::new(1000.0, 1000.0),
                Vec2::new(200.0, 200.0),
                Vec2::new(1800.0, 1800.0),
            ],
            grid_color: Some("#e2e8f0".to_string()),
            bg_color: Some("#f8fafc".to_string()),
        }
    }

    /// Sector 2: walled corridors
    pub fn maze() -> Self {
        Self {
            id: "MAZE".to_string(),
            name: "Sector 2: Cyber Maze".to_string(),
            width: 2500.0,
            height: 2500.0,
            obstacles: vec![
                Obstacle::new(200.0, 200.0, 600.0, 100.0),
                Obstacle::new(200.0, 200.0, 100.0, 600.0),
                Obstacle::new(1700.0, 1700.0, 600.0, 100.0),
                Obstacle::new(2200.0, 1700.0, 100.0, 600.0),
                Obstacle::new(1100.0, 0.0, 100.0, 800.0),
                Obstacle::new(1100.0, 1700.0, 100.0, 800.0),
                Obstacle::new(0.0, 1200.0, 800.0, 100.0),
                Obstacle::new(1700.0, 1200.0, 800.0, 100.0),
                Obstacle::new(1100.0, 1100.0, 300.0, 300.0),
            ],
            pads: vec![
                Vec2::new(500.0, 500.0),
                Vec2::new(2000.0, 2000.0),
                Vec2::new(500.0, 2000.0),
                Vec2::new(2000.0, 500.0),
                Vec2::new(1250.0, 1250.0),
                Vec2::new(1250.0, 900.0),
                Vec2::new(1250.0, 1600.0),
            ],
            grid_color: Some("#312e81".to_string()),
            bg_color: Some("#1e1b4b".to_string()),
        }
    }

    /// Sector 3: two long walls with a bridge in between
    pub fn foundry() -> Self {
        Self {
            id: "ARENA".to_string(),
            name: "Sector 3: The Foundry".to_string(),
            width: 1800.0,
            height: 1800.0,
            obstacles: vec![
                Obstacle::new(300.0, 300.0, 150.0, 1200.0),
                Obstacle::new(1350.0, 300.0, 150.0, 1200.0),
                Obstacle::new(600.0, 800.0, 600.0, 200.0),
            ],
            pads: vec![
                Vec2::new(900.0, 400.0),
                Vec2::new(900.0, 1400.0),
                Vec2::new(100.0, 900.0),
                Vec2::new(1700.0, 900.0),
                Vec2::new(900.0, 900.0),
            ],
            grid_color: Some("#94a3b8".to_string()),
            bg_color: Some("#cbd5e1".to_string()),
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::grid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_arena_falls_back() {
        let arena = ArenaConfig::by_id("VOLCANO");
        assert_eq!(arena.id, DEFAULT_ARENA_ID);
        assert_eq!(ArenaConfig::by_id("maze").id, "MAZE");
    }

    #[test]
    fn test_built_ins_are_valid() {
        for id in ArenaConfig::BUILT_IN {
            let arena = ArenaConfig::built_in(id).unwrap();
            assert!(arena.validate().is_ok(), "{id} failed validation");
            assert!(!arena.pads.is_empty());
        }
    }

    #[test]
    fn test_arena_json_round_trip_ignores_colors() {
        let json = r#"{
            "id": "TINY", "name": "Tiny", "width": 600, "height": 400,
            "obstacles": [ { "x": 250, "y": 150, "width": 100, "height": 100 } ],
            "pads": [ [100, 100] ]
        }"#;
        let arena = ArenaConfig::from_json(json).unwrap();
        assert_eq!(arena.obstacles.len(), 1);
        assert_eq!(arena.pads[0], Vec2::new(100.0, 100.0));
        assert!(arena.bg_color.is_none());
    }

    #[test]
    fn test_arena_with_pad_outside_rejected() {
        let mut arena = ArenaConfig::grid();
        arena.pads.push(Vec2::new(5000.0, 10.0));
        assert!(arena.validate().is_err());
    }
}
