//! Game balance configuration
//!
//! Every tuning constant the simulation reads lives here. Persisted
//! separately from session history in LocalStorage so balance can be tweaked
//! without a rebuild.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::question::{Difficulty, FactorRanges};

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
        }
    }
}

/// Points awarded per hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub correct_hit: i32,
    /// Usually negative
    pub wrong_hit: i32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            correct_hit: CORRECT_HIT_POINTS,
            wrong_hit: WRONG_HIT_POINTS,
        }
    }
}

/// Card geometry, spawn timing and trajectories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub width: f32,
    pub height: f32,
    pub spawn_interval_ms: f64,
    pub max_on_screen: usize,
    pub wrong_answers_count: usize,
    /// Probability (0-1) that a spawn tick shows the correct answer
    pub correct_chance: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub lateral_jitter: f32,
    pub spawn_margin: f32,
    pub despawn_margin: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            max_on_screen: MAX_CARDS_ON_SCREEN,
            wrong_answers_count: WRONG_ANSWERS_COUNT,
            correct_chance: CORRECT_CARD_CHANCE,
            min_speed: CARD_MIN_SPEED,
            max_speed: CARD_MAX_SPEED,
            lateral_jitter: CARD_LATERAL_JITTER,
            spawn_margin: SPAWN_MARGIN,
            despawn_margin: DESPAWN_MARGIN,
        }
    }
}

/// Speed multiplier curve: linear in level up to `cap_level`, then flat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedScale {
    pub min_multiplier: f32,
    pub increment: f32,
    pub cap_level: u32,
    pub max_multiplier: f32,
}

impl Default for SpeedScale {
    fn default() -> Self {
        Self {
            min_multiplier: SPEED_MIN_MULTIPLIER,
            increment: SPEED_INCREMENT,
            cap_level: SPEED_CAP_LEVEL,
            max_multiplier: SPEED_MAX_MULTIPLIER,
        }
    }
}

/// Level curve, table rotation and session length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub points_per_level: u32,
    /// Table for level N is `table_order[N - 1]`
    pub table_order: Vec<u32>,
    /// Rotated through once `table_order` is exhausted
    pub hard_tables: Vec<u32>,
    pub speed: SpeedScale,
    pub session_duration_ms: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            points_per_level: POINTS_PER_LEVEL,
            table_order: TABLE_ORDER.to_vec(),
            hard_tables: HARD_TABLES.to_vec(),
            speed: SpeedScale::default(),
            session_duration_ms: SESSION_DURATION_MS,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    /// Factor range used when no table is pinned
    pub difficulty: Difficulty,
    pub factor_ranges: FactorRanges,
    pub score: ScoreConfig,
    pub cards: CardConfig,
    pub progression: ProgressionConfig,
    /// Pause before cards resume after a level-up
    pub level_up_delay_ms: f64,
    /// Optional per-question countdown; `None` lets a question run until answered
    pub question_duration_ms: Option<f64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            difficulty: Difficulty::Medium,
            factor_ranges: FactorRanges::default(),
            score: ScoreConfig::default(),
            cards: CardConfig::default(),
            progression: ProgressionConfig::default(),
            level_up_delay_ms: LEVEL_UP_DELAY_MS,
            question_duration_ms: None,
        }
    }
}

impl GameConfig {
    /// Parse from JSON; missing sections take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Config with a different playfield size (canvas resize)
    pub fn with_world(mut self, width: f32, height: f32) -> Self {
        self.world = WorldConfig { width, height };
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "multiplication_shooter_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded game config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored game config: {}", e),
                }
            }
        }

        log::info!("Using default game config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Game config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
