//! Multiplication Shooter - a times-table arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (questions, cards, scoring, progression)
//! - `config`: Data-driven game balance
//! - `report`: Best-effort session telemetry for the backend
//! - `stats`: Local shot accounting
//! - `history`: Local session leaderboard
//! - `hud`: Countdown formatting for the presentation layer

pub mod config;
pub mod history;
pub mod hud;
pub mod report;
pub mod sim;
pub mod stats;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::GameConfig;
pub use history::SessionHistory;
pub use sim::{GameEvent, GameSession, Question, SessionSummary};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds), so a stalled tab
    /// doesn't teleport cards across the playfield
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions
    pub const WORLD_WIDTH: f32 = 1200.0;
    pub const WORLD_HEIGHT: f32 = 800.0;

    /// Score deltas
    pub const CORRECT_HIT_POINTS: i32 = 10;
    pub const WRONG_HIT_POINTS: i32 = -5;

    /// Card geometry
    pub const CARD_WIDTH: f32 = 120.0;
    pub const CARD_HEIGHT: f32 = 80.0;
    /// Distance outside the playfield edge where cards appear
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Distance outside the playfield edge where cards are culled
    pub const DESPAWN_MARGIN: f32 = 100.0;

    /// Spawning
    pub const SPAWN_INTERVAL_MS: f64 = 1500.0;
    pub const MAX_CARDS_ON_SCREEN: usize = 6;
    pub const WRONG_ANSWERS_COUNT: usize = 5;
    /// Probability that a spawn tick produces the correct answer
    pub const CORRECT_CARD_CHANCE: f32 = 0.4;
    /// Perpendicular speed range (pixels/s, before the level multiplier)
    pub const CARD_MIN_SPEED: f32 = 80.0;
    pub const CARD_MAX_SPEED: f32 = 150.0;
    /// Lateral drift range (pixels/s, symmetric)
    pub const CARD_LATERAL_JITTER: f32 = 50.0;

    /// Progression
    pub const POINTS_PER_LEVEL: u32 = 40;
    pub const TABLE_ORDER: [u32; 10] = [1, 10, 2, 5, 3, 4, 6, 7, 8, 9];
    pub const HARD_TABLES: [u32; 4] = [6, 7, 8, 9];
    pub const SPEED_MIN_MULTIPLIER: f32 = 1.0;
    pub const SPEED_INCREMENT: f32 = 0.1;
    pub const SPEED_CAP_LEVEL: u32 = 10;
    pub const SPEED_MAX_MULTIPLIER: f32 = 2.0;

    /// Session length (5 minutes)
    pub const SESSION_DURATION_MS: f64 = 300_000.0;
    /// Pause between a level-up and the next wave of cards
    pub const LEVEL_UP_DELAY_MS: f64 = 1000.0;

    /// Second factor range when a table is pinned
    pub const PINNED_FACTOR_MIN: u32 = 1;
    pub const PINNED_FACTOR_MAX: u32 = 10;
}

/// Axis-aligned rectangle test, `center` is the rectangle's midpoint
#[inline]
pub fn rect_contains(center: Vec2, size: Vec2, point: Vec2) -> bool {
    let half = size * 0.5;
    let d = (point - center).abs();
    d.x <= half.x && d.y <= half.y
}

/// True if `pos` lies more than `margin` outside a `width` x `height` field
#[inline]
pub fn outside_field(pos: Vec2, width: f32, height: f32, margin: f32) -> bool {
    pos.x < -margin || pos.x > width + margin || pos.y < -margin || pos.y > height + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let c = Vec2::new(100.0, 100.0);
        let size = Vec2::new(120.0, 80.0);
        assert!(rect_contains(c, size, c));
        assert!(rect_contains(c, size, Vec2::new(160.0, 140.0)));
        assert!(!rect_contains(c, size, Vec2::new(160.1, 100.0)));
        assert!(!rect_contains(c, size, Vec2::new(100.0, 59.0)));
    }

    #[test]
    fn test_outside_field() {
        assert!(!outside_field(Vec2::new(-100.0, 0.0), 800.0, 600.0, 100.0));
        assert!(outside_field(Vec2::new(-100.5, 0.0), 800.0, 600.0, 100.0));
        assert!(outside_field(Vec2::new(0.0, 700.5), 800.0, 600.0, 100.0));
    }
}
