//! Level curve, table rotation and session clock
//!
//! Level is derived from score; table and speed are derived from level;
//! completion is derived from elapsed time. The manager only remembers the
//! highest level reached and when the session started.

use serde::{Deserialize, Serialize};

use crate::config::{ProgressionConfig, SpeedScale};

/// `floor(score / points_per_level) + 1`, and 1 for negative scores
pub fn level_for_score(score: i64, points_per_level: u32) -> u32 {
    if score < 0 || points_per_level == 0 {
        return 1;
    }
    let level = score / i64::from(points_per_level) + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Table practised at `level`. Walks `table_order`, then cycles `hard_tables`.
pub fn table_for_level(level: u32, table_order: &[u32], hard_tables: &[u32]) -> u32 {
    let index = level.max(1) as usize - 1;
    if let Some(&table) = table_order.get(index) {
        return table;
    }
    if hard_tables.is_empty() {
        // Misconfigured; stay on the last ordered table
        return table_order.last().copied().unwrap_or(1);
    }
    let hard_index = (index - table_order.len()) % hard_tables.len();
    hard_tables[hard_index]
}

/// Linear in level up to `cap_level`, flat after, never above `max_multiplier`
pub fn speed_multiplier_for_level(level: u32, scale: &SpeedScale) -> f32 {
    let effective = level.clamp(1, scale.cap_level.max(1));
    let linear = scale.min_multiplier + scale.increment * (effective - 1) as f32;
    linear.min(scale.max_multiplier)
}

/// Emitted when the level goes up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelUp {
    pub previous: u32,
    pub level: u32,
    pub table: u32,
    pub speed_multiplier: f32,
}

/// Snapshot for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub level: u32,
    pub table: u32,
    pub speed_multiplier: f32,
    pub elapsed_ms: f64,
    pub remaining_ms: f64,
    pub is_complete: bool,
}

/// Tracks level and session time
#[derive(Debug, Clone)]
pub struct ProgressionManager {
    config: ProgressionConfig,
    level: u32,
    session_start_ms: f64,
}

impl ProgressionManager {
    pub fn new(config: ProgressionConfig, now_ms: f64) -> Self {
        Self {
            config,
            level: 1,
            session_start_ms: now_ms,
        }
    }

    /// Back to level 1 with the session starting at `now_ms`
    pub fn reset(&mut self, now_ms: f64) {
        self.level = 1;
        self.session_start_ms = now_ms;
    }

    /// Recompute level from `score`. Level never goes down within a session.
    pub fn update_progress(&mut self, score: i64) -> Option<LevelUp> {
        let computed = level_for_score(score, self.config.points_per_level);
        if computed <= self.level {
            return None;
        }
        let previous = self.level;
        self.level = computed;
        Some(LevelUp {
            previous,
            level: computed,
            table: self.current_table(),
            speed_multiplier: self.speed_multiplier(),
        })
    }

    pub fn current_level(&self) -> u32 {
        self.level
    }

    pub fn current_table(&self) -> u32 {
        table_for_level(self.level, &self.config.table_order, &self.config.hard_tables)
    }

    pub fn speed_multiplier(&self) -> f32 {
        speed_multiplier_for_level(self.level, &self.config.speed)
    }

    pub fn session_duration_ms(&self) -> f64 {
        self.config.session_duration_ms
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.session_start_ms).max(0.0)
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.config.session_duration_ms - self.elapsed_ms(now_ms)).max(0.0)
    }

    pub fn is_session_complete(&self, now_ms: f64) -> bool {
        self.elapsed_ms(now_ms) >= self.config.session_duration_ms
    }

    pub fn progress_info(&self, now_ms: f64) -> ProgressInfo {
        ProgressInfo {
            level: self.current_level(),
            table: self.current_table(),
            speed_multiplier: self.speed_multiplier(),
            elapsed_ms: self.elapsed_ms(now_ms),
            remaining_ms: self.remaining_ms(now_ms),
            is_complete: self.is_session_complete(now_ms),
        }
    }
}
