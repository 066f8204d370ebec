//! Local shot accounting
//!
//! Mirrors what the backend computes on `finishSession` so the end-of-game
//! screen works offline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Question;

/// One shot that hit a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    /// Session time of the shot (ms)
    pub elapsed_ms: f64,
    pub pos: Vec2,
    pub question: Question,
    pub card_value: u32,
    pub is_correct: bool,
}

/// Accuracy for one multiplication table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableStat {
    pub table: u32,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    pub wrong_attempts: u32,
    /// Percent, 0-100
    pub accuracy: f32,
}

/// Percent of `correct` in `total`, 0 when there were no shots
pub fn accuracy_percent(correct: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        correct as f32 * 100.0 / total as f32
    }
}

/// All shots of a session, in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotLog {
    shots: Vec<ShotRecord>,
}

impl ShotLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, shot: ShotRecord) {
        self.shots.push(shot);
    }

    pub fn clear(&mut self) {
        self.shots.clear();
    }

    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }

    pub fn total(&self) -> u32 {
        self.shots.len() as u32
    }

    pub fn correct(&self) -> u32 {
        self.shots.iter().filter(|s| s.is_correct).count() as u32
    }

    pub fn wrong(&self) -> u32 {
        self.total() - self.correct()
    }

    pub fn accuracy(&self) -> f32 {
        accuracy_percent(self.correct(), self.total())
    }

    /// Per-table stats keyed by the question's first factor, sorted by table
    pub fn table_stats(&self) -> Vec<TableStat> {
        let mut stats: Vec<TableStat> = Vec::new();
        for shot in &self.shots {
            let table = shot.question.factor1();
            let index = match stats.iter().position(|s| s.table == table) {
                Some(i) => i,
                None => {
                    stats.push(TableStat {
                        table,
                        total_attempts: 0,
                        correct_attempts: 0,
                        wrong_attempts: 0,
                        accuracy: 0.0,
                    });
                    stats.len() - 1
                }
            };
            let stat = &mut stats[index];
            stat.total_attempts += 1;
            if shot.is_correct {
                stat.correct_attempts += 1;
            } else {
                stat.wrong_attempts += 1;
            }
        }
        for stat in &mut stats {
            stat.accuracy = accuracy_percent(stat.correct_attempts, stat.total_attempts);
        }
        stats.sort_by_key(|s| s.table);
        stats
    }
}
