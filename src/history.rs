//! Local session history
//!
//! Persisted to LocalStorage, keeps the 10 best finished sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sim::SessionSummary;

/// Maximum number of sessions to keep
pub const MAX_HISTORY_ENTRIES: usize = 10;

/// One finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub score: u32,
    pub max_level: u32,
    /// Percent, 0-100
    pub accuracy: f32,
    pub total_shots: u32,
    pub finished_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_summary(summary: &SessionSummary, finished_at: DateTime<Utc>) -> Self {
        Self {
            score: summary.final_score,
            max_level: summary.max_level_reached,
            accuracy: summary.accuracy,
            total_shots: summary.total_shots,
            finished_at,
        }
    }
}

/// Best sessions, sorted by score descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionHistory {
    pub entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "multiplication_shooter_history";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A session that scored nothing is never kept
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HISTORY_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a finished session. Returns the rank achieved (1-indexed)
    /// or None if it didn't qualify.
    pub fn add(&mut self, entry: HistoryEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Ties keep the older entry first
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HISTORY_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Highest level ever reached across kept sessions
    pub fn best_level(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.max_level).max()
    }

    /// Load history from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<SessionHistory>(&json) {
                    Ok(history) => {
                        log::info!("Loaded {} past sessions", history.entries.len());
                        return history;
                    }
                    Err(e) => log::warn!("Discarding unreadable session history: {}", e),
                }
            }
        }

        log::info!("No session history found, starting fresh");
        Self::new()
    }

    /// Save history to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Session history saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Relative date for the history list ("3 days ago")
pub fn format_date(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(at);
    let days = diff.num_days();
    let hours = diff.num_hours();
    let mins = diff.num_minutes();

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            at.format("%-m/%-d/%y").to_string()
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
