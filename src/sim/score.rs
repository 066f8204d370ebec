//! Score accumulation

use serde::{Deserialize, Serialize};

use crate::config::ScoreConfig;

/// Result of one score mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub score: u32,
    /// Configured delta (before flooring at zero); 0 for reset
    pub delta: i32,
}

type ScoreObserver = Box<dyn FnMut(ScoreChange)>;

/// Non-negative score with a single change observer
pub struct ScoreManager {
    config: ScoreConfig,
    score: u32,
    observer: Option<ScoreObserver>,
}

impl std::fmt::Debug for ScoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreManager")
            .field("config", &self.config)
            .field("score", &self.score)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ScoreManager {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            score: 0,
            observer: None,
        }
    }

    /// Replace the observer; called with every change, including resets
    pub fn set_observer(&mut self, observer: impl FnMut(ScoreChange) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn add_correct_hit(&mut self) -> ScoreChange {
        self.apply(self.config.correct_hit)
    }

    /// Applies the wrong-hit penalty, flooring the total at zero
    pub fn add_wrong_hit(&mut self) -> ScoreChange {
        self.apply(self.config.wrong_hit)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset(&mut self) -> ScoreChange {
        self.score = 0;
        self.notify(0)
    }

    fn apply(&mut self, delta: i32) -> ScoreChange {
        self.score = self.score.saturating_add_signed(delta);
        self.notify(delta)
    }

    fn notify(&mut self, delta: i32) -> ScoreChange {
        let change = ScoreChange {
            score: self.score,
            delta,
        };
        if let Some(observer) = self.observer.as_mut() {
            observer(change);
        }
        change
    }
}
