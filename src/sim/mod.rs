//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through `GameSession::frame`
//! - Seeded RNG only
//! - Stable iteration order (by card ID / spawn order)
//! - No rendering, network or platform dependencies

pub mod card;
pub mod distractor;
pub mod progression;
pub mod question;
pub mod rng;
pub mod score;
pub mod session;
pub mod spawner;
pub mod timer;

pub use card::{Card, CardId, SpawnEdge};
pub use distractor::{DistractorStrategy, generate_wrong_answers};
pub use progression::{
    LevelUp, ProgressInfo, ProgressionManager, level_for_score, speed_multiplier_for_level,
    table_for_level,
};
pub use question::{Difficulty, FactorRanges, Question, QuestionGenerator};
pub use rng::RandomSource;
pub use score::{ScoreChange, ScoreManager};
pub use session::{GameEvent, GameSession, HitOutcome, SessionPhase, SessionSummary};
pub use spawner::{CardSpawner, SpawnerUpdate};
pub use timer::{Fired, TimerId, TimerKind, Timers};
