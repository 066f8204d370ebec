//! Game session orchestration
//!
//! One bounded-duration round of play. The session wires the question
//! generator, spawner, score and progression together, advances them once
//! per frame, routes shots, and queues [`GameEvent`]s for the presentation
//! layer. Phases: `Active` -> `Ended` (terminal, entered exactly once).

use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::card::{Card, CardId};
use super::progression::{LevelUp, ProgressInfo, ProgressionManager};
use super::question::{Question, QuestionGenerator};
use super::rng::RandomSource;
use super::score::{ScoreChange, ScoreManager};
use super::spawner::{CardSpawner, SpawnerUpdate};
use super::timer::{TimerId, TimerKind, Timers};
use crate::config::GameConfig;
use crate::consts::MAX_FRAME_DT;
use crate::report::{
    CreateSessionRequest, FinishSessionPayload, NullReporter, RecordShotPayload, ReportError,
    SessionReporter,
};
use crate::stats::{ShotLog, ShotRecord, TableStat};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    Ended,
}

/// Final numbers of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: u32,
    pub max_level_reached: u32,
    pub elapsed_ms: f64,
    pub duration_seconds: u32,
    pub total_shots: u32,
    pub correct_shots: u32,
    pub wrong_shots: u32,
    /// Percent, 0-100
    pub accuracy: f32,
    pub tables: Vec<TableStat>,
}

/// Something the presentation layer should draw or play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    SessionStarted { width: f32, height: f32, duration_ms: f64 },
    QuestionChanged { question: Question, text: String },
    /// The per-question countdown ran out
    QuestionExpired { question: Question },
    CardSpawned { card: Card },
    /// Left the playfield unanswered
    CardExited { id: CardId },
    CardHit { card: Card, pos: Vec2 },
    /// Field wiped for a new question, level-up or session end
    CardsCleared { ids: Vec<CardId> },
    ScoreChanged { score: u32, delta: i32 },
    LevelUp(LevelUp),
    SessionEnded { summary: SessionSummary },
}

/// What a successful shot hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitOutcome {
    pub card: Card,
    pub change: ScoreChange,
    pub level_up: Option<LevelUp>,
}

/// A running game session
pub struct GameSession<R: SessionReporter = NullReporter> {
    config: GameConfig,
    rng: RandomSource,
    questions: QuestionGenerator,
    spawner: CardSpawner,
    progression: ProgressionManager,
    score: ScoreManager,
    timers: Timers,
    question: Question,
    phase: SessionPhase,
    /// Session clock (ms), advanced by `frame`
    now_ms: f64,
    started_at: DateTime<Utc>,
    shots: ShotLog,
    events: Vec<GameEvent>,
    reporter: R,
    resume_timer: Option<TimerId>,
    question_timer: Option<TimerId>,
    summary: Option<SessionSummary>,
}

impl GameSession<NullReporter> {
    /// Offline session
    pub fn offline(config: GameConfig, seed: u64, started_at: DateTime<Utc>) -> Self {
        Self::new(config, seed, started_at, NullReporter)
    }
}

impl<R: SessionReporter> GameSession<R> {
    /// Create and start a session. `started_at` is the wall-clock start used
    /// for backend timestamps; gameplay time starts at zero.
    pub fn new(config: GameConfig, seed: u64, started_at: DateTime<Utc>, reporter: R) -> Self {
        let mut session = Self {
            rng: RandomSource::new(seed),
            questions: QuestionGenerator::new(config.factor_ranges, config.difficulty),
            spawner: CardSpawner::new(config.cards.clone(), config.world),
            progression: ProgressionManager::new(config.progression.clone(), 0.0),
            score: ScoreManager::new(config.score),
            timers: Timers::new(),
            question: Question::new(1, 1),
            phase: SessionPhase::Active,
            now_ms: 0.0,
            started_at,
            shots: ShotLog::new(),
            events: Vec::new(),
            reporter,
            resume_timer: None,
            question_timer: None,
            summary: None,
            config,
        };
        session.start();
        session
    }

    fn start(&mut self) {
        self.progression.reset(self.now_ms);
        let change = self.score.reset();
        self.push(GameEvent::SessionStarted {
            width: self.config.world.width,
            height: self.config.world.height,
            duration_ms: self.progression.session_duration_ms(),
        });
        self.push(GameEvent::ScoreChanged {
            score: change.score,
            delta: change.delta,
        });

        self.questions
            .set_specific_table(Some(self.progression.current_table()));
        self.spawner
            .set_speed_multiplier(self.progression.speed_multiplier());

        let request = CreateSessionRequest {
            started_at: self.started_at,
            canvas_width: self.config.world.width.round() as u32,
            canvas_height: self.config.world.height.round() as u32,
        };
        let result = self.reporter.create_session(&request);
        log_report_failure("session start", result);

        log::info!(
            "Session started (seed {}, table {}, {}s)",
            self.rng.seed(),
            self.progression.current_table(),
            self.progression.session_duration_ms() / 1000.0
        );

        self.next_question();
    }

    /// Advance the session by one frame of `dt` seconds
    pub fn frame(&mut self, dt: f32) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        if !dt.is_finite() {
            log::warn!("Ignoring non-finite frame delta {}", dt);
            return;
        }
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let dt_ms = f64::from(dt) * 1000.0;
        self.now_ms += dt_ms;

        for fired in self.timers.advance(dt_ms) {
            match fired.kind {
                TimerKind::ResumeSpawning => {
                    self.resume_timer = None;
                    self.resume_spawning();
                }
                TimerKind::QuestionTimeout => {
                    self.question_timer = None;
                    self.expire_question();
                }
                TimerKind::SpawnTick => {}
            }
        }

        let update = self.spawner.update(dt, &mut self.rng);
        self.push_spawner_update(update);

        if self.progression.is_session_complete(self.now_ms) {
            self.end_session();
        }
    }

    /// Fire at `(x, y)`. Returns what was hit, if anything.
    pub fn shoot(&mut self, x: f32, y: f32) -> Option<HitOutcome> {
        if self.phase == SessionPhase::Ended {
            return None;
        }
        let point = Vec2::new(x, y);
        let (id, value, is_correct) = self
            .spawner
            .check_hit(point)
            .map(|c| (c.id, c.value, c.is_correct))?;
        self.record_shot(point, value, is_correct);

        let change = if is_correct {
            self.score.add_correct_hit()
        } else {
            self.score.add_wrong_hit()
        };
        let card = self.spawner.remove_card(id)?;
        log::debug!(
            "Hit card {:?} value={} ({}) score={}",
            card.id,
            card.value,
            if is_correct { "correct" } else { "wrong" },
            change.score
        );

        self.push(GameEvent::CardHit {
            card: card.clone(),
            pos: point,
        });
        self.push(GameEvent::ScoreChanged {
            score: change.score,
            delta: change.delta,
        });

        let level_up = self.progression.update_progress(i64::from(change.score));
        if let Some(up) = level_up {
            self.level_up(up);
        } else if is_correct {
            self.next_question();
        }

        Some(HitOutcome {
            card,
            change,
            level_up,
        })
    }

    /// End the session now. Only the first call has any effect; returns
    /// whether this call ended it.
    pub fn end_session(&mut self) -> bool {
        if self.phase == SessionPhase::Ended {
            return false;
        }
        self.phase = SessionPhase::Ended;

        self.timers.cancel_all();
        self.resume_timer = None;
        self.question_timer = None;
        let cleared = self.spawner.shutdown();
        self.push_cleared(cleared);

        let elapsed_ms = self
            .progression
            .elapsed_ms(self.now_ms)
            .min(self.progression.session_duration_ms());
        let summary = SessionSummary {
            final_score: self.score.score(),
            max_level_reached: self.progression.current_level(),
            elapsed_ms,
            duration_seconds: (elapsed_ms / 1000.0).round() as u32,
            total_shots: self.shots.total(),
            correct_shots: self.shots.correct(),
            wrong_shots: self.shots.wrong(),
            accuracy: self.shots.accuracy(),
            tables: self.shots.table_stats(),
        };

        let payload = FinishSessionPayload {
            finished_at: self.wall_clock(elapsed_ms),
            final_score: summary.final_score,
            max_level_reached: summary.max_level_reached,
            duration_seconds: summary.duration_seconds,
        };
        let result = self.reporter.finish_session(&payload);
        log_report_failure("session finish", result);

        log::info!(
            "Session ended: score {}, level {}, {}/{} correct",
            summary.final_score,
            summary.max_level_reached,
            summary.correct_shots,
            summary.total_shots
        );

        self.push(GameEvent::SessionEnded {
            summary: summary.clone(),
        });
        self.summary = Some(summary);
        true
    }

    /// Generate a question for the current table and start spawning for it
    fn next_question(&mut self) {
        self.question = self.questions.generate_question(&mut self.rng);
        self.push(GameEvent::QuestionChanged {
            question: self.question,
            text: self.question.display(),
        });
        self.resume_spawning();
    }

    fn resume_spawning(&mut self) {
        let update = self.spawner.start_spawning(self.question, &mut self.rng);
        self.push_spawner_update(update);
        self.restart_question_timer();
    }

    fn restart_question_timer(&mut self) {
        if let Some(id) = self.question_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(duration) = self.config.question_duration_ms {
            self.question_timer = Some(self.timers.schedule_once(TimerKind::QuestionTimeout, duration));
        }
    }

    fn expire_question(&mut self) {
        log::debug!("Question {} expired", self.question.display());
        self.push(GameEvent::QuestionExpired {
            question: self.question,
        });
        self.next_question();
    }

    /// New table and speed; the field is wiped and cards return after
    /// `level_up_delay_ms`
    fn level_up(&mut self, up: LevelUp) {
        log::info!(
            "Level up {} -> {}: table {}, speed x{:.2}",
            up.previous,
            up.level,
            up.table,
            up.speed_multiplier
        );
        self.push(GameEvent::LevelUp(up));

        self.questions.set_specific_table(Some(up.table));
        self.spawner.set_speed_multiplier(up.speed_multiplier);

        self.spawner.stop_spawning();
        let cleared = self.spawner.clear_all_cards();
        self.push_cleared(cleared);
        if let Some(id) = self.question_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.resume_timer.take() {
            self.timers.cancel(id);
        }

        self.question = self.questions.generate_question(&mut self.rng);
        self.push(GameEvent::QuestionChanged {
            question: self.question,
            text: self.question.display(),
        });

        let delay = self.config.level_up_delay_ms;
        if delay > 0.0 {
            self.resume_timer = Some(self.timers.schedule_once(TimerKind::ResumeSpawning, delay));
        } else {
            self.resume_spawning();
        }
    }

    fn record_shot(&mut self, point: Vec2, card_value: u32, is_correct: bool) {
        let record = ShotRecord {
            elapsed_ms: self.progression.elapsed_ms(self.now_ms),
            pos: point,
            question: self.question,
            card_value,
            is_correct,
        };
        self.shots.record(record);

        let payload = RecordShotPayload {
            shot_at: self.wall_clock(record.elapsed_ms),
            coordinate_x: point.x,
            coordinate_y: point.y,
            factor_1: self.question.factor1(),
            factor_2: self.question.factor2(),
            correct_answer: self.question.correct_answer(),
            card_value,
            is_correct,
        };
        let result = self.reporter.record_shot(&payload);
        log_report_failure("shot", result);
    }

    fn wall_clock(&self, elapsed_ms: f64) -> DateTime<Utc> {
        self.started_at + chrono::Duration::milliseconds(elapsed_ms as i64)
    }

    fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn push_cleared(&mut self, cleared: Vec<Card>) {
        if !cleared.is_empty() {
            self.push(GameEvent::CardsCleared {
                ids: cleared.into_iter().map(|c| c.id).collect(),
            });
        }
    }

    fn push_spawner_update(&mut self, update: SpawnerUpdate) {
        self.push_cleared(update.cleared);
        for card in update.exited {
            self.push(GameEvent::CardExited { id: card.id });
        }
        for id in update.spawned {
            if let Some(card) = self.spawner.card(id) {
                let card = card.clone();
                self.push(GameEvent::CardSpawned { card });
            }
        }
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Observer for score changes (in addition to `ScoreChanged` events)
    pub fn set_score_observer(&mut self, observer: impl FnMut(ScoreChange) + 'static) {
        self.score.set_observer(observer);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn level(&self) -> u32 {
        self.progression.current_level()
    }

    pub fn current_table(&self) -> u32 {
        self.progression.current_table()
    }

    pub fn question(&self) -> Question {
        self.question
    }

    pub fn cards(&self) -> &[Card] {
        self.spawner.cards()
    }

    pub fn is_spawning(&self) -> bool {
        self.spawner.is_spawning()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.spawner.speed_multiplier()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.progression.elapsed_ms(self.now_ms)
    }

    pub fn remaining_ms(&self) -> f64 {
        self.progression.remaining_ms(self.now_ms)
    }

    /// Time left on the per-question countdown, if one is running
    pub fn question_remaining_ms(&self) -> Option<f64> {
        self.question_timer.and_then(|id| self.timers.remaining_ms(id))
    }

    pub fn progress_info(&self) -> ProgressInfo {
        self.progression.progress_info(self.now_ms)
    }

    pub fn shots(&self) -> &ShotLog {
        &self.shots
    }

    /// Set once the session has ended
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }
}

fn log_report_failure(what: &str, result: Result<(), ReportError>) {
    if let Err(e) = result {
        log::warn!("Failed to report {}: {}", what, e);
    }
}
