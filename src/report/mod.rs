//! Backend session telemetry
//!
//! The game reports a session's start, every hit and the final result.
//! Reporting is best effort: a [`SessionReporter`] may fail, and the session
//! logs the error and carries on. Nothing is retried.

#[cfg(target_arch = "wasm32")]
pub mod http;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("no backend session id yet")]
    NoSession,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
}

/// `POST /sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub started_at: DateTime<Utc>,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// `POST /sessions/{id}/shots`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordShotPayload {
    pub shot_at: DateTime<Utc>,
    pub coordinate_x: f32,
    pub coordinate_y: f32,
    pub factor_1: u32,
    pub factor_2: u32,
    pub correct_answer: u32,
    pub card_value: u32,
    pub is_correct: bool,
}

/// `PUT /sessions/{id}/finish`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishSessionPayload {
    pub finished_at: DateTime<Utc>,
    pub final_score: u32,
    pub max_level_reached: u32,
    pub duration_seconds: u32,
}

/// Envelope around every backend response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Session row as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSessionData {
    pub id: u64,
    pub user_id: u64,
    pub started_at: String,
    pub finished_at: Option<String>,
    #[serde(default)]
    pub final_score: u32,
    #[serde(default)]
    pub max_level_reached: u32,
    #[serde(default)]
    pub duration_seconds: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Response to `finish`: the session plus shot statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedSessionData {
    #[serde(flatten)]
    pub session: GameSessionData,
    pub total_shots: u32,
    pub correct_shots: u32,
    pub wrong_shots: u32,
    pub accuracy: f32,
}

/// Sink for session telemetry. Calls must not block the frame loop.
pub trait SessionReporter {
    fn create_session(&mut self, request: &CreateSessionRequest) -> Result<(), ReportError>;
    fn record_shot(&mut self, shot: &RecordShotPayload) -> Result<(), ReportError>;
    fn finish_session(&mut self, payload: &FinishSessionPayload) -> Result<(), ReportError>;
}

impl<R: SessionReporter + ?Sized> SessionReporter for Box<R> {
    fn create_session(&mut self, request: &CreateSessionRequest) -> Result<(), ReportError> {
        (**self).create_session(request)
    }

    fn record_shot(&mut self, shot: &RecordShotPayload) -> Result<(), ReportError> {
        (**self).record_shot(shot)
    }

    fn finish_session(&mut self, payload: &FinishSessionPayload) -> Result<(), ReportError> {
        (**self).finish_session(payload)
    }
}

/// Drops everything (offline play)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl SessionReporter for NullReporter {
    fn create_session(&mut self, _request: &CreateSessionRequest) -> Result<(), ReportError> {
        Ok(())
    }

    fn record_shot(&mut self, _shot: &RecordShotPayload) -> Result<(), ReportError> {
        Ok(())
    }

    fn finish_session(&mut self, _payload: &FinishSessionPayload) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Writes payloads to the log as JSON (native builds, debugging)
#[derive(Debug, Clone, Default)]
pub struct LogReporter {
    shots: u32,
}

impl SessionReporter for LogReporter {
    fn create_session(&mut self, request: &CreateSessionRequest) -> Result<(), ReportError> {
        self.shots = 0;
        log::info!("[report] create session {}", serde_json::to_string(request)?);
        Ok(())
    }

    fn record_shot(&mut self, shot: &RecordShotPayload) -> Result<(), ReportError> {
        self.shots += 1;
        log::debug!("[report] shot #{} {}", self.shots, serde_json::to_string(shot)?);
        Ok(())
    }

    fn finish_session(&mut self, payload: &FinishSessionPayload) -> Result<(), ReportError> {
        log::info!(
            "[report] finish session after {} shots {}",
            self.shots,
            serde_json::to_string(payload)?
        );
        Ok(())
    }
}
