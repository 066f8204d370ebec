//! HUD text and colour helpers for the timers

use serde::{Deserialize, Serialize};

/// Colour tier of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

impl Urgency {
    /// RGBA, 0-1
    pub fn color(self) -> [f32; 4] {
        match self {
            Urgency::Normal => [1.0, 1.0, 1.0, 1.0],
            Urgency::Warning => [1.0, 0.8, 0.2, 1.0],
            Urgency::Critical => [1.0, 0.3, 0.3, 1.0],
        }
    }
}

const SESSION_WARNING_MS: f64 = 120_000.0;
const SESSION_CRITICAL_MS: f64 = 60_000.0;
const QUESTION_WARNING_MS: f64 = 10_000.0;
const QUESTION_CRITICAL_MS: f64 = 5_000.0;

/// Whole seconds left, rounded up so "0:00" only shows at the very end
fn ceil_seconds(remaining_ms: f64) -> u64 {
    (remaining_ms.max(0.0) / 1000.0).ceil() as u64
}

/// Session clock, "M:SS"
pub fn format_session_clock(remaining_ms: f64) -> String {
    let secs = ceil_seconds(remaining_ms);
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Question clock, "MM:SS"
pub fn format_question_clock(remaining_ms: f64) -> String {
    let secs = ceil_seconds(remaining_ms);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn session_urgency(remaining_ms: f64) -> Urgency {
    tier(remaining_ms, SESSION_WARNING_MS, SESSION_CRITICAL_MS)
}

pub fn question_urgency(remaining_ms: f64) -> Urgency {
    tier(remaining_ms, QUESTION_WARNING_MS, QUESTION_CRITICAL_MS)
}

fn tier(remaining_ms: f64, warning: f64, critical: f64) -> Urgency {
    if remaining_ms <= critical {
        Urgency::Critical
    } else if remaining_ms <= warning {
        Urgency::Warning
    } else {
        Urgency::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_clock() {
        assert_eq!(format_session_clock(300_000.0), "5:00");
        assert_eq!(format_session_clock(299_001.0), "5:00");
        assert_eq!(format_session_clock(299_000.0), "4:59");
        assert_eq!(format_session_clock(61_500.0), "1:02");
        assert_eq!(format_session_clock(0.0), "0:00");
        assert_eq!(format_session_clock(-50.0), "0:00");
    }

    #[test]
    fn test_question_clock() {
        assert_eq!(format_question_clock(30_000.0), "00:30");
        assert_eq!(format_question_clock(4_200.0), "00:05");
        assert_eq!(format_question_clock(90_000.0), "01:30");
    }

    #[test]
    fn test_session_urgency_thresholds() {
        assert_eq!(session_urgency(120_001.0), Urgency::Normal);
        assert_eq!(session_urgency(120_000.0), Urgency::Warning);
        assert_eq!(session_urgency(60_001.0), Urgency::Warning);
        assert_eq!(session_urgency(60_000.0), Urgency::Critical);
    }

    #[test]
    fn test_question_urgency_thresholds() {
        assert_eq!(question_urgency(10_500.0), Urgency::Normal);
        assert_eq!(question_urgency(10_000.0), Urgency::Warning);
        assert_eq!(question_urgency(5_000.0), Urgency::Critical);
        assert!(Urgency::Critical > Urgency::Normal);
    }
}
