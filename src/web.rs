//! Browser entry point
//!
//! `WebGame` wraps a [`GameSession`] for the JS presentation layer: JS drives
//! `frame` from requestAnimationFrame, forwards clicks to `shoot`, and drains
//! events as JSON to draw cards, play sounds and update the HUD.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::history::{HistoryEntry, SessionHistory};
use crate::hud;
use crate::report::http::HttpReporter;
use crate::report::{NullReporter, SessionReporter};
use crate::sim::GameSession;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Multiplication Shooter loaded");
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Game instance owned by JS
#[wasm_bindgen]
pub struct WebGame {
    session: GameSession<Box<dyn SessionReporter>>,
    config: GameConfig,
    api_base: Option<String>,
    history: SessionHistory,
    /// Set once the ended session was added to the history
    recorded: bool,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a session on a `width` x `height` canvas. Without `api_base`
    /// the game runs offline.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, api_base: Option<String>) -> WebGame {
        let config = GameConfig::load().with_world(width, height);
        let session = Self::start_session(&config, api_base.as_deref());
        WebGame {
            session,
            config,
            api_base,
            history: SessionHistory::load(),
            recorded: false,
        }
    }

    /// Start over with a fresh seed
    pub fn restart(&mut self) {
        self.session = Self::start_session(&self.config, self.api_base.as_deref());
        self.recorded = false;
    }

    /// Advance by `dt` seconds
    pub fn frame(&mut self, dt: f32) {
        self.session.frame(dt);
        self.record_if_ended();
    }

    /// Returns true if a card was hit
    pub fn shoot(&mut self, x: f32, y: f32) -> bool {
        self.session.shoot(x, y).is_some()
    }

    /// Player quit from the menu
    pub fn end_session(&mut self) {
        self.session.end_session();
        self.record_if_ended();
    }

    /// Queued `GameEvent`s as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = self.session.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::error!("Failed to serialize events: {}", e);
            "[]".to_string()
        })
    }

    /// Cards currently on the field as a JSON array
    pub fn cards_json(&self) -> String {
        serde_json::to_string(self.session.cards()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn history_json(&self) -> String {
        serde_json::to_string(&self.history.entries).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn level(&self) -> u32 {
        self.session.level()
    }

    pub fn question_text(&self) -> String {
        self.session.question().display()
    }

    pub fn remaining_ms(&self) -> f64 {
        self.session.remaining_ms()
    }

    pub fn session_clock(&self) -> String {
        hud::format_session_clock(self.session.remaining_ms())
    }

    /// CSS colour for the session clock
    pub fn session_clock_color(&self) -> String {
        css_color(hud::session_urgency(self.session.remaining_ms()).color())
    }

    /// Empty when no per-question countdown runs
    pub fn question_clock(&self) -> String {
        self.session
            .question_remaining_ms()
            .map(hud::format_question_clock)
            .unwrap_or_default()
    }

    pub fn question_clock_color(&self) -> String {
        let remaining = self.session.question_remaining_ms().unwrap_or(f64::MAX);
        css_color(hud::question_urgency(remaining).color())
    }
}

impl WebGame {
    fn start_session(
        config: &GameConfig,
        api_base: Option<&str>,
    ) -> GameSession<Box<dyn SessionReporter>> {
        let reporter: Box<dyn SessionReporter> = match api_base {
            Some(url) => Box::new(HttpReporter::new(url)),
            None => Box::new(NullReporter),
        };
        let seed = js_sys::Date::now() as u64;
        GameSession::new(config.clone(), seed, now(), reporter)
    }

    fn record_if_ended(&mut self) {
        if self.recorded {
            return;
        }
        if let Some(summary) = self.session.summary() {
            let finished_at = now();
            if let Some(rank) = self
                .history
                .add(HistoryEntry::from_summary(summary, finished_at))
            {
                log::info!("Session ranked #{} in history", rank);
                self.history.save();
            }
            self.recorded = true;
        }
    }
}

fn css_color([r, g, b, a]: [f32; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}
