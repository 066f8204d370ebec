//! Multiplication Shooter entry point
//!
//! The browser build starts from `web::wasm_main`. Natively this runs a
//! headless autoplay session, useful for checking balance and logging.

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use chrono::Utc;
    use multiplication_shooter::GameConfig;
    use multiplication_shooter::report::LogReporter;
    use multiplication_shooter::sim::{GameSession, RandomSource};

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Frames between bot shots
    const SHOT_COOLDOWN: u32 = 45;
    /// Chance the bot aims at a correct card when one is visible
    const BOT_SKILL: f32 = 0.8;

    pub fn run(seed: u64) {
        let config = GameConfig::default();
        let (width, height) = (config.world.width, config.world.height);
        let mut session = GameSession::new(config, seed, Utc::now(), LogReporter::default());
        let mut bot = RandomSource::new(seed ^ 0x5eed);
        let mut cooldown = SHOT_COOLDOWN;

        while session.is_active() {
            session.frame(FRAME_DT);
            for event in session.drain_events() {
                log::debug!("{:?}", event);
            }

            cooldown = cooldown.saturating_sub(1);
            if cooldown > 0 {
                continue;
            }

            // Only cards fully inside the field can be clicked
            let visible: Vec<_> = session
                .cards()
                .iter()
                .filter(|c| c.pos.x > 0.0 && c.pos.x < width && c.pos.y > 0.0 && c.pos.y < height)
                .collect();
            let want_correct = bot.chance(BOT_SKILL);
            let target = visible
                .iter()
                .find(|c| c.is_correct == want_correct)
                .or_else(|| visible.first())
                .map(|c| c.pos);
            if let Some(pos) = target {
                session.shoot(pos.x, pos.y);
                cooldown = SHOT_COOLDOWN;
            }
        }

        if let Some(summary) = session.summary() {
            log::info!(
                "Autoplay finished: score {}, level {}, {}/{} correct ({:.1}%)",
                summary.final_score,
                summary.max_level_reached,
                summary.correct_shots,
                summary.total_shots,
                summary.accuracy
            );
            for table in &summary.tables {
                log::info!(
                    "  table {:>2}: {:>3} shots, {:.1}%",
                    table.table,
                    table.total_attempts,
                    table.accuracy
                );
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Multiplication Shooter (native) starting...");
    log::info!("Running a headless autoplay session - build with `wasm-pack build` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    autoplay::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_main, this is just to satisfy the compiler
}
