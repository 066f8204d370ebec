//! Card spawner
//!
//! Owns every live card. While spawning, a repeating timer drops a new card
//! just outside a random edge every `spawn_interval_ms`, as long as fewer
//! than `max_on_screen` cards are alive. Cards drift across the field and are
//! culled once they are `despawn_margin` past any edge.

use glam::Vec2;

use super::card::{Card, CardId, SpawnEdge};
use super::distractor::generate_wrong_answers;
use super::question::Question;
use super::rng::RandomSource;
use super::timer::{TimerId, TimerKind, Timers};
use crate::config::{CardConfig, WorldConfig};

/// Cards that appeared or disappeared during one spawner call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnerUpdate {
    pub spawned: Vec<CardId>,
    /// Cards that drifted off the field
    pub exited: Vec<Card>,
    /// Cards wiped by `start_spawning`
    pub cleared: Vec<Card>,
}

impl SpawnerUpdate {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.exited.is_empty() && self.cleared.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CardSpawner {
    config: CardConfig,
    world: WorldConfig,
    /// Live cards in spawn order
    cards: Vec<Card>,
    question: Option<Question>,
    /// Correct answer plus distractors, shuffled
    answer_pool: Vec<u32>,
    speed_multiplier: f32,
    timers: Timers,
    spawn_timer: Option<TimerId>,
    next_id: u32,
}

impl CardSpawner {
    pub fn new(config: CardConfig, world: WorldConfig) -> Self {
        Self {
            cards: Vec::with_capacity(config.max_on_screen),
            config,
            world,
            question: None,
            answer_pool: Vec::new(),
            speed_multiplier: 1.0,
            timers: Timers::new(),
            spawn_timer: None,
            next_id: 1,
        }
    }

    /// Clear the field, build a fresh answer pool for `question`, start the
    /// spawn timer and drop the first card right away.
    pub fn start_spawning(&mut self, question: Question, rng: &mut RandomSource) -> SpawnerUpdate {
        let mut update = SpawnerUpdate {
            cleared: self.clear_all_cards(),
            ..Default::default()
        };

        let wrong = generate_wrong_answers(
            question.correct_answer(),
            self.config.wrong_answers_count,
            question.factor1(),
            question.factor2(),
            rng,
        );
        let mut pool = Vec::with_capacity(wrong.len() + 1);
        pool.push(question.correct_answer());
        pool.extend(wrong);
        rng.shuffle(&mut pool);
        log::debug!("Answer pool for {}: {:?}", question.display(), pool);

        self.question = Some(question);
        self.answer_pool = pool;

        self.stop_spawning();
        self.spawn_timer = Some(
            self.timers
                .schedule_repeating(TimerKind::SpawnTick, self.config.spawn_interval_ms),
        );

        if let Some(id) = self.spawn_card(rng) {
            update.spawned.push(id);
        }
        update
    }

    /// Cancel the spawn timer; live cards keep moving
    pub fn stop_spawning(&mut self) {
        if let Some(id) = self.spawn_timer.take() {
            self.timers.cancel(id);
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn_timer.is_some()
    }

    /// Applies to cards spawned from now on
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Move cards, cull those that left the field, then run due spawn ticks
    pub fn update(&mut self, dt: f32, rng: &mut RandomSource) -> SpawnerUpdate {
        let mut update = SpawnerUpdate::default();

        let (width, height, margin) = (self.world.width, self.world.height, self.config.despawn_margin);
        let mut i = 0;
        while i < self.cards.len() {
            self.cards[i].step(dt);
            if self.cards[i].is_out_of_bounds(width, height, margin) {
                let card = self.cards.remove(i);
                log::debug!("Card {:?} ({}) left the field", card.id, card.value);
                update.exited.push(card);
            } else {
                i += 1;
            }
        }

        if self.is_spawning() {
            let ticks = self
                .timers
                .advance(f64::from(dt) * 1000.0)
                .into_iter()
                .filter(|f| f.kind == TimerKind::SpawnTick)
                .count();
            for _ in 0..ticks {
                if let Some(id) = self.spawn_card(rng) {
                    update.spawned.push(id);
                }
            }
        }

        update
    }

    /// One spawn tick. Skipped silently at capacity or without a question.
    pub fn spawn_card(&mut self, rng: &mut RandomSource) -> Option<CardId> {
        let edge = SpawnEdge::ALL[rng.index(SpawnEdge::ALL.len())];
        self.spawn_from(edge, rng)
    }

    /// Spawn tick with a fixed entry edge
    pub fn spawn_from(&mut self, edge: SpawnEdge, rng: &mut RandomSource) -> Option<CardId> {
        let question = self.question?;
        if self.cards.len() >= self.config.max_on_screen {
            return None;
        }

        let value = self.pick_value(question.correct_answer(), rng);
        let (pos, vel) = self.trajectory(edge, rng);

        let id = CardId(self.next_id);
        self.next_id += 1;
        self.cards.push(Card {
            id,
            value,
            is_correct: value == question.correct_answer(),
            pos,
            vel,
            size: Vec2::new(self.config.width, self.config.height),
            edge,
        });
        log::debug!("Spawned card {:?} value={} from {:?}", id, value, edge);
        Some(id)
    }

    fn pick_value(&self, correct: u32, rng: &mut RandomSource) -> u32 {
        if rng.chance(self.config.correct_chance) {
            return correct;
        }
        let wrong: Vec<u32> = self
            .answer_pool
            .iter()
            .copied()
            .filter(|&v| v != correct)
            .collect();
        rng.pick(&wrong).copied().unwrap_or(correct)
    }

    /// Position just outside `edge` and a velocity crossing the field
    fn trajectory(&self, edge: SpawnEdge, rng: &mut RandomSource) -> (Vec2, Vec2) {
        let margin = self.config.spawn_margin;
        let (w, h) = (self.world.width, self.world.height);

        let pos = match edge {
            SpawnEdge::Top => Vec2::new(rng.range_f32(margin, w - margin), -margin),
            SpawnEdge::Bottom => Vec2::new(rng.range_f32(margin, w - margin), h + margin),
            SpawnEdge::Left => Vec2::new(-margin, rng.range_f32(margin, h - margin)),
            SpawnEdge::Right => Vec2::new(w + margin, rng.range_f32(margin, h - margin)),
        };

        let speed = rng.range_f32(self.config.min_speed, self.config.max_speed) * self.speed_multiplier;
        let jitter = self.config.lateral_jitter;
        let lateral = rng.range_f32(-jitter, jitter);
        let inward = edge.inward();
        let vel = inward * speed + inward.perp() * lateral;

        (pos, vel)
    }

    /// First card (in spawn order) whose bounds contain `point`
    pub fn check_hit(&self, point: Vec2) -> Option<&Card> {
        self.cards.iter().find(|c| c.contains(point))
    }

    /// Take a card out of the live set; effects are the caller's business
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(index))
    }

    /// Empty the live set, returning what was there
    pub fn clear_all_cards(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn question(&self) -> Option<Question> {
        self.question
    }

    pub fn answer_pool(&self) -> &[u32] {
        &self.answer_pool
    }

    /// Stop and clear
    pub fn shutdown(&mut self) -> Vec<Card> {
        self.stop_spawning();
        self.timers.cancel_all();
        self.clear_all_cards()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spawner() -> CardSpawner {
        CardSpawner::new(CardConfig::default(), WorldConfig::default())
    }

    fn still_config() -> CardConfig {
        CardConfig {
            lateral_jitter: 0.0,
            ..CardConfig::default()
        }
    }

    #[test]
    fn test_start_spawns_immediately() {
        let mut rng = RandomSource::new(1);
        let mut spawner = spawner();
        let update = spawner.start_spawning(Question::new(7, 8), &mut rng);
        assert_eq!(update.spawned.len(), 1);
        assert_eq!(spawner.len(), 1);
        assert!(spawner.is_spawning());
        assert_eq!(spawner.answer_pool().len(), 6);
        assert!(spawner.answer_pool().contains(&56));
    }

    #[test]
    fn test_restart_clears_previous_cards() {
        let mut rng = RandomSource::new(2);
        let mut spawner = spawner();
        spawner.start_spawning(Question::new(7, 8), &mut rng);
        spawner.spawn_card(&mut rng);
        let update = spawner.start_spawning(Question::new(3, 4), &mut rng);
        assert_eq!(update.cleared.len(), 2);
        assert_eq!(spawner.len(), 1);
        assert_eq!(spawner.question(), Some(Question::new(3, 4)));
    }

    #[test]
    fn test_no_question_no_cards() {
        let mut rng = RandomSource::new(3);
        let mut spawner = spawner();
        assert!(spawner.spawn_card(&mut rng).is_none());
        assert!(spawner.update(10.0, &mut rng).is_empty());
    }

    #[test]
    fn test_interval_ticks() {
        let mut rng = RandomSource::new(4);
        let mut spawner = spawner();
        spawner.start_spawning(Question::new(6, 6), &mut rng);
        // 1.4s: nothing yet
        assert!(spawner.update(1.4, &mut rng).spawned.is_empty());
        // crosses 1.5s
        assert_eq!(spawner.update(0.2, &mut rng).spawned.len(), 1);
        assert_eq!(spawner.len(), 2);
    }

    #[test]
    fn test_stop_spawning_keeps_cards_moving() {
        let mut rng = RandomSource::new(5);
        let mut spawner = spawner();
        spawner.start_spawning(Question::new(2, 9), &mut rng);
        spawner.stop_spawning();
        spawner.stop_spawning();
        let before = spawner.cards()[0].pos;
        let update = spawner.update(0.5, &mut rng);
        assert!(update.spawned.is_empty());
        assert_ne!(spawner.cards()[0].pos, before);
    }

    #[test]
    fn test_card_culled_past_bottom_margin() {
        let mut rng = RandomSource::new(6);
        let mut spawner = CardSpawner::new(still_config(), WorldConfig::default());
        spawner.start_spawning(Question::new(4, 4), &mut rng);
        spawner.stop_spawning();
        spawner.clear_all_cards();

        let id = spawner.spawn_from(SpawnEdge::Top, &mut rng).unwrap();
        let card = spawner.card(id).unwrap().clone();
        assert_eq!(card.pos.y, -50.0);
        assert!(card.vel.y > 0.0);
        assert_eq!(card.vel.x, 0.0);

        let limit = 800.0 + 100.0;
        let mut removed = false;
        for _ in 0..2000 {
            let update = spawner.update(1.0 / 60.0, &mut rng);
            if let Some(card) = update.exited.iter().find(|c| c.id == id) {
                assert!(card.pos.y > limit);
                removed = true;
                break;
            }
            assert!(spawner.card(id).unwrap().pos.y <= limit);
        }
        assert!(removed);
        assert!(spawner.is_empty());
    }

    #[test]
    fn test_speed_multiplier_scales_new_cards() {
        let mut rng = RandomSource::new(7);
        let mut spawner = CardSpawner::new(
            CardConfig {
                min_speed: 100.0,
                max_speed: 100.0,
                lateral_jitter: 0.0,
                ..CardConfig::default()
            },
            WorldConfig::default(),
        );
        spawner.start_spawning(Question::new(5, 5), &mut rng);
        spawner.set_speed_multiplier(1.5);
        let id = spawner.spawn_from(SpawnEdge::Left, &mut rng).unwrap();
        assert_eq!(spawner.card(id).unwrap().vel, Vec2::new(150.0, 0.0));
    }

    #[test]
    fn test_check_hit_first_in_spawn_order() {
        let mut rng = RandomSource::new(8);
        let mut spawner = spawner();
        spawner.start_spawning(Question::new(7, 8), &mut rng);
        spawner.clear_all_cards();
        let a = spawner.spawn_from(SpawnEdge::Top, &mut rng).unwrap();
        let b = spawner.spawn_from(SpawnEdge::Top, &mut rng).unwrap();
        // Stack both cards on the same spot
        for card in spawner.cards.iter_mut() {
            card.pos = Vec2::new(300.0, 300.0);
        }
        assert_eq!(spawner.check_hit(Vec2::new(310.0, 290.0)).map(|c| c.id), Some(a));
        assert!(spawner.check_hit(Vec2::new(10.0, 10.0)).is_none());

        spawner.remove_card(a).unwrap();
        assert_eq!(spawner.check_hit(Vec2::new(310.0, 290.0)).map(|c| c.id), Some(b));
        assert!(spawner.remove_card(a).is_none());
    }

    #[test]
    fn test_correct_flag_matches_value() {
        let mut rng = RandomSource::new(9);
        let mut spawner = CardSpawner::new(
            CardConfig {
                max_on_screen: 1000,
                ..CardConfig::default()
            },
            WorldConfig::default(),
        );
        spawner.start_spawning(Question::new(7, 8), &mut rng);
        for _ in 0..500 {
            spawner.spawn_card(&mut rng);
        }
        let correct = spawner.cards().iter().filter(|c| c.is_correct).count();
        assert!(spawner.cards().iter().all(|c| c.is_correct == (c.value == 56)));
        // ~40% correct
        assert!(correct > 120 && correct < 280, "correct = {}", correct);
    }

    #[test]
    fn test_no_distractors_falls_back_to_correct() {
        let mut rng = RandomSource::new(10);
        let mut spawner = CardSpawner::new(
            CardConfig {
                wrong_answers_count: 0,
                correct_chance: 0.0,
                ..CardConfig::default()
            },
            WorldConfig::default(),
        );
        spawner.start_spawning(Question::new(3, 3), &mut rng);
        assert!(spawner.cards()[0].is_correct);
    }

    #[test]
    fn test_spawn_positions_outside_edges() {
        let mut rng = RandomSource::new(11);
        let mut spawner = CardSpawner::new(
            CardConfig {
                max_on_screen: 100,
                ..CardConfig::default()
            },
            WorldConfig::default(),
        );
        spawner.start_spawning(Question::new(2, 2), &mut rng);
        for _ in 0..50 {
            spawner.spawn_card(&mut rng);
        }
        for card in spawner.cards() {
            let p = card.pos;
            match card.edge {
                SpawnEdge::Top => assert_eq!(p.y, -50.0),
                SpawnEdge::Bottom => assert_eq!(p.y, 850.0),
                SpawnEdge::Left => assert_eq!(p.x, -50.0),
                SpawnEdge::Right => assert_eq!(p.x, 1250.0),
            }
            // Heading into the field
            assert!(card.vel.dot(card.edge.inward()) >= 80.0);
        }
    }

    #[test]
    fn test_shutdown() {
        let mut rng = RandomSource::new(12);
        let mut spawner = spawner();
        spawner.start_spawning(Question::new(9, 9), &mut rng);
        let cleared = spawner.shutdown();
        assert_eq!(cleared.len(), 1);
        assert!(!spawner.is_spawning());
        assert!(spawner.update(5.0, &mut rng).spawned.is_empty());
    }

    proptest! {
        #[test]
        fn prop_capacity_never_exceeded(seed in any::<u64>(), frames in 1usize..400, max in 1usize..8) {
            let mut rng = RandomSource::new(seed);
            let mut spawner = CardSpawner::new(
                CardConfig { max_on_screen: max, spawn_interval_ms: 50.0, ..CardConfig::default() },
                WorldConfig::default(),
            );
            spawner.start_spawning(Question::new(6, 7), &mut rng);
            for _ in 0..frames {
                spawner.update(1.0 / 30.0, &mut rng);
                spawner.spawn_card(&mut rng);
                prop_assert!(spawner.len() <= max);
            }
        }
    }
}
