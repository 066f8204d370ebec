//! Multiplication questions

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::{PINNED_FACTOR_MAX, PINNED_FACTOR_MIN};

/// A factor pair and its product. The product is always computed here, also
/// when a question is read back from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuestionFields")]
pub struct Question {
    factor1: u32,
    factor2: u32,
    correct_answer: u32,
}

/// Wire shape of a [`Question`]; `correct_answer` is checked, not trusted
#[derive(Deserialize)]
struct QuestionFields {
    factor1: u32,
    factor2: u32,
    correct_answer: Option<u32>,
}

impl TryFrom<QuestionFields> for Question {
    type Error = String;

    fn try_from(fields: QuestionFields) -> Result<Self, Self::Error> {
        let product = fields
            .factor1
            .checked_mul(fields.factor2)
            .ok_or_else(|| format!("{} x {} overflows", fields.factor1, fields.factor2))?;
        match fields.correct_answer {
            Some(answer) if answer != product => Err(format!(
                "correct_answer {} does not match {} x {}",
                answer, fields.factor1, fields.factor2
            )),
            _ => Ok(Question::new(fields.factor1, fields.factor2)),
        }
    }
}

impl Question {
    pub fn new(factor1: u32, factor2: u32) -> Self {
        Self {
            factor1,
            factor2,
            correct_answer: factor1 * factor2,
        }
    }

    pub fn factor1(&self) -> u32 {
        self.factor1
    }

    pub fn factor2(&self) -> u32 {
        self.factor2
    }

    pub fn correct_answer(&self) -> u32 {
        self.correct_answer
    }

    /// Prompt shown above the playfield
    pub fn display(&self) -> String {
        format!("{} × {} = ?", self.factor1, self.factor2)
    }
}

/// Factor range tier used when no table is pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Inclusive `[min, max]` factor ranges per difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorRanges {
    pub easy: (u32, u32),
    pub medium: (u32, u32),
    pub hard: (u32, u32),
}

impl Default for FactorRanges {
    fn default() -> Self {
        Self {
            easy: (1, 5),
            medium: (1, 10),
            hard: (1, 12),
        }
    }
}

impl FactorRanges {
    pub fn for_difficulty(&self, difficulty: Difficulty) -> (u32, u32) {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

/// Produces questions, either pinned to one table or drawn from a difficulty tier
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    ranges: FactorRanges,
    difficulty: Difficulty,
    pinned_table: Option<u32>,
}

impl QuestionGenerator {
    pub fn new(ranges: FactorRanges, difficulty: Difficulty) -> Self {
        Self {
            ranges,
            difficulty,
            pinned_table: None,
        }
    }

    /// Pin questions to table `t` (`t × 1..=10`), or `None` to sample by difficulty
    pub fn set_specific_table(&mut self, table: Option<u32>) {
        self.pinned_table = table;
    }

    pub fn specific_table(&self) -> Option<u32> {
        self.pinned_table
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn generate_question(&self, rng: &mut RandomSource) -> Question {
        match self.pinned_table {
            Some(table) => {
                let factor2 = rng.range_u32(PINNED_FACTOR_MIN, PINNED_FACTOR_MAX);
                Question::new(table, factor2)
            }
            None => {
                let (min, max) = self.ranges.for_difficulty(self.difficulty);
                let factor1 = rng.range_u32(min, max);
                let factor2 = rng.range_u32(min, max);
                Question::new(factor1, factor2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display() {
        assert_eq!(Question::new(7, 8).display(), "7 × 8 = ?");
    }

    #[test]
    fn test_pinned_table() {
        let mut rng = RandomSource::new(5);
        let mut generator = QuestionGenerator::new(FactorRanges::default(), Difficulty::Hard);
        generator.set_specific_table(Some(7));
        for _ in 0..200 {
            let q = generator.generate_question(&mut rng);
            assert_eq!(q.factor1, 7);
            assert!((1..=10).contains(&q.factor2));
        }
    }

    #[test]
    fn test_unpinning_reverts_to_difficulty() {
        let mut rng = RandomSource::new(11);
        let mut generator = QuestionGenerator::new(FactorRanges::default(), Difficulty::Easy);
        generator.set_specific_table(Some(9));
        generator.set_specific_table(None);
        for _ in 0..200 {
            let q = generator.generate_question(&mut rng);
            assert!((1..=5).contains(&q.factor1));
            assert!((1..=5).contains(&q.factor2));
        }
    }

    #[test]
    fn test_hard_range_reaches_twelve() {
        let mut rng = RandomSource::new(2);
        let generator = QuestionGenerator::new(FactorRanges::default(), Difficulty::Hard);
        let hit_twelve = (0..1000)
            .map(|_| generator.generate_question(&mut rng))
            .any(|q| q.factor1 == 12 || q.factor2 == 12);
        assert!(hit_twelve);
    }

    #[test]
    fn test_json_keeps_product_consistent() {
        let q: Question = serde_json::from_str(r#"{"factor1":7,"factor2":8,"correct_answer":56}"#).unwrap();
        assert_eq!(q, Question::new(7, 8));
        let q: Question = serde_json::from_str(r#"{"factor1":6,"factor2":9}"#).unwrap();
        assert_eq!(q.correct_answer(), 54);
        let json = serde_json::to_string(&Question::new(3, 4)).unwrap();
        assert_eq!(serde_json::from_str::<Question>(&json).unwrap(), Question::new(3, 4));
    }

    #[test]
    fn test_json_rejects_wrong_product() {
        let result = serde_json::from_str::<Question>(r#"{"factor1":7,"factor2":8,"correct_answer":3}"#);
        assert!(result.is_err());
        let result = serde_json::from_str::<Question>(r#"{"factor1":4294967295,"factor2":2}"#);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_answer_is_product(seed in any::<u64>(), table in proptest::option::of(1u32..=12)) {
            let mut rng = RandomSource::new(seed);
            let mut generator = QuestionGenerator::new(FactorRanges::default(), Difficulty::Medium);
            generator.set_specific_table(table);
            let q = generator.generate_question(&mut rng);
            prop_assert_eq!(q.correct_answer, q.factor1 * q.factor2);
        }
    }
}
