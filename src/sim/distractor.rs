//! Wrong-answer (distractor) generation
//!
//! Distractors are built from the same mistakes a learner makes: an
//! off-by-one factor, a neighbouring table, a product that is "close enough".

use super::rng::RandomSource;

/// Random draws per requested answer before falling back to a linear scan
pub const MAX_ATTEMPTS_PER_ANSWER: usize = 64;

/// One way of producing a plausible wrong answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistractorStrategy {
    /// (f1 + 1) × f2
    Factor1Up,
    /// (f1 - 1) × f2
    Factor1Down,
    /// f1 × (f2 + 1)
    Factor2Up,
    /// f1 × (f2 - 1)
    Factor2Down,
    /// correct + 1..=10
    SmallOffsetUp,
    /// correct - 1..=10
    SmallOffsetDown,
    /// correct + 10..=20
    LargeOffsetUp,
    /// correct - 10..=20
    LargeOffsetDown,
    /// correct + f1
    AddFactor1,
    /// correct - f1
    SubFactor1,
    /// correct + f2
    AddFactor2,
    /// correct - f2
    SubFactor2,
    /// f1 × (f2 ± up to 2)
    NearbyFactor2,
    /// (f1 ± up to 2) × f2
    NearbyFactor1,
}

impl DistractorStrategy {
    pub const ALL: [DistractorStrategy; 14] = [
        DistractorStrategy::Factor1Up,
        DistractorStrategy::Factor1Down,
        DistractorStrategy::Factor2Up,
        DistractorStrategy::Factor2Down,
        DistractorStrategy::SmallOffsetUp,
        DistractorStrategy::SmallOffsetDown,
        DistractorStrategy::LargeOffsetUp,
        DistractorStrategy::LargeOffsetDown,
        DistractorStrategy::AddFactor1,
        DistractorStrategy::SubFactor1,
        DistractorStrategy::AddFactor2,
        DistractorStrategy::SubFactor2,
        DistractorStrategy::NearbyFactor2,
        DistractorStrategy::NearbyFactor1,
    ];

    /// Candidate value; may be non-positive or equal to `correct`
    pub fn apply(self, correct: i64, f1: i64, f2: i64, rng: &mut RandomSource) -> i64 {
        use DistractorStrategy::*;
        match self {
            Factor1Up => (f1 + 1) * f2,
            Factor1Down => (f1 - 1) * f2,
            Factor2Up => f1 * (f2 + 1),
            Factor2Down => f1 * (f2 - 1),
            SmallOffsetUp => correct + rng.range_i64(1, 10),
            SmallOffsetDown => correct - rng.range_i64(1, 10),
            LargeOffsetUp => correct + rng.range_i64(10, 20),
            LargeOffsetDown => correct - rng.range_i64(10, 20),
            AddFactor1 => correct + f1,
            SubFactor1 => correct - f1,
            AddFactor2 => correct + f2,
            SubFactor2 => correct - f2,
            NearbyFactor2 => f1 * rng.range_i64((f2 - 2).max(1), f2 + 2),
            NearbyFactor1 => rng.range_i64((f1 - 2).max(1), f1 + 2) * f2,
        }
    }
}

/// `count` distinct positive values, none equal to `correct`.
///
/// Strategies are drawn uniformly at random. If the random phase stalls
/// (tiny factors produce the same few candidates over and over), the
/// remainder is filled by walking outward from `correct`: +1, -1, +2, -2, ...
pub fn generate_wrong_answers(
    correct: u32,
    count: usize,
    factor1: u32,
    factor2: u32,
    rng: &mut RandomSource,
) -> Vec<u32> {
    let correct_i = i64::from(correct);
    let (f1, f2) = (i64::from(factor1), i64::from(factor2));
    let mut answers: Vec<u32> = Vec::with_capacity(count);

    let max_attempts = count.saturating_mul(MAX_ATTEMPTS_PER_ANSWER);
    let mut attempts = 0;
    while answers.len() < count && attempts < max_attempts {
        attempts += 1;
        let strategy = DistractorStrategy::ALL[rng.index(DistractorStrategy::ALL.len())];
        let candidate = strategy.apply(correct_i, f1, f2, rng);
        push_candidate(&mut answers, candidate, correct_i);
    }

    if answers.len() < count {
        log::debug!(
            "Distractor draw stalled for {}x{} after {} attempts ({} of {}), scanning",
            factor1,
            factor2,
            attempts,
            answers.len(),
            count
        );
        let mut step = 1i64;
        while answers.len() < count {
            push_candidate(&mut answers, correct_i + step, correct_i);
            if answers.len() < count {
                push_candidate(&mut answers, correct_i - step, correct_i);
            }
            step += 1;
        }
    }

    answers
}

fn push_candidate(answers: &mut Vec<u32>, candidate: i64, correct: i64) {
    if candidate <= 0 || candidate == correct {
        return;
    }
    let Ok(value) = u32::try_from(candidate) else {
        return;
    };
    if !answers.contains(&value) {
        answers.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seven_times_eight() {
        let mut rng = RandomSource::new(1234);
        let wrong = generate_wrong_answers(56, 5, 7, 8, &mut rng);
        assert_eq!(wrong.len(), 5);
        assert!(wrong.iter().all(|&v| v > 0 && v != 56));
        let mut dedup = wrong.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 5);
    }

    #[test]
    fn test_one_times_one_terminates() {
        let mut rng = RandomSource::new(0);
        let wrong = generate_wrong_answers(1, 5, 1, 1, &mut rng);
        assert_eq!(wrong.len(), 5);
        assert!(!wrong.contains(&1));
    }

    #[test]
    fn test_large_request_falls_back_to_scan() {
        // 1 x 1 can only produce values up to ~21 from the random strategies
        let mut rng = RandomSource::new(77);
        let wrong = generate_wrong_answers(1, 60, 1, 1, &mut rng);
        assert_eq!(wrong.len(), 60);
        assert!(wrong.iter().all(|&v| v > 1));
    }

    #[test]
    fn test_zero_count() {
        let mut rng = RandomSource::new(0);
        assert!(generate_wrong_answers(56, 0, 7, 8, &mut rng).is_empty());
    }

    #[test]
    fn test_factor_strategies_are_exact() {
        let mut rng = RandomSource::new(0);
        assert_eq!(DistractorStrategy::Factor1Up.apply(56, 7, 8, &mut rng), 64);
        assert_eq!(DistractorStrategy::Factor2Down.apply(56, 7, 8, &mut rng), 49);
        assert_eq!(DistractorStrategy::SubFactor2.apply(56, 7, 8, &mut rng), 48);
    }

    #[test]
    fn test_same_seed_same_distractors() {
        let a = generate_wrong_answers(42, 5, 6, 7, &mut RandomSource::new(9));
        let b = generate_wrong_answers(42, 5, 6, 7, &mut RandomSource::new(9));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_distinct_positive_not_correct(
            seed in any::<u64>(),
            f1 in 1u32..=12,
            f2 in 1u32..=12,
            count in 0usize..=12,
        ) {
            let correct = f1 * f2;
            let mut rng = RandomSource::new(seed);
            let wrong = generate_wrong_answers(correct, count, f1, f2, &mut rng);
            prop_assert_eq!(wrong.len(), count);
            for (i, v) in wrong.iter().enumerate() {
                prop_assert!(*v > 0);
                prop_assert_ne!(*v, correct);
                prop_assert!(!wrong[..i].contains(v));
            }
        }
    }
}
