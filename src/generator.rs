use crate::question::{Difficulty, Question, QuestionBank};
use chrono::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

pub const DEFAULT_TITLE: &str = "Web Development Assessment Test";

/// How many questions to draw per difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    pub easy: usize,
    pub moderate: usize,
    pub expert: usize,
}

impl Default for Distribution {
    fn default() -> Self {
        // 50% easy, 25% moderate, 25% expert
        Self {
            easy: 20,
            moderate: 10,
            expert: 10,
        }
    }
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.easy + self.moderate + self.expert
    }

    fn per_tier(&self) -> [(Difficulty, usize); 3] {
        [
            (Difficulty::Easy, self.easy),
            (Difficulty::Moderate, self.moderate),
            (Difficulty::Expert, self.expert),
        ]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("not enough {difficulty} questions in the bank: requested {requested}, available {available}")]
    InsufficientQuestions {
        difficulty: Difficulty,
        requested: usize,
        available: usize,
    },
}

/// One generated test. The question set is fixed for the lifetime of
/// the attempt; navigation and answers live in the session, not here.
#[derive(Debug, Clone)]
pub struct TestInstance {
    pub id: String,
    pub title: String,
    pub duration_secs: u32,
    pub questions: Vec<Question>,
    pub started_at: DateTime<Local>,
}

impl TestInstance {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn contains(&self, question_id: u32) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }
}

/// Draw a difficulty-stratified sample from the bank: shuffle each tier,
/// take the requested count, then shuffle the combined sequence so tiers
/// are interleaved. Fails if any tier cannot cover its quota; a short
/// test must never be started.
pub fn generate<R: Rng>(
    bank: &QuestionBank,
    distribution: &Distribution,
    duration_secs: u32,
    rng: &mut R,
) -> Result<TestInstance, GenerateError> {
    let mut picked: Vec<Question> = Vec::with_capacity(distribution.total());

    for (difficulty, requested) in distribution.per_tier() {
        let mut tier: Vec<Question> = bank.of_difficulty(difficulty).cloned().collect();
        if tier.len() < requested {
            return Err(GenerateError::InsufficientQuestions {
                difficulty,
                requested,
                available: tier.len(),
            });
        }
        tier.shuffle(rng);
        picked.extend(tier.into_iter().take(requested));
    }

    picked.shuffle(rng);
    debug_assert_eq!(picked.len(), distribution.total());

    let started_at = Local::now();
    Ok(TestInstance {
        id: format!("test_{}", started_at.timestamp_millis()),
        title: DEFAULT_TITLE.to_string(),
        duration_secs,
        questions: picked,
        started_at,
    })
}

/// Convenience constructor using the standard 40-question layout and a
/// non-seeded random source.
pub fn generate_default(bank: &QuestionBank) -> Result<TestInstance, GenerateError> {
    generate(
        bank,
        &Distribution::default(),
        crate::config::DEFAULT_DURATION_SECS,
        &mut rand::thread_rng(),
    )
}
