use crate::generator::TestInstance;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;

pub const PASS_THRESHOLD_PERCENT: u32 = 60;

/// Immutable snapshot produced exactly once per completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub percentage: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub passed: bool,
    pub elapsed_secs: u32,
    pub warning_count: u32,
    pub completed_at: DateTime<Local>,
}

/// Pure scoring function. The timestamp is an input rather than read
/// from a clock so identical inputs always yield identical outcomes.
pub fn score(
    test: &TestInstance,
    answers: &HashMap<u32, usize>,
    warning_count: u32,
    elapsed_secs: u32,
    completed_at: DateTime<Local>,
) -> Outcome {
    let total_questions = test.questions.len();
    let correct_count = test
        .questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
        .count();

    // Exact integer half-up rounding; a float path misrounds cases
    // like 23/40 where the quotient is not representable.
    let percentage = if total_questions == 0 {
        0
    } else {
        ((correct_count * 200 + total_questions) / (2 * total_questions)) as u32
    };

    Outcome {
        percentage,
        correct_count,
        total_questions,
        passed: percentage >= PASS_THRESHOLD_PERCENT,
        elapsed_secs,
        warning_count,
        completed_at,
    }
}
