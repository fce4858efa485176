use crate::generator::TestInstance;
use crate::question::Question;
use crate::score::{score, Outcome};
use chrono::Local;
use std::collections::HashMap;

/// Cumulative integrity warnings that force auto-submission.
pub const WARNING_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Completed,
}

/// Callbacks for collaborators that render countdowns, warning banners,
/// or persist the final outcome. All methods default to no-ops.
pub trait SessionObserver {
    fn on_tick(&mut self, _remaining_secs: u32) {}
    fn on_warning(&mut self, _count: u32) {}
    fn on_completed(&mut self, _outcome: &Outcome) {}
}

/// State machine for one test attempt. Owns all mutable session state;
/// every change goes through a method here. Once the phase reaches
/// Completed every mutating call becomes a no-op, and the outcome is
/// computed exactly once no matter which trigger finishes the session
/// (time expiry, warning limit, or manual submit).
pub struct Session {
    phase: Phase,
    test: Option<TestInstance>,
    current_index: usize,
    answers: HashMap<u32, usize>,
    remaining_secs: u32,
    warning_count: u32,
    outcome: Option<Outcome>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::NotStarted,
            test: None,
            current_index: 0,
            answers: HashMap::new(),
            remaining_secs: 0,
            warning_count: 0,
            outcome: None,
            observers: Vec::new(),
        }
    }

    pub fn observe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Begin the attempt. Only valid from NotStarted; a running or
    /// completed session ignores the call (use `reset` first).
    pub fn start(&mut self, test: TestInstance) {
        if self.phase != Phase::NotStarted {
            return;
        }
        self.remaining_secs = test.duration_secs;
        self.current_index = 0;
        self.answers.clear();
        self.warning_count = 0;
        self.outcome = None;
        self.test = Some(test);
        self.phase = Phase::Running;
    }

    /// Record (or overwrite) the selected option for a question.
    /// Unknown question ids are ignored so answer keys stay a subset of
    /// the test's ids. The option index is stored as given; an
    /// out-of-range value simply never matches and scores as incorrect.
    pub fn answer(&mut self, question_id: u32, option_index: usize) {
        if self.phase != Phase::Running {
            return;
        }
        if !self.test.as_ref().is_some_and(|t| t.contains(question_id)) {
            return;
        }
        self.answers.insert(question_id, option_index);
    }

    /// Merge a previously autosaved answer map back in, e.g. when
    /// resuming after a reload. Same key filtering as `answer`.
    pub fn restore_answers(&mut self, saved: &HashMap<u32, usize>) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(test) = self.test.as_ref() else {
            return;
        };
        for (&id, &option) in saved {
            if test.contains(id) {
                self.answers.insert(id, option);
            }
        }
    }

    /// Jump to a question position, clamped to the valid range.
    pub fn go_to(&mut self, index: isize) {
        if self.phase != Phase::Running {
            return;
        }
        let len = self.question_count();
        if len == 0 {
            return;
        }
        self.current_index = index.clamp(0, len as isize - 1) as usize;
    }

    /// Advance to the next question, saturating at the last one.
    pub fn next(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let len = self.question_count();
        if len == 0 {
            return;
        }
        self.current_index = (self.current_index + 1).min(len - 1);
    }

    /// Go back one question, saturating at the first.
    pub fn prev(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Advance the countdown. Reaching zero finalizes the session.
    pub fn tick(&mut self, delta_secs: u32) {
        if self.phase != Phase::Running {
            return;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(delta_secs);
        let remaining = self.remaining_secs;
        for obs in &mut self.observers {
            obs.on_tick(remaining);
        }
        if remaining == 0 {
            self.finalize();
        }
    }

    /// Count one integrity warning. Reaching the limit finalizes the
    /// session regardless of remaining time.
    pub fn warn(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.warning_count += 1;
        let count = self.warning_count;
        for obs in &mut self.observers {
            obs.on_warning(count);
        }
        if count >= WARNING_LIMIT {
            self.finalize();
        }
    }

    /// Manual early submission.
    pub fn submit(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.finalize();
    }

    /// Return to NotStarted, dropping the test, answers and outcome.
    /// Registered observers are kept.
    pub fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.test = None;
        self.current_index = 0;
        self.answers.clear();
        self.remaining_secs = 0;
        self.warning_count = 0;
        self.outcome = None;
    }

    // The single completion path. All three triggers funnel through
    // here, so the outcome is computed at most once per attempt.
    fn finalize(&mut self) {
        let Some(test) = self.test.as_ref() else {
            return;
        };
        let elapsed = test.duration_secs - self.remaining_secs;
        let outcome = score(
            test,
            &self.answers,
            self.warning_count,
            elapsed,
            Local::now(),
        );
        self.phase = Phase::Completed;
        for obs in &mut self.observers {
            obs.on_completed(&outcome);
        }
        self.outcome = Some(outcome);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn test(&self) -> Option<&TestInstance> {
        self.test.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.test.as_ref()?.questions.get(self.current_index)
    }

    pub fn answers(&self) -> &HashMap<u32, usize> {
        &self.answers
    }

    pub fn answer_for(&self, question_id: u32) -> Option<usize> {
        self.answers.get(&question_id).copied()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    /// The final outcome; None until the session completes.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    fn question_count(&self) -> usize {
        self.test.as_ref().map_or(0, TestInstance::len)
    }
}
