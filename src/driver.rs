use crate::integrity::IntegritySource;
use crate::session::{Phase, Session};
use std::collections::HashMap;
use std::time::Duration;

/// Ticks between autosave callbacks at the one-second tick rate.
pub const AUTOSAVE_EVERY_TICKS: u32 = 10;

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Receives periodic answer-map snapshots so partial progress can be
/// persisted externally without blocking the session.
pub trait AutosaveSink {
    fn save(&mut self, answers: &HashMap<u32, usize>);
}

/// Sink that discards snapshots.
pub struct NoAutosave;

impl AutosaveSink for NoAutosave {
    fn save(&mut self, _answers: &HashMap<u32, usize>) {}
}

/// Drives a running session: one `tick(1)` per interval, integrity
/// events drained into `warn()`, autosave on a coarser cadence. The
/// driver watches the session's phase rather than keeping its own idea
/// of liveness, so it stops on its own once the session completes; a
/// cancelled driver never touches the session again.
pub struct SessionDriver<T: Ticker> {
    ticker: T,
    autosave_every: u32,
    ticks_since_save: u32,
    cancelled: bool,
}

impl<T: Ticker> SessionDriver<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            autosave_every: AUTOSAVE_EVERY_TICKS,
            ticks_since_save: 0,
            cancelled: false,
        }
    }

    pub fn with_autosave_every(mut self, ticks: u32) -> Self {
        self.autosave_every = ticks.max(1);
        self
    }

    /// Explicit teardown, e.g. the candidate navigated away.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Waits one interval, then advances the session by one second.
    /// Returns false once the session is no longer running or the
    /// driver was cancelled, so callers can drop their loop.
    pub fn step<I, S>(&mut self, session: &mut Session, integrity: &mut I, autosave: &mut S) -> bool
    where
        I: IntegritySource,
        S: AutosaveSink,
    {
        if self.cancelled || session.phase() != Phase::Running {
            return false;
        }

        std::thread::sleep(self.ticker.interval());

        while let Some(_event) = integrity.poll() {
            session.warn();
            if session.phase() != Phase::Running {
                return false;
            }
        }

        session.tick(1);
        if session.phase() != Phase::Running {
            return false;
        }

        self.ticks_since_save += 1;
        if self.ticks_since_save >= self.autosave_every {
            self.ticks_since_save = 0;
            autosave.save(session.answers());
        }

        true
    }

    /// Step until the session completes or the driver is cancelled.
    pub fn run<I, S>(&mut self, session: &mut Session, integrity: &mut I, autosave: &mut S)
    where
        I: IntegritySource,
        S: AutosaveSink,
    {
        while self.step(session, integrity, autosave) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TestInstance;
    use crate::integrity::{IntegrityEvent, NullIntegritySource, QueuedIntegritySource};
    use crate::question::{Difficulty, Question};
    use chrono::Local;

    fn sample_test(num_questions: usize, duration_secs: u32) -> TestInstance {
        let questions = (0..num_questions as u32)
            .map(|id| Question {
                id,
                prompt: format!("question {id}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_option: 0,
                difficulty: Difficulty::Easy,
                category: "misc".into(),
            })
            .collect();

        TestInstance {
            id: "test_0".into(),
            title: "sample".into(),
            duration_secs,
            questions,
            started_at: Local::now(),
        }
    }

    fn fast_driver() -> SessionDriver<FixedTicker> {
        SessionDriver::new(FixedTicker::new(Duration::ZERO))
    }

    struct CountingSink {
        saves: Vec<usize>,
    }

    impl AutosaveSink for CountingSink {
        fn save(&mut self, answers: &HashMap<u32, usize>) {
            self.saves.push(answers.len());
        }
    }

    #[test]
    fn step_advances_one_second() {
        let mut session = Session::new();
        session.start(sample_test(4, 60));
        let mut driver = fast_driver();

        let alive = driver.step(&mut session, &mut NullIntegritySource, &mut NoAutosave);

        assert!(alive);
        assert_eq!(session.remaining_secs(), 59);
    }

    #[test]
    fn run_drives_session_to_expiry() {
        let mut session = Session::new();
        session.start(sample_test(4, 5));
        let mut driver = fast_driver();

        driver.run(&mut session, &mut NullIntegritySource, &mut NoAutosave);

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.outcome().unwrap().elapsed_secs, 5);
    }

    #[test]
    fn step_is_noop_on_completed_session() {
        let mut session = Session::new();
        session.start(sample_test(4, 5));
        session.submit();
        let mut driver = fast_driver();

        let alive = driver.step(&mut session, &mut NullIntegritySource, &mut NoAutosave);

        assert!(!alive);
        assert_eq!(session.remaining_secs(), 5);
    }

    #[test]
    fn cancelled_driver_never_ticks() {
        let mut session = Session::new();
        session.start(sample_test(4, 60));
        let mut driver = fast_driver();
        driver.cancel();

        let alive = driver.step(&mut session, &mut NullIntegritySource, &mut NoAutosave);

        assert!(!alive);
        assert!(driver.is_cancelled());
        assert_eq!(session.remaining_secs(), 60);
        assert_eq!(session.phase(), Phase::Running);
    }

    #[test]
    fn autosave_fires_on_cadence() {
        let mut session = Session::new();
        session.start(sample_test(4, 60));
        session.answer(0, 1);
        session.answer(1, 2);
        let mut driver = fast_driver().with_autosave_every(2);
        let mut sink = CountingSink { saves: vec![] };

        for _ in 0..5 {
            driver.step(&mut session, &mut NullIntegritySource, &mut sink);
        }

        // saves after ticks 2 and 4
        assert_eq!(sink.saves, vec![2, 2]);
    }

    #[test]
    fn integrity_events_raise_warnings() {
        let mut session = Session::new();
        session.start(sample_test(4, 60));
        let (tx, mut source) = QueuedIntegritySource::new();
        tx.send(IntegrityEvent::FocusLost).unwrap();
        tx.send(IntegrityEvent::TabHidden).unwrap();
        let mut driver = fast_driver();

        driver.step(&mut session, &mut source, &mut NoAutosave);

        assert_eq!(session.warning_count(), 2);
        assert_eq!(session.phase(), Phase::Running);
    }

    #[test]
    fn warning_limit_stops_the_driver() {
        let mut session = Session::new();
        session.start(sample_test(4, 60));
        let (tx, mut source) = QueuedIntegritySource::new();
        for _ in 0..3 {
            tx.send(IntegrityEvent::CopyAttempt).unwrap();
        }
        let mut driver = fast_driver();

        let alive = driver.step(&mut session, &mut source, &mut NoAutosave);

        assert!(!alive);
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.outcome().unwrap().warning_count, 3);
        // the terminating step never issued its tick
        assert_eq!(session.remaining_secs(), 60);
    }
}
