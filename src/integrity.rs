use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// A signal from whatever proctoring layer hosts the session. The
/// session only counts warnings; the variant exists for UI messaging
/// and audit trails, never for detection logic here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityEvent {
    FocusLost,
    TabHidden,
    CopyAttempt,
    DevToolsOpened,
    Custom(String),
}

impl fmt::Display for IntegrityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityEvent::FocusLost => write!(f, "window focus lost"),
            IntegrityEvent::TabHidden => write!(f, "tab hidden"),
            IntegrityEvent::CopyAttempt => write!(f, "copy attempt"),
            IntegrityEvent::DevToolsOpened => write!(f, "developer tools opened"),
            IntegrityEvent::Custom(reason) => write!(f, "{reason}"),
        }
    }
}

/// Source of integrity events polled by the driver between ticks.
/// Implementations decide what (if anything) counts as suspicious; the
/// engine places no constraints on detection.
pub trait IntegritySource {
    /// Next pending event, if any. Must not block.
    fn poll(&mut self) -> Option<IntegrityEvent>;
}

/// Monitor that never reports anything.
pub struct NullIntegritySource;

impl IntegritySource for NullIntegritySource {
    fn poll(&mut self) -> Option<IntegrityEvent> {
        None
    }
}

/// Channel-backed source for tests and embedding UIs: the hosting layer
/// keeps the sender and pushes events as it sees them.
pub struct QueuedIntegritySource {
    rx: Receiver<IntegrityEvent>,
}

impl QueuedIntegritySource {
    pub fn new() -> (Sender<IntegrityEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    pub fn from_receiver(rx: Receiver<IntegrityEvent>) -> Self {
        Self { rx }
    }
}

impl IntegritySource for QueuedIntegritySource {
    fn poll(&mut self) -> Option<IntegrityEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
