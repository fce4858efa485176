// Library surface for the assessment engine; the binary in main.rs is
// a thin terminal front end over these modules.
pub mod config;
pub mod driver;
pub mod generator;
pub mod history;
pub mod integrity;
pub mod question;
pub mod score;
pub mod session;
pub mod util;

pub use generator::{generate, generate_default, Distribution, GenerateError, TestInstance};
pub use question::{Difficulty, Question, QuestionBank};
pub use score::{score, Outcome, PASS_THRESHOLD_PERCENT};
pub use session::{Phase, Session, SessionObserver, WARNING_LIMIT};
