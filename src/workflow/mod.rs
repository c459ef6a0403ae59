pub mod quiz_state;
pub mod transition;

pub use quiz_state::{Evaluation, OptionMark, QuizState, SessionState};
pub use transition::{transition, QuizEffect, QuizEvent, LOAD_FAILED_MESSAGE};
