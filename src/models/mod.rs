pub mod identity;
pub mod question;

pub use identity::{AccessToken, AuthMode, AuthResponse, Credentials, Identity, UserProfile};
pub use question::{AnswerSubmission, Progress, Question, QuestionId, SubmitReceipt};
