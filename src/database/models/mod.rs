pub mod question;
pub mod user;

pub use question::{NewQuestion, Question, QuestionChanges, QuestionView, SubmitterRef, UpvoteOutcome};
pub use user::{normalize_email, NewUser, PublicUser, User};
