pub mod auth_service;
pub mod question_service;

pub use auth_service::{AuthService, AuthSession, Registration};
pub use question_service::{Categories, QuestionError, QuestionPage, QuestionService, UpvoteSummary};
