// handlers/protected/questions/mod.rs - Question mutations

pub mod create;
pub mod delete;
pub mod update;
pub mod upvote;

pub use create::question_create;
pub use delete::question_delete;
pub use update::question_update;
pub use upvote::question_upvote;
