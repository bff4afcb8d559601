// handlers/public/questions/mod.rs - Read-only question endpoints

pub mod list;
pub mod search;
pub mod show;
pub mod upvotes;

pub use list::questions_list;
pub use search::questions_search;
pub use show::question_show;
pub use upvotes::question_upvotes;
