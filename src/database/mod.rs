pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{CategoryField, QueryPage, QuestionStore, StoreError, UserStore};
