use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{NewQuestion, NewUser, Question, QuestionChanges, UpvoteOutcome, User};
use crate::filter::Filter;

/// Errors from store adapters
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (user email) already exists
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Optimistic write lost every attempt in its retry budget
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Backend did not answer in time or could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) {
            return StoreError::Unavailable(err.to_string());
        }
        // 23505 = unique_violation
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::Duplicate(db_err.message().to_string());
            }
        }
        StoreError::Sqlx(err)
    }
}

/// One page of a filtered query plus the size of the whole filtered set
#[derive(Debug, Clone)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Distinct-value columns exposed as categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Topic,
    Company,
    Role,
}

impl CategoryField {
    pub fn column(&self) -> &'static str {
        match self {
            CategoryField::Topic => "topic",
            CategoryField::Company => "company",
            CategoryField::Role => "role",
        }
    }

    pub fn value_of<'a>(&self, question: &'a Question) -> &'a str {
        match self {
            CategoryField::Topic => &question.topic,
            CategoryField::Company => &question.company,
            CategoryField::Role => &question.role,
        }
    }
}

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with [`StoreError::Duplicate`] if the email is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Display names for the given ids; unknown ids are absent from the map
    async fn find_user_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Question store
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError>;

    async fn find_question_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError>;

    async fn query_questions(&self, filter: &Filter) -> Result<QueryPage<Question>, StoreError>;

    /// Apply owner-editable changes; `None` when the question does not exist
    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> Result<Option<Question>, StoreError>;

    /// Returns false when there was nothing to delete
    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Sorted distinct values of one column
    async fn distinct_values(&self, field: CategoryField) -> Result<Vec<String>, StoreError>;

    /// Conditional write: persist `question` only if the stored version is
    /// still `expected_version`. Returns false on a version mismatch or when
    /// the question has disappeared.
    async fn replace_if_version(&self, question: &Question, expected_version: i64) -> Result<bool, StoreError>;

    /// Flip `actor`'s upvote as one unit. `None` when the question does not exist.
    ///
    /// The default runs the toggle under optimistic concurrency: read,
    /// recompute, conditional write, retry. Stores that can express the
    /// toggle as a single atomic update should override this.
    async fn toggle_upvote(
        &self,
        id: Uuid,
        actor: Uuid,
        max_attempts: u32,
    ) -> Result<Option<UpvoteOutcome>, StoreError> {
        for attempt in 1..=max_attempts.max(1) {
            let Some(mut question) = self.find_question_by_id(id).await? else {
                return Ok(None);
            };
            let expected_version = question.version;
            let was_added = question.toggle_upvote(actor);

            if self.replace_if_version(&question, expected_version).await? {
                return Ok(Some(UpvoteOutcome { question, was_added }));
            }
            tracing::debug!(
                "Upvote write on question {} lost version race (attempt {}/{})",
                id,
                attempt,
                max_attempts
            );
        }

        tracing::warn!("Upvote on question {} exhausted {} attempts", id, max_attempts);
        Err(StoreError::Conflict(format!(
            "question {} changed concurrently {} times",
            id, max_attempts
        )))
    }
}
