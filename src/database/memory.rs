use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{NewQuestion, NewUser, Question, QuestionChanges, User};
use crate::database::store::{CategoryField, QueryPage, QuestionStore, StoreError, UserStore};
use crate::filter::filter_order::FilterOrder;
use crate::filter::Filter;

/// Process-local store for development and tests.
///
/// Upvotes go through the trait's optimistic toggle: reads and conditional
/// writes take the lock separately, like a document store without
/// server-side update operators.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    questions: RwLock<HashMap<Uuid, Question>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        let user = User::from_new(user);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (*id, u.name.clone())))
            .collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError> {
        let question = Question::from_new(question);
        self.questions.write().await.insert(question.id, question.clone());
        Ok(question)
    }

    async fn find_question_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        Ok(self.questions.read().await.get(&id).cloned())
    }

    async fn query_questions(&self, filter: &Filter) -> Result<QueryPage<Question>, StoreError> {
        let questions = self.questions.read().await;
        let mut matched: Vec<Question> = questions.values().filter(|q| filter.matches(q)).cloned().collect();
        drop(questions);

        let order = filter.sort_order();
        matched.sort_by(|a, b| FilterOrder::compare(order, a, b));
        let total = matched.len() as u64;

        let items = match filter.pagination() {
            Some(page) => matched
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit as usize)
                .collect(),
            None => matched,
        };
        Ok(QueryPage { items, total })
    }

    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> Result<Option<Question>, StoreError> {
        let mut questions = self.questions.write().await;
        Ok(questions.get_mut(&id).map(|question| {
            question.apply_changes(changes);
            question.clone()
        }))
    }

    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.questions.write().await.remove(&id).is_some())
    }

    async fn distinct_values(&self, field: CategoryField) -> Result<Vec<String>, StoreError> {
        let questions = self.questions.read().await;
        let values: BTreeSet<String> = questions.values().map(|q| field.value_of(q).to_string()).collect();
        Ok(values.into_iter().collect())
    }

    async fn replace_if_version(&self, question: &Question, expected_version: i64) -> Result<bool, StoreError> {
        let mut questions = self.questions.write().await;
        match questions.get_mut(&question.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = question.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
