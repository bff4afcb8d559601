use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::auth::can_mutate;
use crate::config::FilterConfig;
use crate::database::models::{NewQuestion, Question, QuestionChanges, QuestionView};
use crate::database::{CategoryField, QuestionStore, StoreError, UserStore};
use crate::filter::{Filter, FilterData, FilterError, SortOrder};
use crate::middleware::AuthUser;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("Question {0} not found")]
    NotFound(Uuid),

    #[error("User {actor} may not {action} question {question}")]
    Forbidden {
        actor: Uuid,
        question: Uuid,
        action: &'static str,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of the filtered, sorted listing
#[derive(Debug)]
pub struct QuestionPage {
    pub items: Vec<QuestionView>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

#[derive(Debug, Serialize)]
pub struct Categories {
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpvoteSummary {
    pub upvotes: i64,
    pub upvoted: bool,
}

/// Question lifecycle and queries
#[derive(Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionStore>,
    users: Arc<dyn UserStore>,
    filter_config: FilterConfig,
    upvote_max_attempts: u32,
}

impl QuestionService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        users: Arc<dyn UserStore>,
        filter_config: FilterConfig,
        upvote_max_attempts: u32,
    ) -> Self {
        Self {
            questions,
            users,
            filter_config,
            upvote_max_attempts,
        }
    }

    /// Store a new question owned by `actor`
    pub async fn create(&self, mut question: NewQuestion, actor: &AuthUser) -> Result<QuestionView, QuestionError> {
        question.submitted_by = Some(actor.id);
        let question = self.questions.insert_question(question).await?;
        info!("User {} created question {}", actor.id, question.id);
        Ok(QuestionView::new(question, Some(actor.name.clone())))
    }

    pub async fn list(&self, data: FilterData) -> Result<QuestionPage, QuestionError> {
        let mut filter = Filter::new();
        filter.assign(data, &self.filter_config)?;

        let result = self.questions.query_questions(&filter).await?;
        let pagination = filter.pagination().unwrap_or(crate::filter::Pagination {
            page: 1,
            limit: self.filter_config.default_limit,
        });

        Ok(QuestionPage {
            items: self.populate(result.items).await?,
            total: result.total,
            page: pagination.page,
            pages: pagination.page_count(result.total),
        })
    }

    /// Literal, case-insensitive match over text, company and topic; newest
    /// first, at most `max_limit` results
    pub async fn search(&self, term: &str) -> Result<Vec<QuestionView>, QuestionError> {
        let mut filter = Filter::new();
        filter
            .search(term)?
            .order(SortOrder::Latest)
            .paginate(1, self.filter_config.max_limit, &self.filter_config)?;
        let result = self.questions.query_questions(&filter).await?;
        self.populate(result.items).await
    }

    pub async fn get(&self, id: Uuid) -> Result<QuestionView, QuestionError> {
        let question = self.find(id).await?;
        let mut views = self.populate(vec![question]).await?;
        views.pop().ok_or(QuestionError::NotFound(id))
    }

    /// Owner/admin edit of text, topic and difficulty
    pub async fn update(
        &self,
        id: Uuid,
        changes: QuestionChanges,
        actor: &AuthUser,
    ) -> Result<QuestionView, QuestionError> {
        let question = self.find(id).await?;
        self.authorize(&question, actor, "update")?;

        if changes.is_empty() {
            return self.get(id).await;
        }

        let updated = self
            .questions
            .update_question(id, &changes)
            .await?
            .ok_or(QuestionError::NotFound(id))?;
        info!("User {} updated question {}", actor.id, id);

        let mut views = self.populate(vec![updated]).await?;
        views.pop().ok_or(QuestionError::NotFound(id))
    }

    pub async fn delete(&self, id: Uuid, actor: &AuthUser) -> Result<(), QuestionError> {
        let question = self.find(id).await?;
        self.authorize(&question, actor, "delete")?;

        if !self.questions.delete_question(id).await? {
            return Err(QuestionError::NotFound(id));
        }
        info!("User {} deleted question {}", actor.id, id);
        Ok(())
    }

    pub async fn toggle_upvote(&self, id: Uuid, actor: &AuthUser) -> Result<UpvoteSummary, QuestionError> {
        let outcome = self
            .questions
            .toggle_upvote(id, actor.id, self.upvote_max_attempts)
            .await?
            .ok_or(QuestionError::NotFound(id))?;

        Ok(UpvoteSummary {
            upvotes: outcome.question.upvotes,
            upvoted: outcome.was_added,
        })
    }

    pub async fn upvotes(&self, id: Uuid) -> Result<i64, QuestionError> {
        Ok(self.find(id).await?.upvotes)
    }

    pub async fn categories(&self) -> Result<Categories, QuestionError> {
        Ok(Categories {
            topics: self.questions.distinct_values(CategoryField::Topic).await?,
            companies: self.questions.distinct_values(CategoryField::Company).await?,
            roles: self.questions.distinct_values(CategoryField::Role).await?,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Question, QuestionError> {
        self.questions
            .find_question_by_id(id)
            .await?
            .ok_or(QuestionError::NotFound(id))
    }

    fn authorize(&self, question: &Question, actor: &AuthUser, action: &'static str) -> Result<(), QuestionError> {
        if can_mutate(question, actor) {
            return Ok(());
        }
        Err(QuestionError::Forbidden {
            actor: actor.id,
            question: question.id,
            action,
        })
    }

    /// Attach submitter names with one user lookup per batch
    async fn populate(&self, questions: Vec<Question>) -> Result<Vec<QuestionView>, QuestionError> {
        let submitters: Vec<Uuid> = questions
            .iter()
            .filter_map(|q| q.submitted_by)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let names: HashMap<Uuid, String> = if submitters.is_empty() {
            HashMap::new()
        } else {
            self.users.find_user_names(&submitters).await?
        };

        Ok(questions
            .into_iter()
            .map(|question| {
                let name = question.submitted_by.and_then(|id| names.get(&id).cloned());
                QuestionView::new(question, name)
            })
            .collect())
    }
}
