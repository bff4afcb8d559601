use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Difficulty;

/// Interview question document.
///
/// `upvotes` always equals `upvoted_by.len()`; only [`Question::toggle_upvote`]
/// and the stores' atomic toggle touch either field. `version` increments on
/// every write and backs optimistic concurrency in stores that need it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub company: String,
    pub topic: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub submitted_by: Option<Uuid>,
    pub upvotes: i64,
    pub upvoted_by: BTreeSet<Uuid>,
    #[serde(skip)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub company: String,
    pub topic: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub submitted_by: Option<Uuid>,
}

/// Fields an owner or admin may change. Company, role, owner and upvote
/// state are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct QuestionChanges {
    pub question_text: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionChanges {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none() && self.topic.is_none() && self.difficulty.is_none()
    }
}

/// Result of a toggle: the persisted question and whether the vote was added
#[derive(Debug, Clone)]
pub struct UpvoteOutcome {
    pub question: Question,
    pub was_added: bool,
}

impl Question {
    pub fn from_new(new_question: NewQuestion) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            question_text: new_question.question_text,
            company: new_question.company,
            topic: new_question.topic,
            role: new_question.role,
            difficulty: new_question.difficulty,
            submitted_by: new_question.submitted_by,
            upvotes: 0,
            upvoted_by: BTreeSet::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip `actor`'s vote. Returns true when the vote was added.
    pub fn toggle_upvote(&mut self, actor: Uuid) -> bool {
        let was_added = if self.upvoted_by.remove(&actor) {
            self.upvotes -= 1;
            false
        } else {
            self.upvoted_by.insert(actor);
            self.upvotes += 1;
            true
        };
        self.touch();
        was_added
    }

    pub fn apply_changes(&mut self, changes: &QuestionChanges) {
        if let Some(text) = &changes.question_text {
            self.question_text = text.clone();
        }
        if let Some(topic) = &changes.topic {
            self.topic = topic.clone();
        }
        if let Some(difficulty) = changes.difficulty {
            self.difficulty = difficulty;
        }
        self.touch();
    }

    pub fn has_upvoted(&self, actor: Uuid) -> bool {
        self.upvoted_by.contains(&actor)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Submitter reference as returned to clients; name is filled in when the user is known
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmitterRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Client-facing question with the submitter populated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub question_text: String,
    pub company: String,
    pub topic: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub submitted_by: Option<SubmitterRef>,
    pub upvotes: i64,
    pub upvoted_by: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionView {
    pub fn new(question: Question, submitter_name: Option<String>) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            company: question.company,
            topic: question.topic,
            role: question.role,
            difficulty: question.difficulty,
            submitted_by: question.submitted_by.map(|id| SubmitterRef { id, name: submitter_name }),
            upvotes: question.upvotes,
            upvoted_by: question.upvoted_by,
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}
