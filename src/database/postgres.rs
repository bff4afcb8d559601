use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::models::{NewQuestion, NewUser, Question, QuestionChanges, UpvoteOutcome, User};
use crate::database::store::{CategoryField, QueryPage, QuestionStore, StoreError, UserStore};
use crate::filter::{Filter, SqlParam};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS questions (
        id UUID PRIMARY KEY,
        question_text TEXT NOT NULL,
        company TEXT NOT NULL,
        topic TEXT NOT NULL,
        role TEXT NOT NULL,
        difficulty TEXT NOT NULL CHECK (difficulty IN ('Easy', 'Medium', 'Hard')),
        submitted_by UUID REFERENCES users(id) ON DELETE SET NULL,
        upvotes BIGINT NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
        upvoted_by UUID[] NOT NULL DEFAULT '{}',
        version BIGINT NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS questions_company_idx ON questions (company)",
    "CREATE INDEX IF NOT EXISTS questions_topic_idx ON questions (topic)",
    "CREATE INDEX IF NOT EXISTS questions_created_at_idx ON questions (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS questions_upvotes_idx ON questions (upvotes DESC)",
];

const QUESTION_COLUMNS: &str = "id, question_text, company, topic, role, difficulty, submitted_by, \
     upvotes, upvoted_by, version, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to database (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(StoreError::QueryError)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct QuestionRow {
    id: Uuid,
    question_text: String,
    company: String,
    topic: String,
    role: String,
    difficulty: String,
    submitted_by: Option<Uuid>,
    upvotes: i64,
    upvoted_by: Vec<Uuid>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = StoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        Ok(Question {
            id: row.id,
            question_text: row.question_text,
            company: row.company,
            topic: row.topic,
            role: row.role,
            difficulty: row.difficulty.parse().map_err(StoreError::QueryError)?,
            submitted_by: row.submitted_by,
            upvotes: row.upvotes,
            upvoted_by: row.upvoted_by.into_iter().collect::<BTreeSet<_>>(),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ToggledRow {
    #[sqlx(flatten)]
    question: QuestionRow,
    was_added: bool,
}

#[derive(FromRow)]
struct CountRow {
    count: i64,
}

fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.clone()),
            SqlParam::Timestamp(value) => query.bind(*value),
            SqlParam::Int(value) => query.bind(*value),
        };
    }
    query
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::from_new(user);
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError> {
        let question = Question::from_new(question);
        sqlx::query(
            "INSERT INTO questions (id, question_text, company, topic, role, difficulty, submitted_by, \
             upvotes, upvoted_by, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, '{}', 0, $8, $9)",
        )
        .bind(question.id)
        .bind(&question.question_text)
        .bind(&question.company)
        .bind(&question.topic)
        .bind(&question.role)
        .bind(question.difficulty.as_str())
        .bind(question.submitted_by)
        .bind(question.created_at)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(question)
    }

    async fn find_question_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        let query = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
        let row: Option<QuestionRow> = sqlx::query_as(&query).bind(id).fetch_optional(&self.pool).await?;
        row.map(Question::try_from).transpose()
    }

    async fn query_questions(&self, filter: &Filter) -> Result<QueryPage<Question>, StoreError> {
        let select = filter.to_sql("questions", QUESTION_COLUMNS);
        let rows: Vec<QuestionRow> = bind_params(sqlx::query_as(&select.query), &select.params)
            .fetch_all(&self.pool)
            .await?;

        let count = filter.to_count_sql("questions");
        let total: CountRow = bind_params(sqlx::query_as(&count.query), &count.params)
            .fetch_one(&self.pool)
            .await?;

        let items = rows.into_iter().map(Question::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(QueryPage { items, total: total.count.max(0) as u64 })
    }

    async fn update_question(&self, id: Uuid, changes: &QuestionChanges) -> Result<Option<Question>, StoreError> {
        let query = format!(
            "UPDATE questions SET \
               question_text = COALESCE($2, question_text), \
               topic = COALESCE($3, topic), \
               difficulty = COALESCE($4, difficulty), \
               version = version + 1, \
               updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            QUESTION_COLUMNS
        );
        let row: Option<QuestionRow> = sqlx::query_as(&query)
            .bind(id)
            .bind(changes.question_text.as_deref())
            .bind(changes.topic.as_deref())
            .bind(changes.difficulty.map(|d| d.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(Question::try_from).transpose()
    }

    async fn delete_question(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn distinct_values(&self, field: CategoryField) -> Result<Vec<String>, StoreError> {
        let query = format!(
            "SELECT DISTINCT \"{0}\" FROM questions ORDER BY \"{0}\"",
            field.column()
        );
        let rows: Vec<(String,)> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }

    async fn replace_if_version(&self, question: &Question, expected_version: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE questions SET question_text = $3, topic = $4, difficulty = $5, \
             upvotes = $6, upvoted_by = $7, version = $8, updated_at = $9 \
             WHERE id = $1 AND version = $2",
        )
        .bind(question.id)
        .bind(expected_version)
        .bind(&question.question_text)
        .bind(&question.topic)
        .bind(question.difficulty.as_str())
        .bind(question.upvotes)
        .bind(question.upvoted_by.iter().copied().collect::<Vec<Uuid>>())
        .bind(question.version)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Single-statement toggle; the row lock serializes concurrent voters
    async fn toggle_upvote(
        &self,
        id: Uuid,
        actor: Uuid,
        _max_attempts: u32,
    ) -> Result<Option<UpvoteOutcome>, StoreError> {
        let query = format!(
            "UPDATE questions q SET \
               upvoted_by = CASE WHEN $2 = ANY(q.upvoted_by) \
                 THEN array_remove(q.upvoted_by, $2) ELSE array_append(q.upvoted_by, $2) END, \
               upvotes = CASE WHEN $2 = ANY(q.upvoted_by) THEN q.upvotes - 1 ELSE q.upvotes + 1 END, \
               version = q.version + 1, \
               updated_at = NOW() \
             FROM (SELECT id, $2 = ANY(upvoted_by) AS had_vote FROM questions WHERE id = $1 FOR UPDATE) prev \
             WHERE q.id = prev.id \
             RETURNING {}, NOT prev.had_vote AS was_added",
            QUESTION_COLUMNS
                .split(", ")
                .map(|c| format!("q.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let row: Option<ToggledRow> = sqlx::query_as(&query)
            .bind(id)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(UpvoteOutcome {
                question: Question::try_from(row.question)?,
                was_added: row.was_added,
            })
        })
        .transpose()
    }
}
