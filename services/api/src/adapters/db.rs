//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use praxis_core::domain::{
    Importance, Insight, NewInsight, NewPattern, NewThought, Pattern, PatternKind, ReviewUpdate,
    Thought, User, UserCredentials,
};
use praxis_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct PgAdapter {
    pool: PgPool,
}

impl PgAdapter {
    /// Creates a new `PgAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    id: Uuid,
    email: String,
    name: Option<String>,
    hashed_password: String,
}
impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            name: self.name,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct ThoughtRecord {
    id: Uuid,
    user_id: Uuid,
    content: String,
    processed_content: String,
    importance: String,
    tags: Vec<String>,
    review_date: Option<DateTime<Utc>>,
    embedding: Vec<f32>,
    is_archived: bool,
    is_reviewed: bool,
    created_at: DateTime<Utc>,
}
impl ThoughtRecord {
    fn to_domain(self) -> Thought {
        Thought {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            processed_content: self.processed_content,
            importance: Importance::from_label(&self.importance),
            tags: self.tags,
            review_date: self.review_date,
            embedding: self.embedding,
            is_archived: self.is_archived,
            is_reviewed: self.is_reviewed,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct PatternRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    kind: String,
    confidence: f64,
    suggested_action: Option<String>,
    related_thought_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
}
impl PatternRecord {
    fn to_domain(self) -> Pattern {
        Pattern {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            kind: PatternKind::from_label(&self.kind).unwrap_or(PatternKind::Connection),
            confidence: self.confidence,
            suggested_action: self.suggested_action,
            related_thought_ids: self.related_thought_ids,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct InsightRecord {
    id: Uuid,
    pattern_id: Uuid,
    content: String,
    kind: String,
    is_viewed: bool,
    created_at: DateTime<Utc>,
}
impl InsightRecord {
    fn to_domain(self) -> Insight {
        Insight {
            id: self.id,
            pattern_id: self.pattern_id,
            content: self.content,
            kind: PatternKind::from_label(&self.kind).unwrap_or(PatternKind::Connection),
            is_viewed: self.is_viewed,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for PgAdapter {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, name, hashed_password) VALUES ($1, $2, $3, $4)
             RETURNING id, email, name",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("User {} already exists", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT id, email, name FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("User {} not found", user_id))
                    }
                    _ => unexpected(e),
                })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT id, email, name, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought> {
        let record = sqlx::query_as::<_, ThoughtRecord>(
            "INSERT INTO thoughts (id, user_id, content, processed_content, importance, tags,
                                   review_date, embedding, is_archived, is_reviewed, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, now())
             RETURNING id, user_id, content, processed_content, importance, tags, review_date,
                       embedding, is_archived, is_reviewed, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(thought.user_id)
        .bind(&thought.content)
        .bind(&thought.processed_content)
        .bind(thought.importance.as_label())
        .bind(&thought.tags)
        .bind(thought.review_date)
        .bind(&thought.embedding)
        .bind(thought.is_archived)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn recent_thoughts(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Thought>> {
        let records = sqlx::query_as::<_, ThoughtRecord>(
            "SELECT id, user_id, content, processed_content, importance, tags, review_date,
                    embedding, is_archived, is_reviewed, created_at
             FROM thoughts WHERE user_id = $1
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn due_thoughts(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        limit: u32,
    ) -> PortResult<Vec<Thought>> {
        let records = sqlx::query_as::<_, ThoughtRecord>(
            "SELECT id, user_id, content, processed_content, importance, tags, review_date,
                    embedding, is_archived, is_reviewed, created_at
             FROM thoughts
             WHERE user_id = $1 AND is_archived = FALSE AND is_reviewed = FALSE
               AND review_date <= $2
             ORDER BY review_date ASC LIMIT $3",
        )
        .bind(user_id)
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_due_thoughts(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM thoughts
             WHERE user_id = $1 AND is_archived = FALSE AND is_reviewed = FALSE
               AND review_date <= $2",
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(count as u64)
    }

    async fn update_thought_review(
        &self,
        thought_id: Uuid,
        update: ReviewUpdate,
    ) -> PortResult<()> {
        // An update matching zero rows is a silent no-op.
        let query = match update {
            ReviewUpdate::Archive => {
                sqlx::query("UPDATE thoughts SET is_archived = TRUE, is_reviewed = TRUE WHERE id = $1")
                    .bind(thought_id)
            }
            ReviewUpdate::Reschedule(when) => {
                sqlx::query("UPDATE thoughts SET review_date = $2 WHERE id = $1")
                    .bind(thought_id)
                    .bind(when)
            }
        };
        query.execute(&self.pool).await.map_err(unexpected)?;
        Ok(())
    }

    async fn insert_pattern(&self, pattern: NewPattern) -> PortResult<Pattern> {
        let record = sqlx::query_as::<_, PatternRecord>(
            "INSERT INTO patterns (id, user_id, title, description, kind, confidence,
                                   suggested_action, related_thought_ids, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
             RETURNING id, user_id, title, description, kind, confidence, suggested_action,
                       related_thought_ids, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(pattern.user_id)
        .bind(&pattern.title)
        .bind(&pattern.description)
        .bind(pattern.kind.as_label())
        .bind(pattern.confidence)
        .bind(&pattern.suggested_action)
        .bind(&pattern.related_thought_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn insert_insight(&self, insight: NewInsight) -> PortResult<Insight> {
        let record = sqlx::query_as::<_, InsightRecord>(
            "INSERT INTO insights (id, pattern_id, content, kind, is_viewed, created_at)
             VALUES ($1, $2, $3, $4, FALSE, now())
             RETURNING id, pattern_id, content, kind, is_viewed, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(insight.pattern_id)
        .bind(&insight.content)
        .bind(insight.kind.as_label())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn recent_patterns(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Pattern>> {
        let records = sqlx::query_as::<_, PatternRecord>(
            "SELECT id, user_id, title, description, kind, confidence, suggested_action,
                    related_thought_ids, created_at
             FROM patterns WHERE user_id = $1
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn patterns_referencing(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
    ) -> PortResult<Vec<Pattern>> {
        let records = sqlx::query_as::<_, PatternRecord>(
            "SELECT id, user_id, title, description, kind, confidence, suggested_action,
                    related_thought_ids, created_at
             FROM patterns
             WHERE user_id = $1 AND $2 = ANY(related_thought_ids)
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(thought_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insights_for_pattern(&self, pattern_id: Uuid) -> PortResult<Vec<Insight>> {
        let records = sqlx::query_as::<_, InsightRecord>(
            "SELECT id, pattern_id, content, kind, is_viewed, created_at
             FROM insights WHERE pattern_id = $1
             ORDER BY created_at ASC",
        )
        .bind(pattern_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
