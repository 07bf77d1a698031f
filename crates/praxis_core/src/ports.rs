//! crates/praxis_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Classification, DetectedPattern, HistoryEntry, Insight, NewInsight, NewPattern, NewThought,
    Pattern, ReviewUpdate, Thought, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The outcome of a language-model call that is allowed to fail without
/// failing its caller. `Degraded` carries no value, so a call site has to
/// decide on a fallback explicitly rather than mistaking a failed call for
/// an empty-but-successful one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOutcome<T> {
    Ready(T),
    Degraded,
}

impl<T> AiOutcome<T> {
    /// Returns the value, or `fallback` when the call degraded.
    pub fn ready_or(self, fallback: T) -> T {
        match self {
            AiOutcome::Ready(value) => value,
            AiOutcome::Degraded => fallback,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AiOutcome::Degraded)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Thoughts ---
    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought>;

    /// The caller's most recently created thoughts, newest first, across
    /// all importances and archival states.
    async fn recent_thoughts(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Thought>>;

    /// Thoughts eligible for recall at `now`: not archived, not reviewed,
    /// review date lapsed. Most overdue first.
    async fn due_thoughts(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        limit: u32,
    ) -> PortResult<Vec<Thought>>;

    /// Same filter as `due_thoughts`, count only, unbounded.
    async fn count_due_thoughts(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64>;

    /// Applies a recall mutation. Updating a nonexistent thought is a
    /// silent no-op, matching a zero-document update.
    async fn update_thought_review(
        &self,
        thought_id: Uuid,
        update: ReviewUpdate,
    ) -> PortResult<()>;

    // --- Patterns & Insights ---
    async fn insert_pattern(&self, pattern: NewPattern) -> PortResult<Pattern>;

    async fn insert_insight(&self, insight: NewInsight) -> PortResult<Insight>;

    async fn recent_patterns(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Pattern>>;

    /// Patterns whose related-thought list references the given thought.
    async fn patterns_referencing(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
    ) -> PortResult<Vec<Pattern>>;

    async fn insights_for_pattern(&self, pattern_id: Uuid) -> PortResult<Vec<Insight>>;
}

#[async_trait]
pub trait ClassificationService: Send + Sync {
    /// Normalizes a raw mind dump into a short form with a suggested
    /// importance and tags. Read-only; safe to call repeatedly.
    async fn classify(&self, content: &str) -> AiOutcome<Classification>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Produces an embedding vector for the given text.
    async fn embed(&self, content: &str) -> AiOutcome<Vec<f32>>;
}

#[async_trait]
pub trait PatternDetectionService: Send + Sync {
    /// Analyzes a new thought against the caller's recent history and
    /// reports recurring themes, contradictions, and connections.
    /// An empty history is valid input.
    async fn detect_patterns(
        &self,
        content: &str,
        history: &[HistoryEntry],
    ) -> AiOutcome<Vec<DetectedPattern>>;
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribes a slice of audio data into text.
    async fn transcribe(&self, audio_data: &[u8]) -> PortResult<String>;
}
