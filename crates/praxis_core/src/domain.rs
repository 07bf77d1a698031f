//! crates/praxis_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The user-chosen urgency label attached to a thought at capture time.
/// It deterministically sets the initial review date (see `schedule`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Today,
    Week,
    Later,
    NotImportant,
}

impl Importance {
    /// Parses the wire/storage label. Unrecognized labels fall back to
    /// `Today`, which schedules an immediate review.
    pub fn from_label(label: &str) -> Self {
        match label {
            "TODAY" => Importance::Today,
            "WEEK" => Importance::Week,
            "LATER" => Importance::Later,
            "NOT_IMPORTANT" => Importance::NotImportant,
            _ => Importance::Today,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Importance::Today => "TODAY",
            Importance::Week => "WEEK",
            Importance::Later => "LATER",
            Importance::NotImportant => "NOT_IMPORTANT",
        }
    }
}

/// The kind of relationship a detected pattern describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Recurrence,
    Contradiction,
    Connection,
}

impl PatternKind {
    /// Parses the wire/storage label. Returns `None` for labels the
    /// analyzer was never asked to produce.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "RECURRENCE" => Some(PatternKind::Recurrence),
            "CONTRADICTION" => Some(PatternKind::Contradiction),
            "CONNECTION" => Some(PatternKind::Connection),
            _ => None,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            PatternKind::Recurrence => "RECURRENCE",
            PatternKind::Contradiction => "CONTRADICTION",
            PatternKind::Connection => "CONNECTION",
        }
    }
}

/// One captured idea, the root entity of the system.
///
/// `content` and `created_at` are immutable after creation; only the
/// review-related fields (`review_date`, `is_archived`, `is_reviewed`)
/// change afterwards, and only through the recall scheduler.
#[derive(Debug, Clone)]
pub struct Thought {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// LLM-normalized short form; equals `content` when classification
    /// was unavailable at capture time.
    pub processed_content: String,
    pub importance: Importance,
    pub tags: Vec<String>,
    /// `None` means the thought never surfaces in recall.
    pub review_date: Option<DateTime<Utc>>,
    /// Stored at capture time, empty when embedding was unavailable.
    /// Nothing reads it back yet.
    pub embedding: Vec<f32>,
    pub is_archived: bool,
    pub is_reviewed: bool,
    pub created_at: DateTime<Utc>,
}

/// The record handed to the store when persisting a new thought.
/// Identity and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewThought {
    pub user_id: Uuid,
    pub content: String,
    pub processed_content: String,
    pub importance: Importance,
    pub tags: Vec<String>,
    pub review_date: Option<DateTime<Utc>>,
    pub embedding: Vec<f32>,
    pub is_archived: bool,
}

/// A detected relationship among a new thought and recent history,
/// owned by a user. Created only as a side effect of thought intake;
/// never updated or deleted afterwards.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub suggested_action: Option<String>,
    /// The triggering thought first, then the most recent prior thoughts,
    /// order preserved.
    pub related_thought_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPattern {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub suggested_action: Option<String>,
    pub related_thought_ids: Vec<Uuid>,
}

/// A display-oriented projection of one pattern's description, decoupled
/// so its viewed state can be tracked independently of the pattern.
#[derive(Debug, Clone)]
pub struct Insight {
    pub id: Uuid,
    pub pattern_id: Uuid,
    pub content: String,
    pub kind: PatternKind,
    /// No write path sets this true yet.
    pub is_viewed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInsight {
    pub pattern_id: Uuid,
    pub content: String,
    pub kind: PatternKind,
}

// Represents a user - used throughout the app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub hashed_password: String,
}

/// What the capture UI receives back from a classification preview.
#[derive(Debug, Clone)]
pub struct Classification {
    pub processed_content: String,
    pub suggested_importance: Importance,
    pub tags: Vec<String>,
}

/// One pattern as reported by the analyzer, before persistence.
#[derive(Debug, Clone)]
pub struct DetectedPattern {
    pub title: String,
    pub description: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub suggested_action: Option<String>,
}

/// The reduced view of a prior thought handed to the pattern analyzer.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub content: String,
    pub date: DateTime<Utc>,
}

/// The caller's input when submitting a thought.
#[derive(Debug, Clone)]
pub struct ThoughtDraft {
    pub content: String,
    pub importance: Importance,
    /// Preview output the user accepted, if any.
    pub processed_content: Option<String>,
    pub tags: Vec<String>,
}

/// The single mutation the recall scheduler applies to a thought.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewUpdate {
    /// Terminal: the thought leaves the queue permanently.
    Archive,
    /// Push the review date into the future; the thought stays eligible
    /// for recall once the new date lapses.
    Reschedule(DateTime<Utc>),
}
