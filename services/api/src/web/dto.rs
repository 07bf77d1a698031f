//! services/api/src/web/dto.rs
//!
//! The serialization boundary of the core. Entities cross the process
//! boundary as these view structs, with every store-native identity
//! replaced by its plain string form - recursively, through nested
//! patterns and insights. Internal code never deals with this concern.

use chrono::{DateTime, Utc};
use praxis_core::domain::{Insight, Pattern, Thought};
use praxis_core::patterns::EnrichedPattern;
use praxis_core::recall::EnrichedThought;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A thought as served to the UI, optionally carrying the patterns that
/// reference it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtView {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub processed_content: String,
    pub importance: String,
    pub tags: Vec<String>,
    pub review_date: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub is_reviewed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub patterns: Vec<PatternView>,
}

/// A pattern as served to the UI, carrying its insights.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternView {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence: f64,
    pub suggested_action: Option<String>,
    pub related_thought_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub insights: Vec<InsightView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightView {
    pub id: String,
    pub pattern_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_viewed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Thought> for ThoughtView {
    fn from(thought: Thought) -> Self {
        Self {
            id: thought.id.to_string(),
            user_id: thought.user_id.to_string(),
            content: thought.content,
            processed_content: thought.processed_content,
            importance: thought.importance.as_label().to_string(),
            tags: thought.tags,
            review_date: thought.review_date,
            is_archived: thought.is_archived,
            is_reviewed: thought.is_reviewed,
            created_at: thought.created_at,
            patterns: Vec::new(),
        }
    }
}

impl From<EnrichedThought> for ThoughtView {
    fn from(item: EnrichedThought) -> Self {
        let mut view = Self::from(item.thought);
        view.patterns = item.patterns.into_iter().map(PatternView::from).collect();
        view
    }
}

impl From<Pattern> for PatternView {
    fn from(pattern: Pattern) -> Self {
        Self {
            id: pattern.id.to_string(),
            user_id: pattern.user_id.to_string(),
            title: pattern.title,
            description: pattern.description,
            kind: pattern.kind.as_label().to_string(),
            confidence: pattern.confidence,
            suggested_action: pattern.suggested_action,
            related_thought_ids: pattern
                .related_thought_ids
                .iter()
                .map(|id| id.to_string())
                .collect(),
            created_at: pattern.created_at,
            insights: Vec::new(),
        }
    }
}

impl From<EnrichedPattern> for PatternView {
    fn from(item: EnrichedPattern) -> Self {
        let mut view = Self::from(item.pattern);
        view.insights = item.insights.into_iter().map(InsightView::from).collect();
        view
    }
}

impl From<Insight> for InsightView {
    fn from(insight: Insight) -> Self {
        Self {
            id: insight.id.to_string(),
            pattern_id: insight.pattern_id.to_string(),
            content: insight.content,
            kind: insight.kind.as_label().to_string(),
            is_viewed: insight.is_viewed,
            created_at: insight.created_at,
        }
    }
}
