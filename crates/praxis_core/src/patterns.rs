//! crates/praxis_core/src/patterns.rs
//!
//! Read-side aggregation of patterns and their insights.

use uuid::Uuid;

use crate::domain::{Insight, Pattern};
use crate::ports::{DatabaseService, PortResult};

/// How many recent patterns the dashboard shows.
pub const RECENT_PATTERN_LIMIT: u32 = 3;

/// A pattern together with its dependent insights, ready for display.
#[derive(Debug, Clone)]
pub struct EnrichedPattern {
    pub pattern: Pattern,
    pub insights: Vec<Insight>,
}

/// The caller's most recently detected patterns, newest first, each with
/// its insights attached.
pub async fn recent_patterns(
    db: &dyn DatabaseService,
    user_id: Uuid,
) -> PortResult<Vec<EnrichedPattern>> {
    let patterns = db.recent_patterns(user_id, RECENT_PATTERN_LIMIT).await?;
    attach_insights(db, patterns).await
}

/// Fetches each pattern's insights one by one. A fan-out rather than a
/// batch join; callers hand in at most a handful of patterns.
pub(crate) async fn attach_insights(
    db: &dyn DatabaseService,
    patterns: Vec<Pattern>,
) -> PortResult<Vec<EnrichedPattern>> {
    let mut enriched = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let insights = db.insights_for_pattern(pattern.id).await?;
        enriched.push(EnrichedPattern { pattern, insights });
    }
    Ok(enriched)
}
