//! crates/praxis_core/src/recall.rs
//!
//! The recall queue: surfacing due thoughts for review and applying the
//! user's keep/done/snooze decisions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Thought;
use crate::patterns::{self, EnrichedPattern};
use crate::ports::{DatabaseService, PortResult};
use crate::schedule::{self, RecallAction};

/// How many due thoughts one recall session serves.
pub const RECALL_BATCH: u32 = 3;

/// A due thought together with the patterns that reference it, each with
/// its insights, ready for display in a recall session.
#[derive(Debug, Clone)]
pub struct EnrichedThought {
    pub thought: Thought,
    pub patterns: Vec<EnrichedPattern>,
}

/// The due thoughts for one recall session, most overdue first, enriched
/// with their referencing patterns and insights.
pub async fn due_for_recall(
    db: &dyn DatabaseService,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> PortResult<Vec<EnrichedThought>> {
    let thoughts = db.due_thoughts(user_id, now, RECALL_BATCH).await?;

    let mut enriched = Vec::with_capacity(thoughts.len());
    for thought in thoughts {
        let referencing = db.patterns_referencing(user_id, thought.id).await?;
        let patterns = patterns::attach_insights(db, referencing).await?;
        enriched.push(EnrichedThought { thought, patterns });
    }
    Ok(enriched)
}

/// How many thoughts are currently due, for badge counts.
pub async fn pending_count(
    db: &dyn DatabaseService,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> PortResult<u64> {
    db.count_due_thoughts(user_id, now).await
}

/// Applies one recall decision to a thought.
///
/// Writes unconditionally: the current archival/review state is not read
/// first, so repeating an action lands on the same terminal state, and a
/// nonexistent id is a silent no-op. The target is addressed by id alone,
/// without checking which user owns it.
pub async fn apply_recall_action(
    db: &dyn DatabaseService,
    thought_id: Uuid,
    action: RecallAction,
    now: DateTime<Utc>,
) -> PortResult<()> {
    db.update_thought_review(thought_id, schedule::update_for(action, now))
        .await
}
