//! crates/praxis_core/src/intake.rs
//!
//! The thought intake pipeline: takes one captured thought, schedules its
//! review, runs the language-model enrichment steps, and persists the
//! results. The pipeline owns the ordering and degradation rules; the
//! actual AI calls and storage live behind the ports.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Classification, HistoryEntry, Importance, NewInsight, NewPattern, NewThought, Thought,
    ThoughtDraft,
};
use crate::ports::{
    AiOutcome, ClassificationService, DatabaseService, EmbeddingService, PatternDetectionService,
    PortError, PortResult,
};
use crate::schedule;

/// How many prior thoughts are handed to the pattern analyzer as context.
pub const PATTERN_CONTEXT_WINDOW: u32 = 50;

/// How many of those context thoughts a new pattern links back to.
pub const RELATED_THOUGHT_WINDOW: usize = 5;

/// Classification preview for the capture UI. Read-only: creates no
/// records, so the UI may call it on every draft.
pub async fn preview(
    classifier: &dyn ClassificationService,
    content: &str,
) -> AiOutcome<Classification> {
    classifier.classify(content).await
}

/// Persists one new thought along with any patterns detected against the
/// caller's recent history.
///
/// A failure to resolve the user or to insert the thought itself aborts
/// the whole operation. Embedding and pattern detection degrade instead:
/// a failed embedding stores an empty vector, a failed detection stores
/// no patterns, and the thought is saved either way.
///
/// Pattern/insight persistence is a sequential loop with no rollback; a
/// failure partway leaves the thought and the already-written patterns in
/// place. Patterns are advisory, so a partial set is acceptable.
pub async fn submit_thought(
    db: &dyn DatabaseService,
    embedder: &dyn EmbeddingService,
    detector: &dyn PatternDetectionService,
    user_id: Uuid,
    draft: ThoughtDraft,
    now: DateTime<Utc>,
) -> PortResult<Thought> {
    let user = db.get_user_by_id(user_id).await?;

    let review_date = schedule::review_date_for(draft.importance, now);

    // The embedding runs alongside the context fetch and the pattern
    // analysis: the analyzer needs the history, not the embedding.
    let (embedding, analysis) = futures::join!(embedder.embed(&draft.content), async {
        let recent = db.recent_thoughts(user.id, PATTERN_CONTEXT_WINDOW).await?;
        let history: Vec<HistoryEntry> = recent
            .iter()
            .map(|t| HistoryEntry {
                content: t.content.clone(),
                date: t.created_at,
            })
            .collect();
        let detected = detector.detect_patterns(&draft.content, &history).await;
        Ok::<_, PortError>((recent, detected))
    });
    let (recent, detected) = analysis?;
    let detected = detected.ready_or(Vec::new());

    let processed_content = draft
        .processed_content
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| draft.content.clone());

    let thought = db
        .insert_thought(NewThought {
            user_id: user.id,
            content: draft.content,
            processed_content,
            importance: draft.importance,
            tags: draft.tags,
            review_date,
            embedding: embedding.ready_or(Vec::new()),
            is_archived: draft.importance == Importance::NotImportant,
        })
        .await?;

    for found in detected {
        let related_thought_ids: Vec<Uuid> = std::iter::once(thought.id)
            .chain(recent.iter().take(RELATED_THOUGHT_WINDOW).map(|t| t.id))
            .collect();

        let pattern = db
            .insert_pattern(NewPattern {
                user_id: user.id,
                title: found.title,
                description: found.description,
                kind: found.kind,
                confidence: found.confidence,
                suggested_action: found.suggested_action,
                related_thought_ids,
            })
            .await?;

        // Exactly one insight per pattern, carrying a copy of the
        // description so its viewed state can evolve independently.
        db.insert_insight(NewInsight {
            pattern_id: pattern.id,
            content: pattern.description.clone(),
            kind: pattern.kind,
        })
        .await?;
    }

    Ok(thought)
}
