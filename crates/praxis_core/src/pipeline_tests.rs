use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::{
    DetectedPattern, HistoryEntry, Importance, Insight, NewInsight, NewPattern, NewThought,
    Pattern, PatternKind, ReviewUpdate, Thought, ThoughtDraft, User, UserCredentials,
};
use crate::ports::{
    AiOutcome, DatabaseService, EmbeddingService, PatternDetectionService, PortError, PortResult,
};
use crate::schedule::RecallAction;
use crate::{intake, recall};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// In-memory store backing the pipeline tests.
#[derive(Default)]
struct FakeStore {
    users: Mutex<Vec<User>>,
    thoughts: Mutex<Vec<Thought>>,
    patterns: Mutex<Vec<Pattern>>,
    insights: Mutex<Vec<Insight>>,
    auth_sessions: Mutex<HashMap<String, Uuid>>,
    seq: Mutex<i64>,
}

impl FakeStore {
    fn with_user() -> (Self, Uuid) {
        let store = Self::default();
        let user_id = Uuid::new_v4();
        store.users.lock().unwrap().push(User {
            id: user_id,
            email: "someone@example.com".into(),
            name: None,
        });
        (store, user_id)
    }

    /// Monotonic creation timestamps so "most recent" is deterministic.
    fn next_created_at(&self) -> DateTime<Utc> {
        let mut seq = self.seq.lock().unwrap();
        *seq += 1;
        base_time() + Duration::minutes(*seq)
    }

    fn thought_by_id(&self, id: Uuid) -> Option<Thought> {
        self.thoughts.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }

    fn thought_count(&self) -> usize {
        self.thoughts.lock().unwrap().len()
    }

    fn pattern_count(&self) -> usize {
        self.patterns.lock().unwrap().len()
    }

    fn insight_count(&self) -> usize {
        self.insights.lock().unwrap().len()
    }
}

#[async_trait]
impl DatabaseService for FakeStore {
    async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        _hashed_password: &str,
    ) -> PortResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.map(String::from),
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .map(|u| UserCredentials {
                id: u.id,
                email: u.email.clone(),
                name: u.name.clone(),
                hashed_password: String::new(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        _expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.auth_sessions
            .lock()
            .unwrap()
            .insert(session_id.into(), user_id);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.auth_sessions
            .lock()
            .unwrap()
            .get(session_id)
            .copied()
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.auth_sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought> {
        let stored = Thought {
            id: Uuid::new_v4(),
            user_id: thought.user_id,
            content: thought.content,
            processed_content: thought.processed_content,
            importance: thought.importance,
            tags: thought.tags,
            review_date: thought.review_date,
            embedding: thought.embedding,
            is_archived: thought.is_archived,
            is_reviewed: false,
            created_at: self.next_created_at(),
        };
        self.thoughts.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent_thoughts(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Thought>> {
        let mut thoughts: Vec<Thought> = self
            .thoughts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        thoughts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        thoughts.truncate(limit as usize);
        Ok(thoughts)
    }

    async fn due_thoughts(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        limit: u32,
    ) -> PortResult<Vec<Thought>> {
        let mut due: Vec<Thought> = self
            .thoughts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && !t.is_archived
                    && !t.is_reviewed
                    && t.review_date.is_some_and(|d| d <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|t| t.review_date);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn count_due_thoughts(&self, user_id: Uuid, now: DateTime<Utc>) -> PortResult<u64> {
        Ok(self.due_thoughts(user_id, now, u32::MAX).await?.len() as u64)
    }

    async fn update_thought_review(
        &self,
        thought_id: Uuid,
        update: ReviewUpdate,
    ) -> PortResult<()> {
        // Zero matching rows is not an error.
        if let Some(t) = self
            .thoughts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.id == thought_id)
        {
            match update {
                ReviewUpdate::Archive => {
                    t.is_archived = true;
                    t.is_reviewed = true;
                }
                ReviewUpdate::Reschedule(when) => t.review_date = Some(when),
            }
        }
        Ok(())
    }

    async fn insert_pattern(&self, pattern: NewPattern) -> PortResult<Pattern> {
        let stored = Pattern {
            id: Uuid::new_v4(),
            user_id: pattern.user_id,
            title: pattern.title,
            description: pattern.description,
            kind: pattern.kind,
            confidence: pattern.confidence,
            suggested_action: pattern.suggested_action,
            related_thought_ids: pattern.related_thought_ids,
            created_at: self.next_created_at(),
        };
        self.patterns.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn insert_insight(&self, insight: NewInsight) -> PortResult<Insight> {
        let stored = Insight {
            id: Uuid::new_v4(),
            pattern_id: insight.pattern_id,
            content: insight.content,
            kind: insight.kind,
            is_viewed: false,
            created_at: self.next_created_at(),
        };
        self.insights.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn recent_patterns(&self, user_id: Uuid, limit: u32) -> PortResult<Vec<Pattern>> {
        let mut patterns: Vec<Pattern> = self
            .patterns
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        patterns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        patterns.truncate(limit as usize);
        Ok(patterns)
    }

    async fn patterns_referencing(
        &self,
        user_id: Uuid,
        thought_id: Uuid,
    ) -> PortResult<Vec<Pattern>> {
        Ok(self
            .patterns
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id && p.related_thought_ids.contains(&thought_id))
            .cloned()
            .collect())
    }

    async fn insights_for_pattern(&self, pattern_id: Uuid) -> PortResult<Vec<Insight>> {
        Ok(self
            .insights
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.pattern_id == pattern_id)
            .cloned()
            .collect())
    }
}

/// Embedder returning a canned outcome.
struct FakeEmbedder(AiOutcome<Vec<f32>>);

#[async_trait]
impl EmbeddingService for FakeEmbedder {
    async fn embed(&self, _content: &str) -> AiOutcome<Vec<f32>> {
        self.0.clone()
    }
}

/// Detector returning a canned outcome and recording the history it saw.
struct FakeDetector {
    outcome: AiOutcome<Vec<DetectedPattern>>,
    seen_history: Mutex<Option<Vec<HistoryEntry>>>,
}

impl FakeDetector {
    fn ready(patterns: Vec<DetectedPattern>) -> Self {
        Self {
            outcome: AiOutcome::Ready(patterns),
            seen_history: Mutex::new(None),
        }
    }

    fn degraded() -> Self {
        Self {
            outcome: AiOutcome::Degraded,
            seen_history: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PatternDetectionService for FakeDetector {
    async fn detect_patterns(
        &self,
        _content: &str,
        history: &[HistoryEntry],
    ) -> AiOutcome<Vec<DetectedPattern>> {
        *self.seen_history.lock().unwrap() = Some(history.to_vec());
        self.outcome.clone()
    }
}

fn embedder_ready() -> FakeEmbedder {
    FakeEmbedder(AiOutcome::Ready(vec![0.1, 0.2, 0.3]))
}

fn draft(content: &str, importance: Importance) -> ThoughtDraft {
    ThoughtDraft {
        content: content.into(),
        importance,
        processed_content: None,
        tags: Vec::new(),
    }
}

fn sample_detected() -> DetectedPattern {
    DetectedPattern {
        title: "Recurring worry about deadlines".into(),
        description: "Deadline pressure keeps coming up across recent notes.".into(),
        kind: PatternKind::Recurrence,
        confidence: 0.9,
        suggested_action: Some("Block out planning time each morning.".into()),
    }
}

async fn seed_thoughts(store: &FakeStore, user_id: Uuid, count: usize) -> Vec<Thought> {
    let mut seeded = Vec::with_capacity(count);
    for i in 0..count {
        let t = store
            .insert_thought(NewThought {
                user_id,
                content: format!("earlier thought {i}"),
                processed_content: format!("earlier thought {i}"),
                importance: Importance::Later,
                tags: Vec::new(),
                review_date: Some(base_time() + Duration::days(7)),
                embedding: Vec::new(),
                is_archived: false,
            })
            .await
            .unwrap();
        seeded.push(t);
    }
    seeded
}

// ── Intake ────────────────────────────────────────────────────────────

#[tokio::test]
async fn not_important_is_archived_and_never_due() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time();

    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("maybe learn the ukulele", Importance::NotImportant),
        now,
    )
    .await
    .unwrap();

    assert!(thought.is_archived);
    assert!(!thought.is_reviewed);
    assert_eq!(thought.review_date, None);

    // Never enters the queue, no matter how far the clock advances.
    let far_future = now + Duration::days(365);
    assert_eq!(recall::pending_count(&store, user_id, far_future).await.unwrap(), 0);
}

#[tokio::test]
async fn week_schedules_three_days_out() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time();

    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("ship the report", Importance::Week),
        now,
    )
    .await
    .unwrap();

    assert_eq!(thought.review_date, Some(now + Duration::days(3)));
    assert!(!thought.is_archived);
    assert!(!thought.is_reviewed);
    assert_eq!(store.pattern_count(), 0);
}

#[tokio::test]
async fn degraded_detector_still_saves_the_thought() {
    let (store, user_id) = FakeStore::with_user();

    intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::degraded(),
        user_id,
        draft("call the dentist", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    assert_eq!(store.thought_count(), 1);
    assert_eq!(store.pattern_count(), 0);
    assert_eq!(store.insight_count(), 0);
}

#[tokio::test]
async fn degraded_embedder_stores_empty_vector() {
    let (store, user_id) = FakeStore::with_user();

    let thought = intake::submit_thought(
        &store,
        &FakeEmbedder(AiOutcome::Degraded),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("water the plants", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    assert!(thought.embedding.is_empty());
    assert_eq!(store.thought_count(), 1);
}

#[tokio::test]
async fn detected_pattern_links_new_thought_first() {
    let (store, user_id) = FakeStore::with_user();
    let seeded = seed_thoughts(&store, user_id, 7).await;
    let detector = FakeDetector::ready(vec![sample_detected()]);

    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &detector,
        user_id,
        draft("deadlines again", Importance::Today),
        base_time() + Duration::days(1),
    )
    .await
    .unwrap();

    let patterns = store.patterns.lock().unwrap().clone();
    assert_eq!(patterns.len(), 1);
    let pattern = &patterns[0];

    // New thought first, then the five most recent priors, newest first.
    assert_eq!(pattern.related_thought_ids.len(), 6);
    assert_eq!(pattern.related_thought_ids[0], thought.id);
    let expected: Vec<Uuid> = seeded.iter().rev().take(5).map(|t| t.id).collect();
    assert_eq!(&pattern.related_thought_ids[1..], expected.as_slice());

    assert_eq!(pattern.kind, PatternKind::Recurrence);
    assert_eq!(pattern.confidence, 0.9);

    let insights = store.insights.lock().unwrap().clone();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].pattern_id, pattern.id);
    assert_eq!(insights[0].content, pattern.description);
    assert_eq!(insights[0].kind, pattern.kind);
    assert!(!insights[0].is_viewed);
}

#[tokio::test]
async fn related_window_shrinks_with_short_history() {
    let (store, user_id) = FakeStore::with_user();
    seed_thoughts(&store, user_id, 2).await;
    let detector = FakeDetector::ready(vec![sample_detected()]);

    intake::submit_thought(
        &store,
        &embedder_ready(),
        &detector,
        user_id,
        draft("deadlines again", Importance::Today),
        base_time() + Duration::days(1),
    )
    .await
    .unwrap();

    let patterns = store.patterns.lock().unwrap().clone();
    assert_eq!(patterns[0].related_thought_ids.len(), 3);
}

#[tokio::test]
async fn first_thought_sees_empty_history() {
    let (store, user_id) = FakeStore::with_user();
    let detector = FakeDetector::ready(Vec::new());

    intake::submit_thought(
        &store,
        &embedder_ready(),
        &detector,
        user_id,
        draft("ship the report", Importance::Week),
        base_time(),
    )
    .await
    .unwrap();

    // The analyzer still runs, with nothing to match against.
    let seen = detector.seen_history.lock().unwrap().clone();
    assert_eq!(seen.expect("detector was called").len(), 0);
    assert_eq!(store.pattern_count(), 0);
}

#[tokio::test]
async fn processed_content_falls_back_to_raw_content() {
    let (store, user_id) = FakeStore::with_user();

    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("raw unprocessed dump", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    assert_eq!(thought.processed_content, "raw unprocessed dump");
}

#[tokio::test]
async fn unknown_user_aborts_before_any_write() {
    let store = FakeStore::default();

    let result = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(vec![sample_detected()]),
        Uuid::new_v4(),
        draft("who am I", Importance::Today),
        base_time(),
    )
    .await;

    assert!(matches!(result, Err(PortError::NotFound(_))));
    assert_eq!(store.thought_count(), 0);
    assert_eq!(store.pattern_count(), 0);
}

// ── Recall ────────────────────────────────────────────────────────────

#[tokio::test]
async fn done_is_idempotent() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time() + Duration::days(1);
    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("follow up with Sam", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    recall::apply_recall_action(&store, thought.id, RecallAction::Done, now)
        .await
        .unwrap();
    recall::apply_recall_action(&store, thought.id, RecallAction::Done, now)
        .await
        .unwrap();

    let stored = store.thought_by_id(thought.id).unwrap();
    assert!(stored.is_archived);
    assert!(stored.is_reviewed);
}

#[tokio::test]
async fn snooze_then_keep_last_write_wins() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time() + Duration::days(1);
    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("renew the passport", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    recall::apply_recall_action(&store, thought.id, RecallAction::Snooze, now)
        .await
        .unwrap();
    recall::apply_recall_action(&store, thought.id, RecallAction::Keep, now)
        .await
        .unwrap();

    let stored = store.thought_by_id(thought.id).unwrap();
    assert_eq!(stored.review_date, Some(now + Duration::days(2)));
    assert!(!stored.is_reviewed);
}

#[tokio::test]
async fn recall_action_on_missing_thought_is_a_noop() {
    let (store, _user_id) = FakeStore::with_user();
    recall::apply_recall_action(&store, Uuid::new_v4(), RecallAction::Done, base_time())
        .await
        .unwrap();
}

#[tokio::test]
async fn due_listing_caps_at_batch_and_orders_most_overdue_first() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time() + Duration::days(30);

    for _ in 0..5 {
        intake::submit_thought(
            &store,
            &embedder_ready(),
            &FakeDetector::ready(Vec::new()),
            user_id,
            draft("overdue item", Importance::Later),
            store.next_created_at(),
        )
        .await
        .unwrap();
    }

    let due = recall::due_for_recall(&store, user_id, now).await.unwrap();
    assert_eq!(due.len(), recall::RECALL_BATCH as usize);
    for pair in due.windows(2) {
        assert!(pair[0].thought.review_date <= pair[1].thought.review_date);
    }
    for item in &due {
        assert!(item.thought.review_date.unwrap() <= now);
        assert!(!item.thought.is_archived);
    }
}

#[tokio::test]
async fn due_listing_excludes_future_and_archived() {
    let (store, user_id) = FakeStore::with_user();
    let now = base_time() + Duration::hours(1);

    let due_now = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("due now", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();
    intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("due next week", Importance::Later),
        base_time(),
    )
    .await
    .unwrap();
    let archived = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(Vec::new()),
        user_id,
        draft("already handled", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();
    recall::apply_recall_action(&store, archived.id, RecallAction::Done, now)
        .await
        .unwrap();

    let due = recall::due_for_recall(&store, user_id, now).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].thought.id, due_now.id);
    assert_eq!(recall::pending_count(&store, user_id, now).await.unwrap(), 1);
}

#[tokio::test]
async fn recall_enrichment_attaches_patterns_and_insights() {
    let (store, user_id) = FakeStore::with_user();
    seed_thoughts(&store, user_id, 1).await;

    let thought = intake::submit_thought(
        &store,
        &embedder_ready(),
        &FakeDetector::ready(vec![sample_detected()]),
        user_id,
        draft("deadlines again", Importance::Today),
        base_time(),
    )
    .await
    .unwrap();

    let due = recall::due_for_recall(&store, user_id, base_time() + Duration::hours(1))
        .await
        .unwrap();
    let item = due.iter().find(|i| i.thought.id == thought.id).unwrap();
    assert_eq!(item.patterns.len(), 1);
    assert_eq!(item.patterns[0].insights.len(), 1);
    assert_eq!(
        item.patterns[0].insights[0].content,
        item.patterns[0].pattern.description
    );
}
