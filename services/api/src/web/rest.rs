//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::Utc;
use praxis_core::domain::{Importance, ThoughtDraft};
use praxis_core::ports::{AiOutcome, PortError};
use praxis_core::schedule::RecallAction;
use praxis_core::{intake, patterns, recall};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::dto::{InsightView, PatternView, ThoughtView};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_thought_handler,
        submit_thought_handler,
        recall_count_handler,
        list_recall_handler,
        recall_action_handler,
        recent_patterns_handler,
        transcribe_handler,
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
    ),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        SubmitThoughtRequest,
        RecallCountResponse,
        RecallActionRequest,
        TranscribeResponse,
        ThoughtView,
        PatternView,
        InsightView,
        crate::web::auth::SignupRequest,
        crate::web::auth::LoginRequest,
        crate::web::auth::AuthResponse,
    )),
    tags(
        (name = "Praxis API", description = "API endpoints for thought capture, recall, and pattern insights.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub content: String,
}

/// The classification preview shown before the user commits to saving.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub processed_content: String,
    pub suggested_importance: String,
    pub tags: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitThoughtRequest {
    pub content: String,
    pub importance: String,
    /// Preview output the user accepted, if any.
    pub processed_content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RecallCountResponse {
    pub count: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct RecallActionRequest {
    pub action: String,
}

#[derive(Serialize, ToSchema)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Maps a port failure to a response, logging the original error.
fn port_error(context: &'static str, e: PortError) -> (StatusCode, String) {
    error!("{}: {:?}", context, e);
    let status = match e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, context.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Preview the classification of a thought without saving anything.
///
/// Returns `null` when the classifier is unavailable; the capture UI then
/// falls back to the raw text.
#[utoipa::path(
    post,
    path = "/thoughts/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Classification preview; null when the classifier is unavailable", body = AnalyzeResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn analyze_thought_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<Option<AnalyzeResponse>> {
    match intake::preview(app_state.classifier.as_ref(), &req.content).await {
        AiOutcome::Ready(classification) => Json(Some(AnalyzeResponse {
            processed_content: classification.processed_content,
            suggested_importance: classification.suggested_importance.as_label().to_string(),
            tags: classification.tags,
        })),
        AiOutcome::Degraded => Json(None),
    }
}

/// Capture a new thought.
///
/// Runs the full intake pipeline: review scheduling, embedding, pattern
/// detection against recent history, and persistence.
#[utoipa::path(
    post,
    path = "/thoughts",
    request_body = SubmitThoughtRequest,
    responses(
        (status = 201, description = "Thought saved"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Acting user no longer exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_thought_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<SubmitThoughtRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = ThoughtDraft {
        content: req.content,
        importance: Importance::from_label(&req.importance),
        processed_content: req.processed_content,
        tags: req.tags,
    };

    intake::submit_thought(
        app_state.db.as_ref(),
        app_state.embedder.as_ref(),
        app_state.detector.as_ref(),
        user_id,
        draft,
        Utc::now(),
    )
    .await
    .map_err(|e| port_error("Failed to save thought", e))?;

    Ok(StatusCode::CREATED)
}

/// How many thoughts are currently due for recall, for badge counts.
#[utoipa::path(
    get,
    path = "/recall/count",
    responses(
        (status = 200, description = "Number of due thoughts", body = RecallCountResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn recall_count_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<RecallCountResponse>, (StatusCode, String)> {
    let count = recall::pending_count(app_state.db.as_ref(), user_id, Utc::now())
        .await
        .map_err(|e| port_error("Failed to count due thoughts", e))?;
    Ok(Json(RecallCountResponse { count }))
}

/// The due thoughts for one recall session, most overdue first, enriched
/// with their referencing patterns and insights.
#[utoipa::path(
    get,
    path = "/recall",
    responses(
        (status = 200, description = "Due thoughts, at most one batch", body = [ThoughtView]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_recall_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ThoughtView>>, (StatusCode, String)> {
    let due = recall::due_for_recall(app_state.db.as_ref(), user_id, Utc::now())
        .await
        .map_err(|e| port_error("Failed to load recall items", e))?;
    Ok(Json(due.into_iter().map(ThoughtView::from).collect()))
}

/// Apply a keep/done/snooze decision to a thought.
///
/// Unknown action labels do nothing, and so does a nonexistent thought id.
#[utoipa::path(
    post,
    path = "/recall/{thought_id}",
    request_body = RecallActionRequest,
    params(
        ("thought_id" = Uuid, Path, description = "The thought being acted on")
    ),
    responses(
        (status = 204, description = "Action applied"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn recall_action_handler(
    State(app_state): State<Arc<AppState>>,
    Path(thought_id): Path<Uuid>,
    Json(req): Json<RecallActionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if let Some(action) = RecallAction::from_label(&req.action) {
        recall::apply_recall_action(app_state.db.as_ref(), thought_id, action, Utc::now())
            .await
            .map_err(|e| port_error("Failed to apply recall action", e))?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's most recently detected patterns with their insights.
#[utoipa::path(
    get,
    path = "/patterns/recent",
    responses(
        (status = 200, description = "Recent patterns, newest first", body = [PatternView]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn recent_patterns_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<PatternView>>, (StatusCode, String)> {
    let recent = patterns::recent_patterns(app_state.db.as_ref(), user_id)
        .await
        .map_err(|e| port_error("Failed to load recent patterns", e))?;
    Ok(Json(recent.into_iter().map(PatternView::from).collect()))
}

/// Transcribe recorded voice input into text for the capture UI.
///
/// Accepts raw mono PCM16 audio as the request body.
#[utoipa::path(
    post,
    path = "/transcribe",
    request_body(content_type = "application/octet-stream", description = "Raw PCM16 audio"),
    responses(
        (status = 200, description = "Transcribed text", body = TranscribeResponse),
        (status = 400, description = "Empty audio payload"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Transcription failed")
    )
)]
pub async fn transcribe_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, (StatusCode, String)> {
    if body.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Audio payload is empty".to_string(),
        ));
    }

    let text = app_state
        .transcriber
        .transcribe(&body)
        .await
        .map_err(|e| port_error("Failed to transcribe audio", e))?;

    Ok(Json(TranscribeResponse { text }))
}
