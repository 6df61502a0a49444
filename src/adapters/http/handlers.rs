//! HTTP handlers for the companion endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures::Stream;

use crate::application::{TurnError, TurnEvent, TurnProcessor, TurnRequest};
use crate::domain::foundation::ConversationId;
use crate::domain::wellness::{CheckIn, JournalEntry};
use crate::ports::{CheckInStore, JournalStore, MilestoneStore};

use super::dto::{
    CheckInBody, CheckInView, ErrorResponse, JournalBody, JournalEntryView, ListParams,
    MilestoneView, StateView, TurnBody,
};
use super::middleware::RequireAuth;

/// Shared application state for the HTTP surface.
#[derive(Clone)]
pub struct AppState {
    pub turns: Arc<TurnProcessor>,
    pub check_ins: Arc<dyn CheckInStore>,
    pub journals: Arc<dyn JournalStore>,
    pub milestones: Arc<dyn MilestoneStore>,
}

/// API-level error with its HTTP mapping.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
            ApiError::Internal(message) => {
                tracing::error!("internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Something went wrong".to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<TurnError> for ApiError {
    fn from(err: TurnError) -> Self {
        match err {
            TurnError::Validation(e) => ApiError::BadRequest(e.to_string()),
            TurnError::ConversationNotFound(id) => {
                ApiError::NotFound(format!("conversation {} not found", id))
            }
            TurnError::Store(e) => ApiError::Internal(e.to_string()),
            TurnError::Provider(e) => ApiError::Internal(e.to_string()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// POST /api/companion/turn
// ════════════════════════════════════════════════════════════════════════════

/// Runs one turn, streaming the reply as SSE.
///
/// Events: `delta` (reply content), `complete` (reply persisted), `metadata`
/// (conversation id, stage, suggested replies), `error`.
pub async fn post_turn(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<TurnBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let conversation_id = body
        .conversation_id
        .as_deref()
        .map(|raw| {
            raw.parse::<ConversationId>()
                .map_err(|_| ApiError::BadRequest("Invalid conversation ID format".to_string()))
        })
        .transpose()?;

    let rx = state
        .turns
        .process_turn(TurnRequest {
            user_id: user.id,
            conversation_id,
            content: body.message,
        })
        .await?;

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(to_sse_event(event)), rx))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: TurnEvent) -> Event {
    match event {
        TurnEvent::ReplyDelta { delta } => Event::default()
            .event("delta")
            .data(serde_json::json!({ "delta": delta }).to_string()),
        TurnEvent::ReplyComplete { message_id } => Event::default()
            .event("complete")
            .data(serde_json::json!({ "messageId": message_id.to_string() }).to_string()),
        TurnEvent::Metadata {
            conversation_id,
            stage,
            suggestions,
        } => Event::default().event("metadata").data(
            serde_json::json!({
                "conversationId": conversation_id.to_string(),
                "stage": stage,
                "suggestions": suggestions,
            })
            .to_string(),
        ),
        TurnEvent::Failed { message } => Event::default()
            .event("error")
            .data(serde_json::json!({ "error": message }).to_string()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GET /api/companion/state
// ════════════════════════════════════════════════════════════════════════════

/// Rehydrates client state: current stage, conversation id, suggestions.
pub async fn get_state(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .turns
        .current_state(&user.id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(StateView {
            conversation_id: snapshot.conversation_id.map(|id| id.to_string()),
            stage: snapshot.stage,
            suggestions: snapshot.suggestions,
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Check-ins
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/check-ins - direct check-in creation.
pub async fn post_check_in(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CheckInBody>,
) -> Result<impl IntoResponse, ApiError> {
    let check_in = CheckIn::create_from_raw(
        user.id,
        body.mood,
        body.sleep_quality,
        body.energy_level,
        body.intentions,
        None,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .check_ins
        .create(&check_in)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(CheckInView::from_domain(&check_in))))
}

/// GET /api/check-ins - recent check-ins for the user.
pub async fn get_check_ins(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let check_ins = state
        .check_ins
        .recent_for_user(&user.id, params.effective_limit())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let views: Vec<CheckInView> = check_ins.iter().map(CheckInView::from_domain).collect();
    Ok((StatusCode::OK, Json(views)))
}

// ════════════════════════════════════════════════════════════════════════════
// Journal entries
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/journal-entries - direct journal entry creation.
pub async fn post_journal_entry(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<JournalBody>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = JournalEntry::create_direct(user.id, body.title, body.content)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .journals
        .create(&entry)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(JournalEntryView::from_domain(&entry)),
    ))
}

/// GET /api/journal-entries - recent entries for the user.
pub async fn get_journal_entries(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .journals
        .recent_for_user(&user.id, params.effective_limit())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let views: Vec<JournalEntryView> =
        entries.iter().map(JournalEntryView::from_domain).collect();
    Ok((StatusCode::OK, Json(views)))
}

// ════════════════════════════════════════════════════════════════════════════
// Milestones
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/milestones - recent milestones for the user.
pub async fn get_milestones(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let milestones = state
        .milestones
        .recent_for_user(&user.id, params.effective_limit())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let views: Vec<MilestoneView> = milestones.iter().map(MilestoneView::from_domain).collect();
    Ok((StatusCode::OK, Json(views)))
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
