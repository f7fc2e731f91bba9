use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use explore_assistant::{ChatMessage, ChatSession};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CustomerClaims;
use crate::sessions::Owned;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatView {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub suggestions: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ReplyView {
    /// `None` when the message was blank and nothing was sent.
    pub reply: Option<ChatMessage>,
    #[serde(flatten)]
    pub chat: ChatView,
}

fn view(id: Uuid, session: &ChatSession) -> ChatView {
    ChatView {
        id,
        messages: session.transcript().to_vec(),
        suggestions: session.suggestions().to_vec(),
    }
}

/// Customer routes; layered by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/assistant/sessions", post(open_session))
        .route("/v1/assistant/sessions/{id}", get(get_session))
        .route("/v1/assistant/sessions/{id}/messages", post(send_message))
}

async fn find_chat(state: &AppState, id: Uuid, owner: &str) -> Result<Arc<Owned<ChatSession>>, AppError> {
    state
        .chats
        .get(id, owner)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("Chat session not found: {}", id)))
}

/// POST /v1/assistant/sessions. The catalog is snapshotted into the
/// assistant's instructions here.
async fn open_session(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> (StatusCode, Json<ChatView>) {
    let tours = state.store.tours().await;
    let session = ChatSession::new(state.assistant.clone(), &tours);
    let id = Uuid::new_v4();
    let body = view(id, &session);

    state.chats.insert(id, &claims.sub, session).await;
    info!(chat_id = %id, tours = tours.len(), "assistant session opened");
    (StatusCode::CREATED, Json(body))
}

async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, AppError> {
    let chat = find_chat(&state, id, &claims.sub).await?;
    let session = chat.lock().await;
    Ok(Json(view(id, &session)))
}

/// POST /v1/assistant/sessions/{id}/messages. Backend failures come back as
/// the apology reply, never as an error status.
async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ReplyView>, AppError> {
    let chat = find_chat(&state, id, &claims.sub).await?;
    // One exchange at a time per session.
    let mut session = chat.lock().await;
    let reply = session.send(&req.text).await.cloned();
    Ok(Json(ReplyView { reply, chat: view(id, &session) }))
}
