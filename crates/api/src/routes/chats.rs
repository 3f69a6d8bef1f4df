//! Chat routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use database::models::Message;
use marketplace::{chats, ChatOverview};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Request to send a text message.
#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// List the caller's chats with their derived last messages.
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ChatOverview>>> {
    let overviews = chats::list_for_user(state.db.pool(), &user_id).await?;
    Ok(Json(overviews))
}

/// Fetch a chat's full ordered message log.
pub async fn messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>> {
    let messages = chats::messages(state.db.pool(), &id, &user_id).await?;
    Ok(Json(messages))
}

/// Send a text message to a chat the caller participates in.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Message>> {
    let message = chats::send_message(state.db.pool(), &id, &user_id, &req.content).await?;
    Ok(Json(message))
}
