//! User routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use database::models::User;
use marketplace::{users, UserProfile};

use crate::error::Result;
use crate::state::AppState;

/// Request to register a new user.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub image: Option<String>,
}

/// Register a new user.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>> {
    let user = users::register(state.db.pool(), &req.name, req.image.as_deref()).await?;
    Ok(Json(user))
}

/// Fetch a user profile with derived level display fields.
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    let profile = users::profile(state.db.pool(), &id).await?;
    Ok(Json(profile))
}
