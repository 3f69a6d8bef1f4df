//! Trade negotiation routes.
//!
//! Each mutation has its own endpoint with an explicit request body; the
//! acting user always comes from the authenticated header, never the body.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use database::models::Trade;
use marketplace::trades;
use marketplace::{MeetingInput, TradeDetails};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Request to propose a trade.
#[derive(Deserialize)]
pub struct ProposeRequest {
    pub receiver_id: String,
    #[serde(default)]
    pub initiator_items: Vec<String>,
    #[serde(default)]
    pub receiver_items: Vec<String>,
}

/// Request to counter-offer with a new receiver item list.
#[derive(Deserialize)]
pub struct OfferRequest {
    #[serde(default)]
    pub receiver_items: Vec<String>,
}

/// Propose a new trade to another user.
pub async fn propose(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ProposeRequest>,
) -> Result<Json<TradeDetails>> {
    let details = trades::propose(
        state.db.pool(),
        &user_id,
        &req.receiver_id,
        &req.initiator_items,
        &req.receiver_items,
    )
    .await?;
    Ok(Json(details))
}

/// List the caller's trades, most recently updated first.
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Trade>>> {
    let trades = trades::list_for_user(state.db.pool(), &user_id).await?;
    Ok(Json(trades))
}

/// Fetch one trade with its offer lists.
pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TradeDetails>> {
    let details = trades::get(state.db.pool(), &id, &user_id).await?;
    Ok(Json(details))
}

/// Replace the receiver's offered items.
pub async fn update_offer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<OfferRequest>,
) -> Result<Json<TradeDetails>> {
    let details =
        trades::update_offer(state.db.pool(), &id, &user_id, &req.receiver_items).await?;
    Ok(Json(details))
}

/// Record the caller's acceptance of the current offer.
pub async fn accept(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TradeDetails>> {
    let details = trades::accept(state.db.pool(), &id, &user_id).await?;
    Ok(Json(details))
}

/// Set the meeting details of an accepted trade.
pub async fn set_meeting(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<MeetingInput>,
) -> Result<Json<TradeDetails>> {
    let details = trades::set_meeting(state.db.pool(), &id, &user_id, &req).await?;
    Ok(Json(details))
}

/// Complete an accepted trade and credit both participants.
pub async fn complete(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TradeDetails>> {
    let details = trades::complete(state.db.pool(), &id, &user_id).await?;
    Ok(Json(details))
}
