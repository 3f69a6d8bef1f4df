//! Review routes.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use database::models::{Review, ReviewWithNames};
use marketplace::reviews;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Request to submit a review for a completed trade.
#[derive(Deserialize)]
pub struct SubmitReviewRequest {
    pub trade_id: String,
    pub rating: i64,
    pub comment: String,
}

/// Query parameters for listing a trade's reviews.
#[derive(Deserialize)]
pub struct ReviewListQuery {
    pub trade_id: String,
}

/// Submit or overwrite the caller's review of the other participant.
pub async fn submit(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<Json<Review>> {
    let review = reviews::submit(
        state.db.pool(),
        &req.trade_id,
        &user_id,
        req.rating,
        &req.comment,
    )
    .await?;
    Ok(Json(review))
}

/// List a trade's reviews with display identities resolved.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<ReviewWithNames>>> {
    let reviews = reviews::list(state.db.pool(), &query.trade_id).await?;
    Ok(Json(reviews))
}
