//! Listing routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use database::listing::ListingFilter;
use database::models::Listing;
use marketplace::listings::{self, NewListing};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Browse filters; all optional.
#[derive(Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
}

/// Create a listing owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewListing>,
) -> Result<Json<Listing>> {
    let listing = listings::create(state.db.pool(), &user_id, &req).await?;
    Ok(Json(listing))
}

/// Browse available listings.
pub async fn browse(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<Vec<Listing>>> {
    let filter = ListingFilter {
        category: query.category,
        size: query.size,
        condition: query.condition,
    };
    let listings = listings::browse(state.db.pool(), &filter).await?;
    Ok(Json(listings))
}

/// Fetch one listing.
pub async fn get_one(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Listing>> {
    let listing = listings::get(state.db.pool(), &id).await?;
    Ok(Json(listing))
}
