//! Listing creation and browsing.

use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use database::listing::{self as listing_store, ListingFilter};
use database::models::Listing;
use database::user as user_store;

use crate::error::{MarketError, Result};

/// Accepted listing categories.
pub const CATEGORIES: [&str; 5] = ["tops", "bottoms", "dresses", "shoes", "accessories"];

/// Accepted condition grades.
pub const CONDITIONS: [&str; 5] = ["new", "like_new", "good", "fair", "poor"];

/// Input for creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub category: String,
    pub size: String,
    pub condition: String,
}

/// Create a listing owned by `owner_id`, validated at the boundary.
pub async fn create(pool: &SqlitePool, owner_id: &str, input: &NewListing) -> Result<Listing> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(MarketError::Validation(
            "listing title must not be empty".to_string(),
        ));
    }
    if input.size.trim().is_empty() {
        return Err(MarketError::Validation(
            "listing size must not be empty".to_string(),
        ));
    }
    if !CATEGORIES.contains(&input.category.as_str()) {
        return Err(MarketError::Validation(format!(
            "unknown category: {}",
            input.category
        )));
    }
    if !CONDITIONS.contains(&input.condition.as_str()) {
        return Err(MarketError::Validation(format!(
            "unknown condition: {}",
            input.condition
        )));
    }

    // Owner must exist; surfaces as NotFound rather than a foreign key error.
    user_store::get_user(pool, owner_id).await?;

    let listing = Listing {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        title: title.to_string(),
        description: input.description.trim().to_string(),
        category: input.category.clone(),
        size: input.size.trim().to_string(),
        condition: input.condition.clone(),
        status: "available".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
    };

    let created = listing_store::create_listing(pool, &listing).await?;
    tracing::info!(listing = %created.id, owner = %owner_id, "Listing created");
    Ok(created)
}

/// Browse available listings with optional filters.
pub async fn browse(pool: &SqlitePool, filter: &ListingFilter) -> Result<Vec<Listing>> {
    if let Some(category) = &filter.category {
        if !CATEGORIES.contains(&category.as_str()) {
            return Err(MarketError::Validation(format!(
                "unknown category: {category}"
            )));
        }
    }
    if let Some(condition) = &filter.condition {
        if !CONDITIONS.contains(&condition.as_str()) {
            return Err(MarketError::Validation(format!(
                "unknown condition: {condition}"
            )));
        }
    }

    Ok(listing_store::list_available(pool, filter).await?)
}

/// Fetch a single listing.
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Listing> {
    Ok(listing_store::get_listing(pool, id).await?)
}
