//! Route handlers for the marketplace API.

pub mod chats;
pub mod health;
pub mod listings;
pub mod reviews;
pub mod trades;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Users
        .route("/api/users", post(users::register))
        .route("/api/users/:id", get(users::profile))
        // Listings
        .route("/api/listings", post(listings::create).get(listings::browse))
        .route("/api/listings/:id", get(listings::get_one))
        // Trades
        .route("/api/trades", post(trades::propose).get(trades::list_mine))
        .route("/api/trades/:id", get(trades::get_one))
        .route("/api/trades/:id/offer", post(trades::update_offer))
        .route("/api/trades/:id/accept", post(trades::accept))
        .route("/api/trades/:id/meeting", post(trades::set_meeting))
        .route("/api/trades/:id/complete", post(trades::complete))
        // Chats
        .route("/api/chats", get(chats::list_mine))
        .route(
            "/api/chats/:id/messages",
            get(chats::messages).post(chats::send_message),
        )
        // Reviews
        .route("/api/reviews", post(reviews::submit).get(reviews::list))
}
