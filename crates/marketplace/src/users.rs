//! User registration and profile views.

use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use database::models::User;
use database::user as user_store;

use crate::error::{MarketError, Result};
use crate::progression;

/// A user together with the derived progression display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    /// Level indicator color.
    pub level_color: &'static str,
    /// Experience required to reach the next level.
    pub next_level_experience: i64,
}

/// Register a new user.
pub async fn register(pool: &SqlitePool, name: &str, image: Option<&str>) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MarketError::Validation(
            "user name must not be empty".to_string(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let user = user_store::create_user(pool, &id, name, image).await?;

    tracing::info!(user = %user.id, "User registered");
    Ok(user)
}

/// Fetch a user's profile with derived level color and next-level requirement.
pub async fn profile(pool: &SqlitePool, id: &str) -> Result<UserProfile> {
    let user = user_store::get_user(pool, id).await?;
    let level_color = progression::level_color(user.level);
    let next_level_experience = progression::required_experience(user.level);

    Ok(UserProfile {
        user,
        level_color,
        next_level_experience,
    })
}
