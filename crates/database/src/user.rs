//! User CRUD and progression updates.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a new user with fresh progression counters.
pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    image: Option<&str>,
) -> Result<User> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, image)
        VALUES (?, ?, COALESCE(?, '/default-avatar.png'))
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(image)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_user(pool, id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, image, level, experience, completed_trades,
               positive_reviews, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by ID within a transaction.
pub async fn get_user_tx(conn: &mut SqliteConnection, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, image, level, experience, completed_trades,
               positive_reviews, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Record a completed trade for a user: store the new progression state and
/// bump the completed-trade counter in one statement.
pub async fn record_completed_trade_tx(
    conn: &mut SqliteConnection,
    id: &str,
    level: i64,
    experience: i64,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET level = ?,
            experience = ?,
            completed_trades = completed_trades + 1,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(level)
    .bind(experience)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Record a positive review for a user: store the new progression state and
/// bump the positive-review counter in one statement.
pub async fn record_positive_review_tx(
    conn: &mut SqliteConnection,
    id: &str,
    level: i64,
    experience: i64,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET level = ?,
            experience = ?,
            positive_reviews = positive_reviews + 1,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(level)
    .bind(experience)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}
