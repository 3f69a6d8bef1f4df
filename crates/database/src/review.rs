//! Review persistence.
//!
//! Reviews are keyed by (trade, reviewer); a resubmission overwrites the
//! earlier row rather than adding a second one.

use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{Review, ReviewWithNames};
use crate::Result;

/// Create or overwrite the reviewer's review for a trade.
pub async fn upsert_review_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    reviewer_id: &str,
    reviewed_id: &str,
    rating: i64,
    comment: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (trade_id, reviewer_id, reviewed_id, rating, comment)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(trade_id, reviewer_id) DO UPDATE SET
            rating = excluded.rating,
            comment = excluded.comment,
            updated_at = datetime('now')
        "#,
    )
    .bind(trade_id)
    .bind(reviewer_id)
    .bind(reviewed_id)
    .bind(rating)
    .bind(comment)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get one reviewer's review of a trade, if present.
pub async fn get_review(
    pool: &SqlitePool,
    trade_id: &str,
    reviewer_id: &str,
) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(
        r#"
        SELECT trade_id, reviewer_id, reviewed_id, rating, comment, created_at, updated_at
        FROM reviews
        WHERE trade_id = ? AND reviewer_id = ?
        "#,
    )
    .bind(trade_id)
    .bind(reviewer_id)
    .fetch_optional(pool)
    .await?;

    Ok(review)
}

/// List a trade's reviews with both parties' display names resolved.
pub async fn list_reviews_for_trade(
    pool: &SqlitePool,
    trade_id: &str,
) -> Result<Vec<ReviewWithNames>> {
    let reviews = sqlx::query_as::<_, ReviewWithNames>(
        r#"
        SELECT r.trade_id,
               r.reviewer_id,
               reviewer.name AS reviewer_name,
               r.reviewed_id,
               reviewed.name AS reviewed_name,
               r.rating,
               r.comment,
               r.created_at,
               r.updated_at
        FROM reviews r
        JOIN users reviewer ON reviewer.id = r.reviewer_id
        JOIN users reviewed ON reviewed.id = r.reviewed_id
        WHERE r.trade_id = ?
        ORDER BY r.created_at
        "#,
    )
    .bind(trade_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}

/// Count how many reviews exist for a trade.
pub async fn count_reviews_for_trade(pool: &SqlitePool, trade_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reviews WHERE trade_id = ?
        "#,
    )
    .bind(trade_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
