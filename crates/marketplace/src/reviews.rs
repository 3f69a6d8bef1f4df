//! The review ledger: one post-completion rating per (trade, reviewer).

use sqlx::SqlitePool;

use database::models::{Review, ReviewWithNames, Side, TradeStatus};
use database::MessageKind;
use database::{chat as chat_store, review as review_store, trade as trade_store,
    user as user_store};

use crate::error::{MarketError, Result};
use crate::progression;
use crate::trades::participant_side;

/// Longest accepted review comment.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Submit (or resubmit) a review of the other participant on a completed
/// trade. A rating of 4 or higher credits the reviewed user a fixed
/// experience bonus and a positive-review count, atomically with the review
/// row and the chat entry.
pub async fn submit(
    pool: &SqlitePool,
    trade_id: &str,
    reviewer: &str,
    rating: i64,
    comment: &str,
) -> Result<Review> {
    if !(1..=5).contains(&rating) {
        return Err(MarketError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )));
    }
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(MarketError::Validation(
            "review comment must not be empty".to_string(),
        ));
    }
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(MarketError::Validation(format!(
            "review comment is too long ({} chars, max {MAX_COMMENT_LENGTH})",
            comment.len()
        )));
    }

    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    let trade = trade_store::get_trade_tx(&mut tx, trade_id).await?;
    let side = participant_side(&trade, reviewer)?;

    if trade.status != TradeStatus::Completed {
        return Err(MarketError::InvalidState(format!(
            "only a completed trade can be reviewed, this one is {}",
            trade.status
        )));
    }

    // The reviewed party is always the other participant, never client-supplied.
    let reviewed = match side.other() {
        Side::Initiator => trade.initiator_id.clone(),
        Side::Receiver => trade.receiver_id.clone(),
    };

    review_store::upsert_review_tx(&mut tx, trade_id, reviewer, &reviewed, rating, comment)
        .await?;

    if rating >= 4 {
        let user = user_store::get_user_tx(&mut tx, &reviewed).await?;
        let (level, experience) = progression::apply_experience(
            user.level,
            user.experience,
            progression::POSITIVE_REVIEW_BONUS,
        );
        user_store::record_positive_review_tx(&mut tx, &reviewed, level, experience).await?;
    }

    let chat = chat_store::get_chat_by_trade_tx(&mut tx, trade_id).await?;
    chat_store::append_message_tx(
        &mut tx,
        &chat.id,
        reviewer,
        &format!("Left a {rating}-star review"),
        MessageKind::TradeUpdate,
    )
    .await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    tracing::info!(trade = %trade_id, reviewer = %reviewer, rating, "Review submitted");

    review_store::get_review(pool, trade_id, reviewer)
        .await?
        .ok_or(MarketError::NotFound {
            entity: "Review",
            id: trade_id.to_string(),
        })
}

/// List a trade's reviews with display identities resolved.
pub async fn list(pool: &SqlitePool, trade_id: &str) -> Result<Vec<ReviewWithNames>> {
    trade_store::get_trade(pool, trade_id).await?;
    Ok(review_store::list_reviews_for_trade(pool, trade_id).await?)
}
