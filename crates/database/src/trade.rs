//! Trade and trade-item persistence.
//!
//! Trades are mutated together with their chat and the participants'
//! progression counters, so most write operations here are `_tx` variants
//! composed into one transaction by the marketplace crate.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Side, Trade, TradeItem, TradeStatus};

const TRADE_COLUMNS: &str = "id, initiator_id, receiver_id, initiator_accepted, \
     receiver_accepted, status, meeting_time, meeting_location, meeting_lat, \
     meeting_lng, created_at, updated_at";

/// Insert a new pending trade and its offer items.
pub async fn create_trade_tx(
    conn: &mut SqliteConnection,
    id: &str,
    initiator_id: &str,
    receiver_id: &str,
    items: &[TradeItem],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO trades (id, initiator_id, receiver_id)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(initiator_id)
    .bind(receiver_id)
    .execute(&mut *conn)
    .await?;

    insert_items_tx(conn, items).await
}

async fn insert_items_tx(conn: &mut SqliteConnection, items: &[TradeItem]) -> Result<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO trade_items (trade_id, listing_id, owner_id, side, position)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.trade_id)
        .bind(&item.listing_id)
        .bind(&item.owner_id)
        .bind(item.side)
        .bind(item.position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Get a trade by ID.
pub async fn get_trade(pool: &SqlitePool, id: &str) -> Result<Trade> {
    sqlx::query_as::<_, Trade>(&format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Trade",
            id: id.to_string(),
        })
}

/// Get a trade by ID within a transaction.
pub async fn get_trade_tx(conn: &mut SqliteConnection, id: &str) -> Result<Trade> {
    sqlx::query_as::<_, Trade>(&format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Trade",
            id: id.to_string(),
        })
}

/// List every trade a user participates in, most recently updated first.
pub async fn list_trades_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(&format!(
        "SELECT {TRADE_COLUMNS} FROM trades \
         WHERE initiator_id = ? OR receiver_id = ? \
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Get a trade's offer items, initiator side first, in offer order.
pub async fn get_trade_items(pool: &SqlitePool, trade_id: &str) -> Result<Vec<TradeItem>> {
    let items = sqlx::query_as::<_, TradeItem>(
        r#"
        SELECT trade_id, listing_id, owner_id, side, position
        FROM trade_items
        WHERE trade_id = ?
        ORDER BY side, position
        "#,
    )
    .bind(trade_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Get a trade's offer items within a transaction.
pub async fn get_trade_items_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
) -> Result<Vec<TradeItem>> {
    let items = sqlx::query_as::<_, TradeItem>(
        r#"
        SELECT trade_id, listing_id, owner_id, side, position
        FROM trade_items
        WHERE trade_id = ?
        ORDER BY side, position
        "#,
    )
    .bind(trade_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Replace one side's offer list and reset both acceptance flags.
///
/// A counter-offer invalidates prior consent, so the flag reset happens in
/// the same statement as the timestamp touch.
pub async fn replace_offer_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    side: Side,
    items: &[TradeItem],
) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM trade_items
        WHERE trade_id = ? AND side = ?
        "#,
    )
    .bind(trade_id)
    .bind(side)
    .execute(&mut *conn)
    .await?;

    insert_items_tx(conn, items).await?;

    sqlx::query(
        r#"
        UPDATE trades
        SET initiator_accepted = 0,
            receiver_accepted = 0,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(trade_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Store new acceptance flags and status.
pub async fn update_acceptance_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    initiator_accepted: bool,
    receiver_accepted: bool,
    status: TradeStatus,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE trades
        SET initiator_accepted = ?,
            receiver_accepted = ?,
            status = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(initiator_accepted)
    .bind(receiver_accepted)
    .bind(status)
    .bind(trade_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Overwrite the meeting details of a trade.
pub async fn set_meeting_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    time: Option<&str>,
    location: Option<&str>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE trades
        SET meeting_time = ?,
            meeting_location = ?,
            meeting_lat = ?,
            meeting_lng = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(time)
    .bind(location)
    .bind(lat)
    .bind(lng)
    .bind(trade_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Advance a trade's status.
pub async fn set_status_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    status: TradeStatus,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE trades
        SET status = ?,
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(trade_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
