//! The trade negotiation state machine.
//!
//! A trade moves `Pending → Accepted → Completed`; `Cancelled` is a defined
//! terminal state with no exposed trigger. Every state-changing operation
//! runs in one transaction covering the trade row, the participants'
//! progression counters where applicable, and exactly one system message in
//! the paired chat, so the chat log is a complete audit trail of the
//! negotiation.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use database::models::{Side, Trade, TradeItem, TradeStatus};
use database::MessageKind;
use database::{chat as chat_store, listing as listing_store, trade as trade_store,
    user as user_store};

use crate::error::{MarketError, Result};
use crate::progression;

/// A trade together with both resolved offer lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeDetails {
    #[serde(flatten)]
    pub trade: Trade,
    pub initiator_items: Vec<TradeItem>,
    pub receiver_items: Vec<TradeItem>,
}

/// Meeting details for an accepted trade.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingInput {
    /// RFC 3339 meeting time.
    pub time: String,
    /// Meeting place description.
    pub location: String,
    /// Optional latitude.
    pub lat: Option<f64>,
    /// Optional longitude.
    pub lng: Option<f64>,
}

/// Resolve which side of the trade the acting user is on, or refuse.
pub(crate) fn participant_side(trade: &Trade, user_id: &str) -> Result<Side> {
    if trade.initiator_id == user_id {
        Ok(Side::Initiator)
    } else if trade.receiver_id == user_id {
        Ok(Side::Receiver)
    } else {
        Err(MarketError::Forbidden(format!(
            "user {user_id} is not a participant of trade {}",
            trade.id
        )))
    }
}

/// Check that every listing id exists and is owned by `owner_id`, returning
/// the offer list for `side`. Runs inside the caller's transaction so a
/// failure aborts the whole operation with no side effects.
async fn validated_offer_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    listing_ids: &[String],
    owner_id: &str,
    side: Side,
) -> Result<Vec<TradeItem>> {
    let mut items = Vec::with_capacity(listing_ids.len());

    for (position, listing_id) in listing_ids.iter().enumerate() {
        let listing = listing_store::find_listing_tx(conn, listing_id)
            .await?
            .ok_or_else(|| {
                MarketError::Validation(format!("offered item {listing_id} does not exist"))
            })?;

        if listing.owner_id != owner_id {
            return Err(MarketError::Validation(format!(
                "offered item {listing_id} is not owned by user {owner_id}"
            )));
        }

        items.push(TradeItem {
            trade_id: trade_id.to_string(),
            listing_id: listing_id.clone(),
            owner_id: owner_id.to_string(),
            side,
            position: position as i64,
        });
    }

    Ok(items)
}

/// Propose a trade: create it in `Pending` with both acceptance flags false,
/// together with its paired chat.
pub async fn propose(
    pool: &SqlitePool,
    initiator_id: &str,
    receiver_id: &str,
    initiator_listings: &[String],
    receiver_listings: &[String],
) -> Result<TradeDetails> {
    if initiator_id == receiver_id {
        return Err(MarketError::Validation(
            "cannot open a trade with yourself".to_string(),
        ));
    }
    if initiator_listings.is_empty() {
        return Err(MarketError::Validation(
            "a trade proposal must offer at least one item".to_string(),
        ));
    }

    let trade_id = Uuid::new_v4().to_string();
    let chat_id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    // Both parties must exist before we validate item ownership against them.
    user_store::get_user_tx(&mut tx, initiator_id).await?;
    user_store::get_user_tx(&mut tx, receiver_id).await?;

    let mut items =
        validated_offer_tx(&mut tx, &trade_id, initiator_listings, initiator_id, Side::Initiator)
            .await?;
    items.extend(
        validated_offer_tx(&mut tx, &trade_id, receiver_listings, receiver_id, Side::Receiver)
            .await?,
    );

    trade_store::create_trade_tx(&mut tx, &trade_id, initiator_id, receiver_id, &items).await?;
    chat_store::create_chat_tx(&mut tx, &chat_id, &trade_id).await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    tracing::info!(trade = %trade_id, initiator = %initiator_id, receiver = %receiver_id,
        "Trade proposed");

    get(pool, &trade_id, initiator_id).await
}

/// Replace the receiver's offered items, invalidating both parties' consent.
pub async fn update_offer(
    pool: &SqlitePool,
    trade_id: &str,
    acting_user: &str,
    new_receiver_listings: &[String],
) -> Result<TradeDetails> {
    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    let trade = trade_store::get_trade_tx(&mut tx, trade_id).await?;
    participant_side(&trade, acting_user)?;

    // A counter-offer only makes sense while the trade is still open; once
    // accepted the offer is fixed (status never regresses).
    if trade.status != TradeStatus::Pending {
        return Err(MarketError::InvalidState(format!(
            "cannot update the offer of a {} trade",
            trade.status
        )));
    }

    let items = validated_offer_tx(
        &mut tx,
        trade_id,
        new_receiver_listings,
        &trade.receiver_id,
        Side::Receiver,
    )
    .await?;

    trade_store::replace_offer_tx(&mut tx, trade_id, Side::Receiver, &items).await?;
    append_trade_update_tx(&mut tx, trade_id, acting_user, "Trade offer updated").await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    tracing::info!(trade = %trade_id, user = %acting_user, "Trade offer updated");

    get(pool, trade_id, acting_user).await
}

/// Record the acting user's consent to the current offer. When both parties
/// have consented the trade moves to `Accepted`. Re-accepting is a no-op
/// beyond the idempotent flag set.
pub async fn accept(pool: &SqlitePool, trade_id: &str, acting_user: &str) -> Result<TradeDetails> {
    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    let trade = trade_store::get_trade_tx(&mut tx, trade_id).await?;
    let side = participant_side(&trade, acting_user)?;

    if trade.status.is_terminal() {
        return Err(MarketError::InvalidState(format!(
            "cannot accept a {} trade",
            trade.status
        )));
    }

    let (initiator_accepted, receiver_accepted) = match side {
        Side::Initiator => (true, trade.receiver_accepted),
        Side::Receiver => (trade.initiator_accepted, true),
    };
    let status = if initiator_accepted && receiver_accepted {
        TradeStatus::Accepted
    } else {
        trade.status
    };

    trade_store::update_acceptance_tx(&mut tx, trade_id, initiator_accepted, receiver_accepted, status)
        .await?;
    append_trade_update_tx(&mut tx, trade_id, acting_user, "Trade accepted").await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    tracing::info!(trade = %trade_id, user = %acting_user, status = %status, "Trade accepted");

    get(pool, trade_id, acting_user).await
}

/// Overwrite the meeting details of an accepted trade.
pub async fn set_meeting(
    pool: &SqlitePool,
    trade_id: &str,
    acting_user: &str,
    meeting: &MeetingInput,
) -> Result<TradeDetails> {
    if chrono::DateTime::parse_from_rfc3339(&meeting.time).is_err() {
        return Err(MarketError::Validation(format!(
            "meeting time is not a valid RFC 3339 timestamp: {}",
            meeting.time
        )));
    }
    if meeting.location.trim().is_empty() {
        return Err(MarketError::Validation(
            "meeting location must not be empty".to_string(),
        ));
    }

    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    let trade = trade_store::get_trade_tx(&mut tx, trade_id).await?;
    participant_side(&trade, acting_user)?;

    if trade.status != TradeStatus::Accepted {
        return Err(MarketError::InvalidState(format!(
            "meeting details can only be set on an accepted trade, not a {} one",
            trade.status
        )));
    }

    trade_store::set_meeting_tx(
        &mut tx,
        trade_id,
        Some(&meeting.time),
        Some(meeting.location.trim()),
        meeting.lat,
        meeting.lng,
    )
    .await?;
    append_trade_update_tx(&mut tx, trade_id, acting_user, "Meeting details updated").await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    get(pool, trade_id, acting_user).await
}

/// Complete an accepted trade: advance the status, credit experience and the
/// completed-trade counter to both participants, and record the result in
/// the chat, all in one transaction.
pub async fn complete(pool: &SqlitePool, trade_id: &str, acting_user: &str) -> Result<TradeDetails> {
    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;

    let trade = trade_store::get_trade_tx(&mut tx, trade_id).await?;
    participant_side(&trade, acting_user)?;

    if trade.status != TradeStatus::Accepted {
        return Err(MarketError::InvalidState(format!(
            "only an accepted trade can be completed, this one is {}",
            trade.status
        )));
    }

    let items = trade_store::get_trade_items_tx(&mut tx, trade_id).await?;
    let earned = progression::trade_experience(items.len());

    trade_store::set_status_tx(&mut tx, trade_id, TradeStatus::Completed).await?;

    for user_id in [&trade.initiator_id, &trade.receiver_id] {
        let user = user_store::get_user_tx(&mut tx, user_id).await?;
        let (level, experience) =
            progression::apply_experience(user.level, user.experience, earned);
        user_store::record_completed_trade_tx(&mut tx, user_id, level, experience).await?;
    }

    let summary = format!(
        "Trade completed successfully! Earned {earned} XP for trading {} items.",
        items.len()
    );
    append_trade_update_tx(&mut tx, trade_id, acting_user, &summary).await?;

    tx.commit().await.map_err(database::DatabaseError::from)?;

    tracing::info!(trade = %trade_id, user = %acting_user, xp = earned, "Trade completed");

    get(pool, trade_id, acting_user).await
}

/// Fetch a trade with its offer lists; participants only.
pub async fn get(pool: &SqlitePool, trade_id: &str, requester: &str) -> Result<TradeDetails> {
    let trade = trade_store::get_trade(pool, trade_id).await?;
    participant_side(&trade, requester)?;

    let items = trade_store::get_trade_items(pool, trade_id).await?;
    let (initiator_items, receiver_items): (Vec<TradeItem>, Vec<TradeItem>) = items
        .into_iter()
        .partition(|item| item.side == Side::Initiator);

    Ok(TradeDetails {
        trade,
        initiator_items,
        receiver_items,
    })
}

/// List the requester's trades, most recently updated first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Trade>> {
    Ok(trade_store::list_trades_for_user(pool, user_id).await?)
}

/// Append the single system message that records a state change, inside the
/// same transaction as the change itself.
async fn append_trade_update_tx(
    conn: &mut SqliteConnection,
    trade_id: &str,
    acting_user: &str,
    content: &str,
) -> Result<()> {
    let chat = chat_store::get_chat_by_trade_tx(conn, trade_id).await?;
    chat_store::append_message_tx(conn, &chat.id, acting_user, content, MessageKind::TradeUpdate)
        .await?;
    Ok(())
}
