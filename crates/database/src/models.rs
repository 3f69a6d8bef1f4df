//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A marketplace user with their progression counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// UUID string.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL or path.
    pub image: String,
    /// Progression level, 1 through 50.
    pub level: i64,
    /// Experience accumulated toward the next level.
    pub experience: i64,
    /// Number of trades this user has completed.
    pub completed_trades: i64,
    /// Number of 4+ star reviews received.
    pub positive_reviews: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A clothing listing offered for swapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Listing {
    /// UUID string.
    pub id: String,
    /// Owning user.
    pub owner_id: String,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// One of: tops, bottoms, dresses, shoes, accessories.
    pub category: String,
    /// Garment size label.
    pub size: String,
    /// One of: new, like_new, good, fair, poor.
    pub condition: String,
    /// One of: available, pending, swapped.
    pub status: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Lifecycle state of a trade.
///
/// Only forward transitions are legal: `Pending → Accepted → Completed`.
/// `Cancelled` is terminal and currently has no exposed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl TradeStatus {
    /// Get the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Accepted => "accepted",
            TradeStatus::Completed => "completed",
            TradeStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further mutation is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TradeStatus::Completed | TradeStatus::Cancelled)
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party of a trade an offer item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Side {
    Initiator,
    Receiver,
}

impl Side {
    /// The opposite party.
    pub fn other(&self) -> Side {
        match self {
            Side::Initiator => Side::Receiver,
            Side::Receiver => Side::Initiator,
        }
    }
}

/// A two-party trade negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trade {
    /// UUID string.
    pub id: String,
    /// User who proposed the trade.
    pub initiator_id: String,
    /// User the trade was proposed to.
    pub receiver_id: String,
    /// Initiator's consent to the current offer state.
    pub initiator_accepted: bool,
    /// Receiver's consent to the current offer state.
    pub receiver_accepted: bool,
    /// Lifecycle state.
    pub status: TradeStatus,
    /// Agreed meeting time (RFC 3339), once accepted.
    pub meeting_time: Option<String>,
    /// Agreed meeting place description.
    pub meeting_location: Option<String>,
    /// Meeting latitude.
    pub meeting_lat: Option<f64>,
    /// Meeting longitude.
    pub meeting_lng: Option<f64>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// One listing inside a trade offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TradeItem {
    /// Owning trade.
    pub trade_id: String,
    /// The listing being offered.
    pub listing_id: String,
    /// Owner of record at proposal time.
    pub owner_id: String,
    /// Which party offers this item.
    pub side: Side,
    /// Order within the side's offer list.
    pub position: i64,
}

/// The message log paired 1:1 with a trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Chat {
    /// UUID string.
    pub id: String,
    /// The trade this chat belongs to.
    pub trade_id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp (touched on every append).
    pub updated_at: String,
}

/// Kind of chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MessageKind {
    /// User-authored text.
    Text,
    /// System entry recording a negotiation state change.
    TradeUpdate,
    /// System entry carrying a pinned meeting location.
    MeetingPin,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing id; also the append order.
    pub id: i64,
    /// Owning chat.
    pub chat_id: String,
    /// Acting user the message is attributed to.
    pub sender_id: String,
    /// Message body.
    pub content: String,
    /// Message kind.
    pub kind: MessageKind,
    /// Creation timestamp.
    pub created_at: String,
}

/// A post-completion rating, one per (trade, reviewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    /// The completed trade being reviewed.
    pub trade_id: String,
    /// Participant who wrote the review.
    pub reviewer_id: String,
    /// The other participant.
    pub reviewed_id: String,
    /// Star rating, 1 through 5.
    pub rating: i64,
    /// Free-form comment.
    pub comment: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp (touched on resubmission).
    pub updated_at: String,
}

/// A review joined with both parties' display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReviewWithNames {
    pub trade_id: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub reviewed_id: String,
    pub reviewed_name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}
