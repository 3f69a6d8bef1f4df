//! The chat log: user messages and participant-scoped reads.
//!
//! System messages recording negotiation state changes are appended only by
//! the trade state machine inside its own transactions; this module never
//! lets a caller pick an arbitrary message kind.

use serde::Serialize;
use sqlx::SqlitePool;

use database::models::{Chat, Message, MessageKind};
use database::{chat as chat_store, trade as trade_store};

use crate::error::{MarketError, Result};
use crate::trades::participant_side;

/// A chat with its derived last message, for the chat index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOverview {
    #[serde(flatten)]
    pub chat: Chat,
    pub last_message: Option<Message>,
}

/// Append a user text message to a chat.
pub async fn send_message(
    pool: &SqlitePool,
    chat_id: &str,
    sender: &str,
    content: &str,
) -> Result<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(MarketError::Validation(
            "message content must not be empty".to_string(),
        ));
    }

    let chat = chat_store::get_chat(pool, chat_id).await?;
    ensure_participant(pool, &chat, sender).await?;

    let mut tx = pool.begin().await.map_err(database::DatabaseError::from)?;
    let message =
        chat_store::append_message_tx(&mut tx, chat_id, sender, content, MessageKind::Text).await?;
    tx.commit().await.map_err(database::DatabaseError::from)?;

    Ok(message)
}

/// Fetch a chat's full ordered message log; participants only.
pub async fn messages(pool: &SqlitePool, chat_id: &str, requester: &str) -> Result<Vec<Message>> {
    let chat = chat_store::get_chat(pool, chat_id).await?;
    ensure_participant(pool, &chat, requester).await?;

    Ok(chat_store::list_messages(pool, chat_id).await?)
}

/// List the requester's chats, most recently active first, each with its
/// derived last message.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<ChatOverview>> {
    let chats = chat_store::list_chats_for_user(pool, user_id).await?;

    let mut overviews = Vec::with_capacity(chats.len());
    for chat in chats {
        let last_message = chat_store::last_message(pool, &chat.id).await?;
        overviews.push(ChatOverview { chat, last_message });
    }

    Ok(overviews)
}

/// Chat participants are the two parties of the paired trade.
async fn ensure_participant(pool: &SqlitePool, chat: &Chat, user_id: &str) -> Result<()> {
    let trade = trade_store::get_trade(pool, &chat.trade_id).await?;
    participant_side(&trade, user_id)?;
    Ok(())
}
