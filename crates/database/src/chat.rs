//! Chat and message persistence.
//!
//! Messages are append-only. The "last message" of a chat is derived from
//! the highest message id rather than stored on the chat row, so the log
//! can never diverge from the derived value.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Chat, Message, MessageKind};

const CHAT_COLUMNS: &str = "id, trade_id, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, content, kind, created_at";

/// Insert the chat paired with a trade.
pub async fn create_chat_tx(conn: &mut SqliteConnection, id: &str, trade_id: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chats (id, trade_id)
        VALUES (?, ?)
        "#,
    )
    .bind(id)
    .bind(trade_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Chat",
                    id: trade_id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a chat by ID.
pub async fn get_chat(pool: &SqlitePool, id: &str) -> Result<Chat> {
    sqlx::query_as::<_, Chat>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Chat",
            id: id.to_string(),
        })
}

/// Get the chat paired with a trade.
pub async fn get_chat_by_trade(pool: &SqlitePool, trade_id: &str) -> Result<Chat> {
    sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE trade_id = ?"
    ))
    .bind(trade_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Chat",
        id: trade_id.to_string(),
    })
}

/// Get the chat paired with a trade, within a transaction.
pub async fn get_chat_by_trade_tx(conn: &mut SqliteConnection, trade_id: &str) -> Result<Chat> {
    sqlx::query_as::<_, Chat>(&format!(
        "SELECT {CHAT_COLUMNS} FROM chats WHERE trade_id = ?"
    ))
    .bind(trade_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Chat",
        id: trade_id.to_string(),
    })
}

/// List every chat a user participates in, most recently active first.
///
/// Participation comes from the paired trade; chats have no participant
/// list of their own.
pub async fn list_chats_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Chat>> {
    let chats = sqlx::query_as::<_, Chat>(
        r#"
        SELECT c.id, c.trade_id, c.created_at, c.updated_at
        FROM chats c
        JOIN trades t ON t.id = c.trade_id
        WHERE t.initiator_id = ? OR t.receiver_id = ?
        ORDER BY c.updated_at DESC, c.id DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(chats)
}

/// Append a message to a chat and touch the chat's activity timestamp.
pub async fn append_message_tx(
    conn: &mut SqliteConnection,
    chat_id: &str,
    sender_id: &str,
    content: &str,
    kind: MessageKind,
) -> Result<Message> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (chat_id, sender_id, content, kind)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(chat_id)
    .bind(sender_id)
    .bind(content)
    .bind(kind)
    .execute(&mut *conn)
    .await?;

    let message_id = result.last_insert_rowid();

    sqlx::query(
        r#"
        UPDATE chats
        SET updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(chat_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query_as::<_, Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"
    ))
    .bind(message_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Message",
        id: message_id.to_string(),
    })
}

/// Get a chat's full message log in append order.
pub async fn list_messages(pool: &SqlitePool, chat_id: &str) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? ORDER BY id"
    ))
    .bind(chat_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Derive the most recent message of a chat, if any.
pub async fn last_message(pool: &SqlitePool, chat_id: &str) -> Result<Option<Message>> {
    let message = sqlx::query_as::<_, Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ? ORDER BY id DESC LIMIT 1"
    ))
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(message)
}
