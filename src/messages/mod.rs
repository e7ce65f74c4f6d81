//! Message persistence

use crate::{db::Database, models::Message, queue::OutboxQueue};

/// Persists messages together with their outbox rows
#[derive(Clone)]
pub struct MessageStore {
    db: Database,
    outbox: OutboxQueue,
}

impl MessageStore {
    pub fn new(db: Database, outbox: OutboxQueue) -> Self {
        Self { db, outbox }
    }

    /// Insert a message and its outbox row under a single transaction.
    /// Either both persist or neither does.
    pub async fn create_message(
        &self,
        content: &str,
        phone_number: &str,
    ) -> Result<Message, sqlx::Error> {
        let message = Message::new(content, phone_number);
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, content, phone_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&message.id)
        .bind(&message.content)
        .bind(&message.phone_number)
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&mut *tx)
        .await?;

        self.outbox
            .enqueue(&mut tx, &message.id, &message.content, &message.phone_number)
            .await?;

        tx.commit().await?;

        tracing::info!(message_id = %message.id, "message stored with outbox entry");
        Ok(message)
    }

    /// List all stored messages, oldest first
    pub async fn list_messages(&self) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            "SELECT id, content, phone_number, created_at, updated_at FROM messages ORDER BY created_at",
        )
        .fetch_all(&self.db.pool)
        .await
    }
}
