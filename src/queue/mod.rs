//! PostgreSQL-backed transactional outbox queue

pub mod worker;

use std::fmt::Display;
use std::future::Future;

use sqlx::{Postgres, Transaction};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    db::Database,
    models::{MessagePayload, OutboxEntry},
};

/// Queue of pending webhook deliveries, one row per stored message
#[derive(Clone)]
pub struct OutboxQueue {
    db: Database,
}

impl OutboxQueue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert an outbox row under the caller's transaction. The payload is a
    /// snapshot of the message at enqueue time; the generated id is assigned
    /// on insert.
    pub async fn enqueue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        message_id: &str,
        content: &str,
        phone_number: &str,
    ) -> Result<i64, sqlx::Error> {
        let payload = serde_json::to_value(MessagePayload {
            id: message_id.to_string(),
            content: content.to_string(),
            phone_number: phone_number.to_string(),
        })
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let now = chrono::Utc::now();
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO outbox (message_id, payload, sent, created_at, updated_at)
            VALUES ($1, $2, FALSE, $3, $3)
            RETURNING id
            "#,
        )
        .bind(message_id)
        .bind(&payload)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        tracing::debug!(outbox_id = id, message_id = %message_id, "outbox entry enqueued");
        Ok(id)
    }

    /// Fetch up to `limit` unsent entries, oldest first (ties broken by id)
    pub async fn fetch_unsent(&self, limit: i64) -> Result<Vec<OutboxEntry>, sqlx::Error> {
        sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT id, message_id, payload, sent, created_at, updated_at
            FROM outbox
            WHERE sent = FALSE
            ORDER BY created_at, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await
    }

    /// Mark the given entries as sent in one statement. Idempotent; a no-op
    /// on empty input.
    pub async fn mark_sent(&self, ids: &[i64]) -> Result<(), sqlx::Error> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("UPDATE outbox SET sent = TRUE, updated_at = NOW() WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db.pool)
            .await?;

        tracing::info!(count = ids.len(), "outbox entries marked as sent");
        Ok(())
    }

    /// Fetch a batch of unsent entries and drive each through `handler` in
    /// FIFO order. A handler failure skips that entry and the batch
    /// continues; entries whose handler succeeded are marked sent in one
    /// statement afterwards, even when the token or deadline stopped the
    /// batch early. Returns the number of entries processed successfully.
    pub async fn process_unsent<F, Fut, E>(
        &self,
        limit: i64,
        token: &CancellationToken,
        deadline: Instant,
        handler: F,
    ) -> Result<usize, sqlx::Error>
    where
        F: Fn(OutboxEntry) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let entries = self.fetch_unsent(limit).await?;
        if entries.is_empty() {
            tracing::debug!("no unsent outbox entries");
            return Ok(0);
        }

        tracing::info!(count = entries.len(), "processing unsent outbox entries");

        let (processed, successful) = drive_entries(entries, token, deadline, handler).await;

        if !successful.is_empty() {
            if let Err(e) = self.mark_sent(&successful).await {
                tracing::error!(
                    processed,
                    ids = ?successful,
                    error = %e,
                    "failed to mark outbox entries as sent; they will be redelivered"
                );
                return Err(e);
            }
        }

        Ok(processed)
    }
}

/// Drive a fetched batch through `handler`, stopping before the next entry
/// once the token is cancelled or the deadline has passed. Returns the
/// processed count and the ids whose handler succeeded, in dispatch order.
async fn drive_entries<F, Fut, E>(
    entries: Vec<OutboxEntry>,
    token: &CancellationToken,
    deadline: Instant,
    handler: F,
) -> (usize, Vec<i64>)
where
    F: Fn(OutboxEntry) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let total = entries.len();
    let mut successful = Vec::new();
    let mut processed = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        if token.is_cancelled() || Instant::now() >= deadline {
            tracing::warn!(
                remaining = total - index,
                "batch stopped early; remaining entries wait for the next tick"
            );
            break;
        }

        let outbox_id = entry.id;
        let message_id = entry.message_id.clone();
        match handler(entry).await {
            Ok(()) => {
                successful.push(outbox_id);
                processed += 1;
            }
            Err(e) => {
                tracing::error!(
                    outbox_id,
                    message_id = %message_id,
                    error = %e,
                    "failed to process outbox entry"
                );
            }
        }
    }

    (processed, successful)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn entry(id: i64) -> OutboxEntry {
        OutboxEntry {
            id,
            message_id: format!("m{id}"),
            payload: json!({"id": format!("m{id}"), "content": "hi", "phoneNumber": "+1"}),
            sent: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn batch_runs_in_fifo_order() {
        let calls: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));
        let token = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_secs(60);

        let (processed, successful) = drive_entries(
            vec![entry(1), entry(2), entry(3)],
            &token,
            deadline,
            |e: OutboxEntry| {
                let calls = calls.clone();
                async move {
                    calls.lock().unwrap().push(e.id);
                    Ok::<(), String>(())
                }
            },
        )
        .await;

        assert_eq!(processed, 3);
        assert_eq!(successful, vec![1, 2, 3]);
        assert_eq!(*calls.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn one_failure_does_not_poison_the_batch() {
        let token = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_secs(60);

        let (processed, successful) = drive_entries(
            vec![entry(1), entry(2), entry(3)],
            &token,
            deadline,
            |e: OutboxEntry| async move {
                if e.message_id == "m2" {
                    Err("rejected with status 500".to_string())
                } else {
                    Ok(())
                }
            },
        )
        .await;

        assert_eq!(processed, 2);
        assert_eq!(successful, vec![1, 3]);
    }

    #[tokio::test]
    async fn cancelled_token_starts_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let deadline = Instant::now() + Duration::from_secs(60);

        let (processed, successful) = drive_entries(
            vec![entry(1), entry(2)],
            &token,
            deadline,
            |_| async { Ok::<(), String>(()) },
        )
        .await;

        assert_eq!(processed, 0);
        assert!(successful.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_the_batch_to_a_prefix() {
        let token = CancellationToken::new();
        let deadline = Instant::now() + Duration::from_millis(2500);

        let (processed, successful) = drive_entries(
            (1..=10).map(entry).collect(),
            &token,
            deadline,
            |_| async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<(), String>(())
            },
        )
        .await;

        // Entries start at t=0s, 1s and 2s; the one that would start at 3s
        // is past the 2.5s deadline.
        assert_eq!(processed, 3);
        assert_eq!(successful, vec![1, 2, 3]);
    }
}
