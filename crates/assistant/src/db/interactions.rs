//! Database operations for the interaction log.
//!
//! The log is append-only: records are never updated or deleted, and
//! retrieval is always newest first.

use chrono::Utc;
use sqlx::SqlitePool;

use jacaranda_core::InteractionId;

use super::RepositoryError;
use crate::models::Interaction;

/// Timestamp format stored with each record (second precision, UTC).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for interaction queries.
#[derive(Debug, sqlx::FromRow)]
struct InteractionRow {
    id: i64,
    timestamp: String,
    user_prompt: String,
    agent_response: String,
}

impl From<InteractionRow> for Interaction {
    fn from(row: InteractionRow) -> Self {
        Self {
            id: InteractionId::new(row.id),
            timestamp: row.timestamp,
            user_prompt: row.user_prompt,
            agent_response: row.agent_response,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for interaction log operations.
pub struct InteractionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InteractionRepository<'a> {
    /// Create a new interaction repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one record with a server-generated timestamp.
    ///
    /// Every successful request writes exactly one record through this
    /// method.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails - storage
    /// errors propagate, they are never swallowed.
    pub async fn append(
        &self,
        user_prompt: &str,
        agent_response: &str,
    ) -> Result<Interaction, RepositoryError> {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        let row: InteractionRow = sqlx::query_as(
            r"
            INSERT INTO interactions (timestamp, user_prompt, agent_response)
            VALUES (?1, ?2, ?3)
            RETURNING id, timestamp, user_prompt, agent_response
            ",
        )
        .bind(&timestamp)
        .bind(user_prompt)
        .bind(agent_response)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// All records, newest first.
    ///
    /// Ordered by timestamp descending; id descending breaks ties between
    /// records logged within the same second.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Interaction>, RepositoryError> {
        let rows: Vec<InteractionRow> = sqlx::query_as(
            r"
            SELECT id, timestamp, user_prompt, agent_response
            FROM interactions
            ORDER BY timestamp DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let pool = test_pool().await;
        let repo = InteractionRepository::new(&pool);

        let first = repo.append("oi", "olá!").await.unwrap();
        let second = repo.append("tem casaco?", "temos sim").await.unwrap();

        assert!(second.id.as_i64() > first.id.as_i64());
        assert_eq!(first.user_prompt, "oi");
        assert_eq!(first.agent_response, "olá!");
    }

    #[tokio::test]
    async fn test_append_timestamp_has_second_precision() {
        let pool = test_pool().await;
        let repo = InteractionRepository::new(&pool);

        let record = repo.append("oi", "olá!").await.unwrap();
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(record.timestamp.len(), 19);
        assert!(
            chrono::NaiveDateTime::parse_from_str(&record.timestamp, "%Y-%m-%d %H:%M:%S").is_ok()
        );
    }

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let pool = test_pool().await;
        let repo = InteractionRepository::new(&pool);

        repo.append("primeira", "resposta 1").await.unwrap();
        repo.append("segunda", "resposta 2").await.unwrap();
        repo.append("terceira", "resposta 3").await.unwrap();

        let records = repo.list().await.unwrap();
        assert_eq!(records.len(), 3);
        // Same-second appends fall back to id descending.
        assert_eq!(records[0].user_prompt, "terceira");
        assert_eq!(records[1].user_prompt, "segunda");
        assert_eq!(records[2].user_prompt, "primeira");
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let pool = test_pool().await;
        let repo = InteractionRepository::new(&pool);

        repo.append("oi", "olá!").await.unwrap();

        let first = repo.list().await.unwrap();
        let second = repo.list().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_append_increments_count_by_one() {
        let pool = test_pool().await;
        let repo = InteractionRepository::new(&pool);

        assert_eq!(repo.list().await.unwrap().len(), 0);
        repo.append("oi", "olá!").await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
