use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Row;
use tracing::debug;
use uuid::Uuid;

use crate::database::get_db_pool;
use crate::models::communication::{CommunicationLogRow, CreateCommunicationLogRow};
use super::errors::RepositoryError;

/// Repository trait for outbound message logs
#[async_trait]
pub trait CommunicationLogRepositoryTrait: Send + Sync {
    /// Record an outbound message attempt
    async fn record(&self, request: CreateCommunicationLogRow) -> Result<CommunicationLogRow, RepositoryError>;

    /// List logged messages for one user, newest first, capped at `limit`
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<CommunicationLogRow>, RepositoryError>;
}

const LOG_COLUMNS: &str =
    "id, user_id, channel, recipient, message, status, sent_at, delivered_at, external_id";

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<CommunicationLogRow> {
    Ok(CommunicationLogRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        channel: row.get(2)?,
        recipient: row.get(3)?,
        message: row.get(4)?,
        status: row.get(5)?,
        sent_at: row.get(6)?,
        delivered_at: row.get(7)?,
        external_id: row.get(8)?,
    })
}

/// SQLite-backed repository for outbound message logs
#[derive(Debug, Clone, Default)]
pub struct CommunicationLogRepository;

impl CommunicationLogRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommunicationLogRepositoryTrait for CommunicationLogRepository {
    async fn record(&self, request: CreateCommunicationLogRow) -> Result<CommunicationLogRow, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let entry = CommunicationLogRow {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            channel: request.channel,
            recipient: request.recipient,
            message: request.message,
            status: request.status,
            sent_at: Utc::now().to_rfc3339(),
            delivered_at: None,
            external_id: request.external_id,
        };

        debug!("Logging {} message {} to {}", entry.channel, entry.id, entry.recipient);

        conn.execute(
            "INSERT INTO communication_logs (id, user_id, channel, recipient, message, status, \
             sent_at, delivered_at, external_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                entry.id,
                entry.user_id,
                entry.channel,
                entry.recipient,
                entry.message,
                entry.status,
                entry.sent_at,
                entry.delivered_at,
                entry.external_id,
            ],
        )?;

        Ok(entry)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<CommunicationLogRow>, RepositoryError> {
        let pool = get_db_pool()?;
        let conn = pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM communication_logs WHERE user_id = ?1 \
             ORDER BY sent_at DESC LIMIT ?2",
            LOG_COLUMNS
        ))?;

        let rows = stmt.query_map(rusqlite::params![user_id, limit as i64], map_log_row)?;

        let mut result = Vec::new();
        for entry in rows {
            result.push(entry?);
        }

        Ok(result)
    }
}

/// Mock communication log repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory implementation of CommunicationLogRepositoryTrait for testing
    #[derive(Default)]
    pub struct MockCommunicationLogRepository {
        entries: Mutex<Vec<CommunicationLogRow>>,
    }

    impl MockCommunicationLogRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of entries recorded so far
        pub async fn len(&self) -> usize {
            self.entries.lock().map(|e| e.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl CommunicationLogRepositoryTrait for MockCommunicationLogRepository {
        async fn record(&self, request: CreateCommunicationLogRow) -> Result<CommunicationLogRow, RepositoryError> {
            let entry = CommunicationLogRow {
                id: Uuid::new_v4().to_string(),
                user_id: request.user_id,
                channel: request.channel,
                recipient: request.recipient,
                message: request.message,
                status: request.status,
                sent_at: Utc::now().to_rfc3339(),
                delivered_at: None,
                external_id: request.external_id,
            };

            self.entries.lock()?.push(entry.clone());
            Ok(entry)
        }

        async fn list_for_user(
            &self,
            user_id: &str,
            limit: usize,
        ) -> Result<Vec<CommunicationLogRow>, RepositoryError> {
            let entries = self.entries.lock()?;
            let mut matching: Vec<CommunicationLogRow> = entries
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
            matching.truncate(limit);
            Ok(matching)
        }
    }

    #[cfg(test)]
    #[tokio::test]
    async fn test_mock_record_and_list() {
        let repo = MockCommunicationLogRepository::new();

        let entry = repo
            .record(CreateCommunicationLogRow {
                user_id: "asha-1".to_string(),
                channel: "sms".to_string(),
                recipient: "9876543210".to_string(),
                message: "Checkup reminder".to_string(),
                status: "sent".to_string(),
                external_id: None,
            })
            .await
            .unwrap();

        assert_eq!(entry.channel, "sms");
        assert_eq!(entry.status, "sent");

        let listed = repo.list_for_user("asha-1", 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipient, "9876543210");
    }
}
