//! Audit log repository
//!
//! Append-only: entries are written once and never updated or deleted.

use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{LogEntry, LogEntryResponse};

/// Audit log repository
#[derive(Clone)]
pub struct LogHistoryRepository {
    pool: PgPool,
}

impl LogHistoryRepository {
    /// Create a new audit log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry for a user action. The timestamp defaults to now.
    pub async fn record(&self, user_id: Uuid, action: &str, details: &str) -> Result<LogEntry> {
        if action.is_empty() {
            anyhow::bail!("audit action must not be empty");
        }

        let row = sqlx::query(
            r#"
            INSERT INTO log_history (user_id, action, details)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, action, timestamp, details
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(details)
        .fetch_one(&self.pool)
        .await?;

        Ok(LogEntry {
            id: row.get("id"),
            user_id: row.get("user_id"),
            action: row.get("action"),
            timestamp: row.get("timestamp"),
            details: row.get("details"),
        })
    }

    /// List every entry, newest first
    pub async fn list(&self) -> Result<Vec<LogEntryResponse>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, u.username, l.action, l.timestamp, l.details
            FROM log_history l
            JOIN users u ON u.id = l.user_id
            ORDER BY l.timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| LogEntryResponse {
                id: row.get("id"),
                user: row.get("username"),
                action: row.get("action"),
                timestamp: row.get("timestamp"),
                details: row.get("details"),
            })
            .collect();

        Ok(entries)
    }
}
