//! Audit log model and related payloads

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only audit log entry
#[derive(Debug, Clone, FromRow)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

/// Audit log view: the actor is rendered as their username
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryResponse {
    pub id: Uuid,
    pub user: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}
