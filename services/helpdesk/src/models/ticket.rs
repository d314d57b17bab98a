//! Ticket model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ticket entity. The owner is fixed at creation; status, priority, type
/// and category are opaque labels with no transition rules.
#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticket_no: String,
    pub subject: String,
    pub status: String,
    pub support_by: String,
    pub date: DateTime<Utc>,
    pub rate: i32,
    pub category: String,
    #[sqlx(rename = "type")]
    pub ticket_type: String,
    pub priority: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket together with its owner's username, as read from the store
#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub ticket: Ticket,
    pub user_username: String,
}

/// Ticket view returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub user_username: String,
    pub ticket_no: String,
    pub subject: String,
    pub status: String,
    pub support_by: String,
    pub date: DateTime<Utc>,
    pub rate: i32,
    pub category: String,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub priority: String,
    pub description: String,
}

impl From<TicketRecord> for TicketResponse {
    fn from(record: TicketRecord) -> Self {
        let t = record.ticket;
        TicketResponse {
            id: t.id,
            user: t.user_id,
            user_username: record.user_username,
            ticket_no: t.ticket_no,
            subject: t.subject,
            status: t.status,
            support_by: t.support_by,
            date: t.date,
            rate: t.rate,
            category: t.category,
            ticket_type: t.ticket_type,
            priority: t.priority,
            description: t.description,
        }
    }
}

/// Ticket creation payload. Any caller-supplied owner is dropped during
/// deserialization; the owner is always the requesting principal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub ticket_no: String,
    pub subject: String,
    pub status: String,
    pub support_by: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rate: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial ticket update. Every field except the owner and id may change;
/// last writer wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub ticket_no: Option<String>,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub support_by: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub rate: Option<i32>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub priority: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_drops_caller_supplied_owner() {
        let req: CreateTicketRequest = serde_json::from_str(
            r#"{
                "ticketNo": "T-1",
                "subject": "printer",
                "status": "open",
                "supportBy": "none",
                "user": "11111111-1111-1111-1111-111111111111",
                "id": "22222222-2222-2222-2222-222222222222"
            }"#,
        )
        .unwrap();

        assert_eq!(req.ticket_no, "T-1");
        assert_eq!(req.subject, "printer");
        assert!(req.rate.is_none());
    }

    #[test]
    fn test_patch_ignores_owner_and_id() {
        let patch: TicketPatch = serde_json::from_str(
            r#"{"status": "closed", "user": "11111111-1111-1111-1111-111111111111", "id": 9}"#,
        )
        .unwrap();

        assert_eq!(patch.status.as_deref(), Some("closed"));
        assert!(patch.subject.is_none());
    }

    #[test]
    fn test_type_field_renames() {
        let patch: TicketPatch = serde_json::from_str(r#"{"type": "hardware"}"#).unwrap();
        assert_eq!(patch.ticket_type.as_deref(), Some("hardware"));

        let record = TicketRecord {
            ticket: Ticket {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                ticket_no: "T-1".to_string(),
                subject: "printer".to_string(),
                status: "open".to_string(),
                support_by: "none".to_string(),
                date: Utc::now(),
                rate: 0,
                category: String::new(),
                ticket_type: "hardware".to_string(),
                priority: String::new(),
                description: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user_username: "alice".to_string(),
        };

        let json = serde_json::to_value(TicketResponse::from(record)).unwrap();
        assert_eq!(json["type"], "hardware");
        assert_eq!(json["ticketNo"], "T-1");
        assert_eq!(json["userUsername"], "alice");
    }
}
