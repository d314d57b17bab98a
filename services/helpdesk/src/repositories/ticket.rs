//! Ticket repository for database operations
//!
//! Every read and write takes a [`TicketScope`]; a ticket outside the
//! scope behaves exactly like a ticket that does not exist.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{CreateTicketRequest, Ticket, TicketPatch, TicketRecord};
use crate::policy::TicketScope;

const TICKET_COLUMNS: &str = r#"t.id, t.user_id, t.ticket_no, t.subject, t.status, t.support_by,
       t.date, t.rate, t.category, t.type, t.priority, t.description,
       t.created_at, t.updated_at, u.username AS user_username"#;

/// Ticket repository
#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

fn record_from_row(row: &PgRow) -> TicketRecord {
    TicketRecord {
        ticket: Ticket {
            id: row.get("id"),
            user_id: row.get("user_id"),
            ticket_no: row.get("ticket_no"),
            subject: row.get("subject"),
            status: row.get("status"),
            support_by: row.get("support_by"),
            date: row.get("date"),
            rate: row.get("rate"),
            category: row.get("category"),
            ticket_type: row.get("type"),
            priority: row.get("priority"),
            description: row.get("description"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        user_username: row.get("user_username"),
    }
}

impl TicketRepository {
    /// Create a new ticket repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every ticket within the scope, newest first
    pub async fn list(&self, scope: &TicketScope) -> Result<Vec<TicketRecord>> {
        let rows = match scope {
            TicketScope::All => {
                let query = format!(
                    r#"
                    SELECT {TICKET_COLUMNS}
                    FROM tickets t
                    JOIN users u ON u.id = t.user_id
                    ORDER BY t.date DESC
                    "#
                );
                sqlx::query(&query).fetch_all(&self.pool).await?
            }
            TicketScope::OwnedBy(owner) => {
                let query = format!(
                    r#"
                    SELECT {TICKET_COLUMNS}
                    FROM tickets t
                    JOIN users u ON u.id = t.user_id
                    WHERE t.user_id = $1
                    ORDER BY t.date DESC
                    "#
                );
                sqlx::query(&query).bind(owner).fetch_all(&self.pool).await?
            }
        };

        Ok(rows.iter().map(record_from_row).collect())
    }

    /// Create a ticket owned by `owner`. Optional fields fall back to the
    /// store defaults (date = now, rate = 0, labels empty).
    pub async fn create(&self, owner: Uuid, req: &CreateTicketRequest) -> Result<Ticket> {
        let row = sqlx::query(
            r#"
            INSERT INTO tickets
                (user_id, ticket_no, subject, status, support_by,
                 date, rate, category, type, priority, description)
            VALUES ($1, $2, $3, $4, $5,
                    COALESCE($6, now()), COALESCE($7, 0),
                    COALESCE($8, ''), COALESCE($9, ''), COALESCE($10, ''), COALESCE($11, ''))
            RETURNING id, user_id, ticket_no, subject, status, support_by,
                      date, rate, category, type, priority, description,
                      created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(&req.ticket_no)
        .bind(&req.subject)
        .bind(&req.status)
        .bind(&req.support_by)
        .bind(req.date)
        .bind(req.rate)
        .bind(req.category.as_deref())
        .bind(req.ticket_type.as_deref())
        .bind(req.priority.as_deref())
        .bind(req.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(Ticket {
            id: row.get("id"),
            user_id: row.get("user_id"),
            ticket_no: row.get("ticket_no"),
            subject: row.get("subject"),
            status: row.get("status"),
            support_by: row.get("support_by"),
            date: row.get("date"),
            rate: row.get("rate"),
            category: row.get("category"),
            ticket_type: row.get("type"),
            priority: row.get("priority"),
            description: row.get("description"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Find a single ticket within the scope
    pub async fn find(&self, scope: &TicketScope, id: Uuid) -> Result<Option<TicketRecord>> {
        let row = match scope {
            TicketScope::All => {
                let query = format!(
                    r#"
                    SELECT {TICKET_COLUMNS}
                    FROM tickets t
                    JOIN users u ON u.id = t.user_id
                    WHERE t.id = $1
                    "#
                );
                sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?
            }
            TicketScope::OwnedBy(owner) => {
                let query = format!(
                    r#"
                    SELECT {TICKET_COLUMNS}
                    FROM tickets t
                    JOIN users u ON u.id = t.user_id
                    WHERE t.id = $1 AND t.user_id = $2
                    "#
                );
                sqlx::query(&query)
                    .bind(id)
                    .bind(owner)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(row.as_ref().map(record_from_row))
    }

    /// Partially update a ticket within the scope. Absent patch fields keep
    /// their stored values; the owner and id never change. No version
    /// check: concurrent writers race and the last one wins.
    pub async fn update(
        &self,
        scope: &TicketScope,
        id: Uuid,
        patch: &TicketPatch,
    ) -> Result<Option<TicketRecord>> {
        let set_clause = r#"
            SET ticket_no = COALESCE($2, t.ticket_no),
                subject = COALESCE($3, t.subject),
                status = COALESCE($4, t.status),
                support_by = COALESCE($5, t.support_by),
                date = COALESCE($6, t.date),
                rate = COALESCE($7, t.rate),
                category = COALESCE($8, t.category),
                type = COALESCE($9, t.type),
                priority = COALESCE($10, t.priority),
                description = COALESCE($11, t.description),
                updated_at = now()
        "#;

        let query = match scope {
            TicketScope::All => format!(
                r#"
                UPDATE tickets t
                {set_clause}
                FROM users u
                WHERE u.id = t.user_id AND t.id = $1
                RETURNING {TICKET_COLUMNS}
                "#
            ),
            TicketScope::OwnedBy(_) => format!(
                r#"
                UPDATE tickets t
                {set_clause}
                FROM users u
                WHERE u.id = t.user_id AND t.id = $1 AND t.user_id = $12
                RETURNING {TICKET_COLUMNS}
                "#
            ),
        };

        let mut q = sqlx::query(&query)
            .bind(id)
            .bind(patch.ticket_no.as_deref())
            .bind(patch.subject.as_deref())
            .bind(patch.status.as_deref())
            .bind(patch.support_by.as_deref())
            .bind(patch.date)
            .bind(patch.rate)
            .bind(patch.category.as_deref())
            .bind(patch.ticket_type.as_deref())
            .bind(patch.priority.as_deref())
            .bind(patch.description.as_deref());

        if let TicketScope::OwnedBy(owner) = scope {
            q = q.bind(owner);
        }

        let row = q.fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(record_from_row))
    }
}
