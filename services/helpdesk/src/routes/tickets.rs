//! Ticket endpoints
//!
//! Visibility is resolved through the access policy: ticket-admin
//! principals operate on every ticket, everyone else only on their own.
//! A ticket outside the caller's visible set is answered with 404.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, FieldErrors},
    middleware::AuthUser,
    models::{CreateTicketRequest, TicketPatch, TicketRecord, TicketResponse},
    policy::ticket_scope,
    routes::record_action,
    state::AppState,
    validation,
};

/// Check the required creation fields; ticketNo, subject, status and
/// supportBy must all be non-empty before anything is persisted.
fn validate_create_ticket(payload: &CreateTicketRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let required = [
        ("ticketNo", &payload.ticket_no),
        ("subject", &payload.subject),
        ("status", &payload.status),
        ("supportBy", &payload.support_by),
    ];
    for (field, value) in required {
        if let Err(msg) = validation::validate_required(value) {
            errors.insert(field.to_string(), vec![msg]);
        }
    }
    errors
}

/// List the tickets visible to the requesting principal
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let scope = ticket_scope(&user);

    let records = state.ticket_repository.list(&scope).await.map_err(|e| {
        error!("Failed to list tickets: {}", e);
        ApiError::InternalServerError
    })?;

    let tickets: Vec<TicketResponse> = records.into_iter().map(TicketResponse::from).collect();
    Ok(Json(tickets))
}

/// Create a ticket owned by the requesting principal. Any owner supplied
/// in the payload has already been dropped during deserialization.
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTicketRequest>,
) -> ApiResult<impl IntoResponse> {
    let errors = validate_create_ticket(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let ticket = state
        .ticket_repository
        .create(user.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create ticket: {}", e);
            ApiError::InternalServerError
        })?;

    record_action(
        &state,
        user.id,
        "ticket.create",
        format!("created ticket {}", ticket.ticket_no),
    )
    .await;

    let record = TicketRecord {
        ticket,
        user_username: user.username,
    };

    Ok((StatusCode::CREATED, Json(TicketResponse::from(record))))
}

/// Retrieve a single ticket within the caller's visible set
pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let scope = ticket_scope(&user);

    let record = state
        .ticket_repository
        .find(&scope, id)
        .await
        .map_err(|e| {
            error!("Failed to fetch ticket: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Ticket"))?;

    Ok(Json(TicketResponse::from(record)))
}

/// Partially update a ticket within the caller's visible set. Last writer
/// wins; there is no version check.
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TicketPatch>,
) -> ApiResult<impl IntoResponse> {
    let scope = ticket_scope(&user);

    let record = state
        .ticket_repository
        .update(&scope, id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update ticket: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Ticket"))?;

    record_action(
        &state,
        user.id,
        "ticket.update",
        format!("updated ticket {}", record.ticket.ticket_no),
    )
    .await;

    Ok(Json(TicketResponse::from(record)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ticket_no: &str, subject: &str, status: &str, support_by: &str) -> CreateTicketRequest {
        CreateTicketRequest {
            ticket_no: ticket_no.to_string(),
            subject: subject.to_string(),
            status: status.to_string(),
            support_by: support_by.to_string(),
            date: None,
            rate: None,
            category: None,
            ticket_type: None,
            priority: None,
            description: None,
        }
    }

    #[test]
    fn test_complete_request_passes() {
        let errors = validate_create_ticket(&request("T-1", "printer", "open", "none"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_required_fields_are_keyed_by_field() {
        let errors = validate_create_ticket(&request("", "printer", "", "none"));
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("ticketNo"));
        assert!(errors.contains_key("status"));
        assert!(!errors.contains_key("subject"));
    }
}
