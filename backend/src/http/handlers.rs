//! HTTP request handlers.
//!
//! Each handler pulls the authenticated user, path and body out of the
//! request, calls one service operation and serializes the result.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::auth::AuthUser;
use super::dto::{CreateTicketRequest, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::models::{Hotel, HotelWithRooms, TicketType, TicketWithType};
use crate::services;

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected",
        _ => "disconnected",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}

// =========================================================
// Hotels
// =========================================================

pub async fn list_hotels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    let hotels = services::list_hotels(state.repository.as_ref(), auth.user_id).await?;
    Ok(Json(hotels))
}

pub async fn get_hotel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(hotel_id): Path<String>,
) -> Result<Json<HotelWithRooms>, AppError> {
    let hotel = services::find_hotel(state.repository.as_ref(), auth.user_id, &hotel_id).await?;
    Ok(Json(hotel))
}

// =========================================================
// Tickets
// =========================================================

pub async fn list_ticket_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketType>>, AppError> {
    let types = services::get_all_ticket_types(state.repository.as_ref()).await?;
    Ok(Json(types))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TicketWithType>, AppError> {
    let ticket = services::get_ticket(state.repository.as_ref(), auth.user_id).await?;
    Ok(Json(ticket))
}

/// Reserve a ticket. Responds 201 with the ticket joined to its type.
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TicketWithType>), AppError> {
    let Json(req) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let ticket =
        services::create_ticket(state.repository.as_ref(), auth.user_id, req.ticket_type_id)
            .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}
