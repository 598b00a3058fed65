//! HTTP-specific request and response bodies.
//!
//! Domain records from [`crate::models`] are serialized directly; only
//! envelopes that exist purely for the HTTP surface live here.

use serde::{Deserialize, Serialize};

use crate::models::TicketTypeId;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Body of `POST /tickets`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTicketRequest {
    pub ticket_type_id: TicketTypeId,
}
