use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EnrollmentId;
use crate::define_id_type;

define_id_type!(i32, TicketTypeId);
define_id_type!(i32, TicketId);

/// Payment lifecycle of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Reserved,
    Paid,
}

impl TicketStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Reserved => "RESERVED",
            TicketStatus::Paid => "PAID",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RESERVED" => Ok(TicketStatus::Reserved),
            "PAID" => Ok(TicketStatus::Paid),
            other => Err(format!("Unknown ticket status: {}", other)),
        }
    }
}

/// Catalog entry describing what a ticket entitles its holder to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: TicketTypeId,
    pub name: String,
    /// Price in cents.
    pub price: i32,
    pub is_remote: bool,
    pub includes_hotel: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub ticket_type_id: TicketTypeId,
    pub enrollment_id: EnrollmentId,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket joined with its type, as returned by every ticket endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketWithType {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(rename = "TicketType")]
    pub ticket_type: TicketType,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTicket {
    pub ticket_type_id: TicketTypeId,
    pub enrollment_id: EnrollmentId,
    pub status: TicketStatus,
}

/// Input for seeding a ticket type.
#[derive(Debug, Clone)]
pub struct NewTicketType {
    pub name: String,
    pub price: i32,
    pub is_remote: bool,
    pub includes_hotel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_uppercase_wire_names() {
        assert_eq!(
            serde_json::to_string(&TicketStatus::Reserved).unwrap(),
            "\"RESERVED\""
        );
        assert_eq!("PAID".parse::<TicketStatus>().unwrap(), TicketStatus::Paid);
        assert!("paid".parse::<TicketStatus>().is_err());
    }
}
