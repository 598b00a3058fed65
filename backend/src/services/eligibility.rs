//! Hotel access rules.
//!
//! A ticket unlocks the hotel catalog only when it is paid, for in-person
//! attendance, and of a type that bundles lodging. The checks run in that
//! order and the first failing one is reported.

use serde::Serialize;

use crate::models::{TicketStatus, TicketWithType};

/// Why a ticket does not grant hotel access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    NotPaid,
    Remote,
    HotelNotIncluded,
}

impl IneligibleReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IneligibleReason::NotPaid => "ticket is not paid",
            IneligibleReason::Remote => "ticket is for remote attendance",
            IneligibleReason::HotelNotIncluded => "ticket type does not include hotel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotelEligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

pub fn check_hotel_eligibility(ticket: &TicketWithType) -> HotelEligibility {
    if ticket.ticket.status == TicketStatus::Reserved {
        HotelEligibility::Ineligible(IneligibleReason::NotPaid)
    } else if ticket.ticket_type.is_remote {
        HotelEligibility::Ineligible(IneligibleReason::Remote)
    } else if !ticket.ticket_type.includes_hotel {
        HotelEligibility::Ineligible(IneligibleReason::HotelNotIncluded)
    } else {
        HotelEligibility::Eligible
    }
}
