//! Service layer for business rules.
//!
//! Services sit between the HTTP handlers and the repositories. They take a
//! `&dyn FullRepository`, apply enrollment, payment and ticket-type checks,
//! and translate absent records into [`ServiceError`] variants.

pub mod auth;
pub mod eligibility;
pub mod error;
pub mod hotels;
pub mod tickets;

pub use auth::{authenticate, issue_session, AuthService, Claims};
pub use eligibility::{check_hotel_eligibility, HotelEligibility, IneligibleReason};
pub use error::{ServiceError, ServiceResult};
pub use hotels::{find_hotel, list_hotels};
pub use tickets::{create_ticket, get_all_ticket_types, get_ticket};
