//! Ticket catalog and reservation.

use tracing::{debug, info};

use super::error::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{NewTicket, TicketStatus, TicketType, TicketTypeId, TicketWithType, UserId};

pub async fn get_all_ticket_types(repo: &dyn FullRepository) -> ServiceResult<Vec<TicketType>> {
    debug!("listing ticket types");
    Ok(repo.find_all_ticket_types().await?)
}

/// The user's ticket joined with its type.
pub async fn get_ticket(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<TicketWithType> {
    debug!(%user_id, "fetching ticket");
    repo.find_first_ticket_by_user(user_id)
        .await?
        .ok_or_else(ServiceError::not_found)
}

/// Reserve a ticket of `ticket_type_id` for the user's enrollment.
///
/// # Errors
/// `NotFound` when the user is not enrolled or the ticket type does not exist.
pub async fn create_ticket(
    repo: &dyn FullRepository,
    user_id: UserId,
    ticket_type_id: TicketTypeId,
) -> ServiceResult<TicketWithType> {
    let enrollment = repo
        .find_enrollment_by_user(user_id)
        .await?
        .ok_or_else(ServiceError::not_found)?;

    let created = repo
        .create_ticket(NewTicket {
            ticket_type_id,
            enrollment_id: enrollment.enrollment.id,
            status: TicketStatus::Reserved,
        })
        .await?
        .ok_or_else(ServiceError::not_found)?;

    info!(
        %user_id,
        ticket_id = %created.ticket.id,
        %ticket_type_id,
        "ticket reserved"
    );
    Ok(created)
}
