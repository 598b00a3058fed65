//! Hotel catalog access for enrolled attendees.

use tracing::{debug, warn};

use super::eligibility::{check_hotel_eligibility, HotelEligibility};
use super::error::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{EnrollmentWithAddress, Hotel, HotelId, HotelWithRooms, UserId};

/// List every hotel, provided the user's ticket grants lodging.
///
/// # Errors
/// - `NotFound` when the user has no enrollment or ticket, or the catalog is empty
/// - `PaymentRequired` when the ticket fails the eligibility gate
pub async fn list_hotels(repo: &dyn FullRepository, user_id: UserId) -> ServiceResult<Vec<Hotel>> {
    debug!(%user_id, "listing hotels");
    let enrollment = require_enrollment(repo, user_id).await?;
    ensure_eligible(repo, &enrollment).await?;

    let catalog = repo.find_all_hotels().await?;
    if catalog.is_empty() {
        return Err(ServiceError::not_found());
    }
    Ok(catalog.hotels)
}

/// Fetch one hotel with its rooms.
///
/// `hotel_id` is the raw path segment; it is validated after the enrollment
/// lookup and before any ticket checks.
pub async fn find_hotel(
    repo: &dyn FullRepository,
    user_id: UserId,
    hotel_id: &str,
) -> ServiceResult<HotelWithRooms> {
    debug!(%user_id, hotel_id, "fetching hotel");
    let enrollment = require_enrollment(repo, user_id).await?;
    let hotel_id = parse_hotel_id(hotel_id)?;
    ensure_eligible(repo, &enrollment).await?;

    repo.find_hotel_with_rooms(hotel_id)
        .await?
        .ok_or_else(ServiceError::not_found)
}

fn parse_hotel_id(raw: &str) -> ServiceResult<HotelId> {
    raw.trim()
        .parse::<i32>()
        .map(HotelId)
        .map_err(|_| ServiceError::InvalidData("hotelId must be a number".to_string()))
}

async fn require_enrollment(
    repo: &dyn FullRepository,
    user_id: UserId,
) -> ServiceResult<EnrollmentWithAddress> {
    repo.find_enrollment_by_user(user_id)
        .await?
        .ok_or_else(ServiceError::not_found)
}

async fn ensure_eligible(
    repo: &dyn FullRepository,
    enrollment: &EnrollmentWithAddress,
) -> ServiceResult<()> {
    let ticket = repo
        .find_ticket_by_enrollment(enrollment.enrollment.id)
        .await?
        .ok_or_else(ServiceError::not_found)?;

    match check_hotel_eligibility(&ticket) {
        HotelEligibility::Eligible => Ok(()),
        HotelEligibility::Ineligible(reason) => {
            warn!(
                enrollment_id = %enrollment.enrollment.id,
                ticket_id = %ticket.ticket.id,
                reason = reason.as_str(),
                "hotel access denied"
            );
            Err(ServiceError::payment_required())
        }
    }
}
