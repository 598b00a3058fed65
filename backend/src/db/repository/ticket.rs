use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{EnrollmentId, NewTicket, TicketType, TicketWithType, UserId};

/// Ticket and ticket-type queries.
///
/// "First" ticket always means the lowest ticket id: nothing prevents an
/// enrollment from holding several tickets, and callers rely on a stable pick.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Every ticket type in the catalog, ordered by id.
    async fn find_all_ticket_types(&self) -> RepositoryResult<Vec<TicketType>>;

    /// First ticket whose enrollment belongs to `user_id`, joined with its type.
    async fn find_first_ticket_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<TicketWithType>>;

    /// First ticket of `enrollment_id`, joined with its type.
    async fn find_ticket_by_enrollment(
        &self,
        enrollment_id: EnrollmentId,
    ) -> RepositoryResult<Option<TicketWithType>>;

    /// Create a ticket and return it joined with its type, atomically.
    ///
    /// Returns `Ok(None)` without writing anything when the referenced ticket
    /// type does not exist.
    async fn create_ticket(&self, ticket: NewTicket) -> RepositoryResult<Option<TicketWithType>>;
}
