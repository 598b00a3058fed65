//! Repository traits for the registration store.
//!
//! Each aggregate gets its own trait so services can depend on exactly the
//! queries they issue; [`FullRepository`] bundles them for the application
//! state. Lookups return `Ok(None)` when a record is absent and reserve
//! `Err` for storage failures.

pub mod enrollment;
pub mod error;
pub mod hotel;
pub mod session;
pub mod ticket;

use async_trait::async_trait;

pub use enrollment::EnrollmentRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use hotel::HotelRepository;
pub use session::SessionRepository;
pub use ticket::TicketRepository;

/// Every repository capability the application needs.
///
/// Implementations must be `Send + Sync` to be shared across request tasks.
#[async_trait]
pub trait FullRepository:
    EnrollmentRepository + HotelRepository + SessionRepository + TicketRepository
{
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
