use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{EnrollmentWithAddress, UserId};

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Find the enrollment owned by `user_id`, with its address if one was registered.
    async fn find_enrollment_by_user(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<EnrollmentWithAddress>>;
}
