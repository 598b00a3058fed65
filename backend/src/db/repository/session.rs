use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Session, User, UserId};

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_user(&self, user_id: UserId) -> RepositoryResult<Option<User>>;

    /// Find the session that holds `token`.
    async fn find_session_by_token(&self, token: &str) -> RepositoryResult<Option<Session>>;

    /// Persist a new session for `user_id`.
    ///
    /// # Errors
    /// `RepositoryError::Conflict` if the user does not exist or the token is
    /// already taken.
    async fn create_session(&self, user_id: UserId, token: &str) -> RepositoryResult<Session>;
}
