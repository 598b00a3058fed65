//! Bearer-token authentication backed by stored sessions.
//!
//! Tokens are HS256 JWTs carrying `{ userId, iat, jti }`. A token is accepted
//! only if its signature verifies and a session row holds the exact token string.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{Session, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: UserId,
    pub iat: i64,
    /// Per-token nonce; keeps tokens issued within the same second distinct.
    pub jti: Uuid,
}

/// Signs and verifies session tokens with a shared secret.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Sessions do not expire on their own; revocation happens by deleting the row.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue_token(&self, user_id: UserId) -> ServiceResult<String> {
        let claims = Claims {
            user_id,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode `token` and return its claims if the signature is valid.
    pub fn verify_token(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "rejected bearer token");
                ServiceError::unauthorized()
            })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

/// Resolve a bearer token to the user that owns it.
///
/// # Errors
/// `Unauthorized` if the token is malformed, badly signed, not backed by a
/// session, or the session belongs to a different user than the claim.
pub async fn authenticate(
    repo: &dyn FullRepository,
    auth: &AuthService,
    token: &str,
) -> ServiceResult<UserId> {
    let claims = auth.verify_token(token)?;
    let session = repo
        .find_session_by_token(token)
        .await?
        .ok_or_else(ServiceError::unauthorized)?;

    if session.user_id != claims.user_id {
        debug!(
            session_user = %session.user_id,
            claim_user = %claims.user_id,
            "session does not match token claims"
        );
        return Err(ServiceError::unauthorized());
    }
    Ok(session.user_id)
}

/// Sign a fresh token for `user_id` and persist it as a session.
pub async fn issue_session(
    repo: &dyn FullRepository,
    auth: &AuthService,
    user_id: UserId,
) -> ServiceResult<Session> {
    let token = auth.issue_token(user_id)?;
    Ok(repo.create_session(user_id, &token).await?)
}
