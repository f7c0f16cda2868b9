//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::auth::{AuthServiceError, Caller, IdentityClient, Role, UserId, VerifiedClaims};

#[derive(Debug, Clone)]
pub struct RemoteAuthService {
    identity: IdentityClient,
}

impl RemoteAuthService {
    #[must_use]
    pub fn new(identity: IdentityClient) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl AuthService for RemoteAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Caller, AuthServiceError> {
        let claims = self
            .identity
            .verify(bearer_token)
            .await?
            .ok_or(AuthServiceError::Unauthenticated)?;

        caller_from_claims(claims)
    }
}

/// Build a caller from verified claims; a missing role claim means customer.
pub(crate) fn caller_from_claims(claims: VerifiedClaims) -> Result<Caller, AuthServiceError> {
    if claims.uid.trim().is_empty() {
        return Err(AuthServiceError::Unauthenticated);
    }

    let role = match claims.role.as_deref() {
        None => Role::Customer,
        Some(claim) => claim.parse().unwrap_or_else(|_| {
            warn!(uid = %claims.uid, claim, "unrecognised role claim, treating as customer");

            Role::Customer
        }),
    };

    Ok(Caller {
        uid: UserId::new(claims.uid),
        email: claims.email,
        role,
    })
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer credential into a verified caller.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Caller, AuthServiceError>;
}
