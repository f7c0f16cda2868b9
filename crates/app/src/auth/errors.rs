//! Auth service errors.

use thiserror::Error;

use crate::auth::IdentityError;

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("credential rejected")]
    Unauthenticated,

    #[error("identity provider error")]
    Provider(#[from] IdentityError),
}
