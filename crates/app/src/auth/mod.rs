//! Authentication and authorization

mod capability;
mod errors;
pub mod identity;
mod models;
mod service;

pub use capability::*;
pub use errors::*;
pub use identity::{IdentityClient, IdentityConfig, IdentityError, VerifiedClaims};
pub use models::*;
pub use service::*;
