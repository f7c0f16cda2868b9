//! Shared application domain, storage, and identity modules.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod store;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
