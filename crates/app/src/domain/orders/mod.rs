//! Orders

pub mod data;
pub mod errors;
pub mod lifecycle;
pub mod records;
mod service;

pub use errors::OrdersServiceError;
pub use service::*;
