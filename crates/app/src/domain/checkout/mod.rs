//! Checkout

pub mod data;
pub mod errors;
pub mod reservation;
mod service;

pub use errors::CheckoutError;
pub use service::*;
