//! Checkout

pub(crate) mod create;
mod errors;
