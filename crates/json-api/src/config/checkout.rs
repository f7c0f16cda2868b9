//! Checkout Config

use bazaar_app::store::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use clap::Args;

/// Checkout transaction settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// Attempts per transactional unit of work before reporting a conflict
    #[arg(
        long = "checkout-max-attempts",
        env = "CHECKOUT_MAX_ATTEMPTS",
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,
}

impl CheckoutConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
    }
}
