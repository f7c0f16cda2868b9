//! Shared fixtures for service tests.


pub(crate) use context::{TestContext, checkout_request};
pub(crate) use flaky::FlakyStore;
pub(crate) use pg::PgTestContext;
