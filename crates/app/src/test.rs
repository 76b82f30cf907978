//! Shared fixtures and database harness for unit tests.

mod context;
pub(crate) mod fixtures;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
