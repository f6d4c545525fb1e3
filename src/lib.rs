// Library interface for cchfix
// A disposable carbon-clickhouse container for ClickHouse integration tests

pub mod cli;
pub mod config;
pub mod docker;
pub mod errors;
pub mod fixture;
pub mod logging;
pub mod state;
pub mod templates;

pub use config::FixtureSpec;
pub use errors::{FixtureError, Result};
pub use fixture::{Fixture, FixtureState, CONTAINER_NAME};
