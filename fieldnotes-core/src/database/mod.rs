pub mod context;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod ports;
pub mod postgres;

pub use context::DatabaseContext;
#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryStore;
pub use postgres::{PoolSettings, PoolStats, PostgresDatabase};
