//! # Rostergap Warehouse
//!
//! The warehouse query executor: the pure I/O boundary that fetches a
//! client's roster export and the warehouse enrollment data, anti-joins
//! them by email, and returns the set of unenrolled users. No caching or
//! retry logic lives here; deduplication belongs to the query cache in
//! `rostergap-service`.

pub mod anti_join;
pub mod executor;
pub mod roster;
pub mod snowflake;

pub use executor::{SnowflakeExecutor, WarehouseExecutor};
pub use roster::RosterClient;
pub use snowflake::SnowflakeClient;
