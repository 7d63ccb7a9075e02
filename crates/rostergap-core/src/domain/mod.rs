//! Domain types: clients, data types, query keys, and reports.

pub mod client;
pub mod query_key;
pub mod report;

pub use client::*;
pub use query_key::*;
pub use report::*;
