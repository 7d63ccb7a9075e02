//! # Rostergap Config
//!
//! Layered configuration for the rostergap service: defaults from
//! `config/*.toml`, overridden by `ROSTERGAP__`-prefixed environment
//! variables. Credentials for the enrollment warehouse and the per-client
//! roster export URLs live here and are validated at startup.

pub mod app_config;
pub mod loader;

pub use app_config::*;
pub use loader::*;
