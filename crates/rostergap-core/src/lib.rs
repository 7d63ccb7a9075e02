//! # Rostergap Core
//!
//! Core types, the client registry, and error definitions for the
//! rostergap unenrolled-users service. This crate provides the foundational
//! abstractions used across all layers: the error taxonomy, the supported
//! (client, data type) registry, and the report types returned by queries.

pub mod domain;
pub mod error;
pub mod result;

pub use domain::*;
pub use error::*;
pub use result::*;
