//! # Rostergap REST
//!
//! REST API layer using Axum. Provides HTTP endpoints for unenrolled-user
//! reports, client metadata, and health checks.

pub mod controllers;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
